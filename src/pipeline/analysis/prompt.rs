use super::types::{InferenceRequest, InlineImage};
use crate::config::Language;
use crate::pipeline::preparation::{PreparedContent, REPORT_BEGIN_MARKER, REPORT_END_MARKER};

pub const ANALYSIS_PROMPT_IT: &str = r#"
Sei un assistente che aiuta una persona a leggere il referto delle proprie analisi del sangue.
Il tuo compito è SOLO rendere il referto più comprensibile, non interpretarlo clinicamente.

REGOLE ASSOLUTE, SENZA ECCEZIONI:
1. Individua TUTTI i valori fuori dall'intervallo di riferimento (segnalati con *, H, L, ↑, ↓
   o confrontando il valore con il range indicato).
2. Per ciascun valore anomalo riporta: nome dell'esame, valore, unità di misura,
   intervallo di riferimento e se è ALTO o BASSO.
3. Per ciascun esame anomalo aggiungi un contesto generico e prudente su cosa misura,
   senza ipotesi su cause o patologie.
4. NON formulare MAI diagnosi. NON suggerire terapie, farmaci o integratori.
5. Se tutti i valori sono nella norma, dillo chiaramente.
6. Se il referto è illeggibile, incompleto o non è un referto di analisi, segnalalo.
7. Chiudi invitando a discutere i risultati con il medico curante.

FORMATO: Markdown, con un titolo per sezione ed elenchi puntati. Rispondi in italiano.
"#;

pub const ANALYSIS_PROMPT_EN: &str = r#"
You are an assistant helping a person read their own blood test report.
Your ONLY task is to make the report easier to understand, not to interpret it clinically.

ABSOLUTE RULES, NO EXCEPTIONS:
1. Find ALL values outside their reference interval (flagged with *, H, L, ↑, ↓
   or by comparing the value with the stated range).
2. For each out-of-range value report: test name, value, unit,
   reference interval and whether it is HIGH or LOW.
3. For each out-of-range test add cautious, generic context about what it measures,
   without speculating about causes or conditions.
4. NEVER diagnose. NEVER suggest treatments, drugs or supplements.
5. If every value is within range, say so clearly.
6. If the report is unreadable, incomplete or not a lab report, say so.
7. Close by inviting the person to discuss the results with their doctor.

FORMAT: Markdown, one heading per section, bullet lists. Answer in English.
"#;

/// The fixed instruction block for a language.
pub fn analysis_prompt(language: Language) -> &'static str {
    match language {
        Language::Italian => ANALYSIS_PROMPT_IT,
        Language::English => ANALYSIS_PROMPT_EN,
    }
}

/// Build the outbound request for one report.
///
/// Text is inlined between explicit begin/end markers. Images travel as
/// attached inline data next to the instruction.
pub fn build_prompt(content: &PreparedContent, language: Language) -> InferenceRequest {
    let instructions = analysis_prompt(language).trim();

    match content {
        PreparedContent::Text(text) => {
            let lead = match language {
                Language::Italian => "Di seguito il testo estratto dal referto:",
                Language::English => "The text extracted from the report follows:",
            };
            InferenceRequest {
                prompt: format!(
                    "{instructions}\n\n{lead}\n{REPORT_BEGIN_MARKER}\n{text}\n{REPORT_END_MARKER}"
                ),
                image: None,
            }
        }
        PreparedContent::Image(handle) => {
            let lead = match language {
                Language::Italian => "Il referto da analizzare è nell'immagine allegata.",
                Language::English => "The report to analyze is in the attached image.",
            };
            InferenceRequest {
                prompt: format!("{instructions}\n\n{lead}"),
                image: Some(InlineImage {
                    mime_type: handle.mime_type().to_string(),
                    data: handle.bytes().to_vec(),
                }),
            }
        }
    }
}
