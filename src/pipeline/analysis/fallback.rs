use super::messages::with_disclaimer;
use crate::config::Language;
use crate::pipeline::preparation::PreparedContent;

/// Local summary used when the remote service could not be reached within
/// the retry budget.
///
/// Pure: no network, no shared state, identical input gives identical output.
/// Text with no countable words falls back to the generic advisory.
pub fn fallback(content: &PreparedContent, language: Language) -> String {
    let body = match content {
        PreparedContent::Image(_) => image_advisory(language).to_string(),
        PreparedContent::Text(text) => match text.split_whitespace().count() {
            0 => generic_advisory(language).to_string(),
            words => text_advisory(words, language),
        },
    };
    with_disclaimer(&body, language)
}

fn image_advisory(language: Language) -> &'static str {
    match language {
        Language::Italian => {
            "⚠️ **Analisi automatica non disponibile.**\n\n\
             Il servizio di IA non è raggiungibile in questo momento, quindi non è stato \
             possibile generare una valutazione dell'immagine caricata.\n\n\
             Ti consigliamo di mostrare il referto al tuo medico curante, che potrà \
             interpretarlo correttamente."
        }
        Language::English => {
            "⚠️ **Automatic analysis unavailable.**\n\n\
             The AI service cannot be reached right now, so no assessment of the uploaded \
             image could be generated.\n\n\
             Please show the report to your doctor, who can interpret it properly."
        }
    }
}

fn text_advisory(words: usize, language: Language) -> String {
    match language {
        Language::Italian => format!(
            "⚠️ **Analisi automatica non disponibile.**\n\n\
             Il servizio di IA non è raggiungibile in questo momento. Il testo estratto dal \
             referto contiene {words} parole, ma non è stato possibile elaborarlo \
             automaticamente.\n\n\
             Ti consigliamo di rivedere il referto con il tuo medico curante, prestando \
             attenzione ai valori contrassegnati come fuori intervallo."
        ),
        Language::English => format!(
            "⚠️ **Automatic analysis unavailable.**\n\n\
             The AI service cannot be reached right now. The text extracted from the report \
             contains {words} words, but it could not be processed automatically.\n\n\
             Please review the report with your doctor, paying attention to any values \
             flagged as out of range."
        ),
    }
}

fn generic_advisory(language: Language) -> &'static str {
    match language {
        Language::Italian => {
            "⚠️ **Analisi automatica non disponibile.**\n\n\
             Consulta il tuo medico curante per l'interpretazione del referto."
        }
        Language::English => {
            "⚠️ **Automatic analysis unavailable.**\n\n\
             Please ask your doctor to interpret the report."
        }
    }
}
