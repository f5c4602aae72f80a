//! Fixed user-facing text: the disclaimer suffix and the terminal-failure
//! messages. None of it is produced by the remote model. The orchestrator
//! suffixes every body it returns, including these messages.

use crate::config::Language;

const DISCLAIMER_IT: &str = "\n\n---\n\
⚠️ **Avvertenza:** questa valutazione è generata automaticamente da un'Intelligenza \
Artificiale e **NON costituisce una diagnosi medica**. L'IA può commettere errori. \
Consulta sempre il tuo medico curante per l'interpretazione del referto.";

const DISCLAIMER_EN: &str = "\n\n---\n\
⚠️ **Disclaimer:** this assessment was generated automatically by an Artificial \
Intelligence and **is NOT a medical diagnosis**. AI can make mistakes. \
Always ask your own doctor to interpret the report.";

/// The suffix appended locally to every outcome body.
pub fn disclaimer_suffix(language: Language) -> &'static str {
    match language {
        Language::Italian => DISCLAIMER_IT,
        Language::English => DISCLAIMER_EN,
    }
}

/// Append the disclaimer exactly once.
///
/// Trailing whitespace is trimmed first. A body that already ends with the
/// disclaimer (the model echoed it back) is returned unchanged.
pub fn with_disclaimer(body: &str, language: Language) -> String {
    let suffix = disclaimer_suffix(language);
    let body = body.trim_end();
    if body.ends_with(suffix.trim_start()) {
        return body.to_string();
    }
    format!("{body}{suffix}")
}

/// Shown when the service refused to answer. Trying again will not help.
pub fn blocked_message(language: Language) -> &'static str {
    match language {
        Language::Italian => {
            "⚠️ Il servizio di IA si è rifiutato di analizzare questo referto per motivi di \
             sicurezza dei contenuti. Riprovare con lo stesso file non cambierà il risultato: \
             mostra il referto direttamente al tuo medico curante."
        }
        Language::English => {
            "⚠️ The AI service declined to analyze this report for content-safety reasons. \
             Submitting the same file again will not change the result: please show the \
             report to your doctor directly."
        }
    }
}

/// Shown when the quota or rate limit is exhausted. The caller should defer.
pub fn quota_message(language: Language) -> &'static str {
    match language {
        Language::Italian => {
            "⏳ Il limite di utilizzo del servizio di IA è stato raggiunto. Riprova più tardi."
        }
        Language::English => {
            "⏳ The AI service usage limit has been reached. Please try again later."
        }
    }
}

/// Shown on deployment faults (bad model id, rejected key, malformed call).
pub fn configuration_message(language: Language) -> &'static str {
    match language {
        Language::Italian => {
            "🛠️ Il servizio di analisi non è configurato correttamente (modello o chiave API \
             non validi). Contatta l'amministratore dell'applicazione."
        }
        Language::English => {
            "🛠️ The analysis service is misconfigured (invalid model or API key). \
             Please contact the application administrator."
        }
    }
}
