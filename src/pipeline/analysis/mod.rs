pub mod types;
pub mod prompt;
pub mod messages;
pub mod classify;
pub mod fallback;
pub mod gemini;
pub mod gemini_types;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use messages::*;
pub use classify::*;
pub use fallback::*;
pub use gemini::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Cannot connect to the inference service at {0}")]
    Connection(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Inference service returned an error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
