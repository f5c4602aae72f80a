//! Content Preparer: turns an uploaded file into content the analysis
//! orchestrator can embed (a validated image or normalized report text).
//!
//! The orchestrator never receives a "no content" signal. Every failure here
//! is reported to the caller as a `PreparationError`, which carries its own
//! user-facing message.

pub mod types;
pub mod raster;
pub mod pdf;
pub mod sanitize;

pub use types::*;
pub use raster::*;
pub use pdf::*;
pub use sanitize::*;

use std::path::Path;

use thiserror::Error;

use crate::config::Language;
use crate::pipeline::analysis::AnalysisRequest;

#[derive(Error, Debug)]
pub enum PreparationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("No usable text found in the document")]
    NoTextFound,

    #[error("Image is empty")]
    EmptyImage,

    #[error("Image decoding failed: {0}")]
    ImageDecoding(String),

    #[error("Image too large ({0} bytes), maximum is about 15 MB")]
    ImageTooLarge(usize),
}

impl PreparationError {
    /// Message shown to the person who uploaded the file.
    pub fn user_message(&self, language: Language) -> String {
        match (language, self) {
            (Language::Italian, Self::NoTextFound) => {
                "Errore: Nessun testo valido estratto dal PDF.".into()
            }
            (Language::Italian, Self::PdfParsing(_)) => {
                "Errore: Impossibile processare il PDF caricato.".into()
            }
            (Language::Italian, Self::UnsupportedFormat(_)) => {
                "Errore: Formato non supportato. Carica un'immagine JPG/PNG o un PDF.".into()
            }
            (Language::Italian, Self::ImageTooLarge(_)) => {
                "Errore: L'immagine supera la dimensione massima di 15 MB.".into()
            }
            (Language::Italian, Self::Io(_)) => "Errore: Impossibile leggere il file.".into(),
            (Language::Italian, Self::EmptyImage | Self::ImageDecoding(_)) => {
                "Errore: Impossibile processare l'immagine caricata.".into()
            }
            (Language::English, Self::NoTextFound) => {
                "Error: No valid text could be extracted from the PDF.".into()
            }
            (Language::English, Self::PdfParsing(_)) => {
                "Error: The uploaded PDF could not be processed.".into()
            }
            (Language::English, Self::UnsupportedFormat(_)) => {
                "Error: Unsupported format. Upload a JPG/PNG image or a PDF.".into()
            }
            (Language::English, Self::ImageTooLarge(_)) => {
                "Error: The image exceeds the 15 MB size limit.".into()
            }
            (Language::English, Self::Io(_)) => "Error: The file could not be read.".into(),
            (Language::English, Self::EmptyImage | Self::ImageDecoding(_)) => {
                "Error: The uploaded image could not be processed.".into()
            }
        }
    }
}

/// Prepare bytes already in memory for the given modality.
pub fn prepare_bytes(bytes: &[u8], modality: Modality) -> Result<AnalysisRequest, PreparationError> {
    match modality {
        Modality::Image => Ok(AnalysisRequest::image(decode_image(bytes)?)),
        Modality::Text => {
            let extracted = extract_text(bytes)?;
            AnalysisRequest::text(&normalize_text(&extracted))
        }
    }
}

/// Read a file and prepare it. `declared` overrides the modality inferred
/// from the file name.
pub fn prepare_file(
    path: &Path,
    declared: Option<Modality>,
) -> Result<AnalysisRequest, PreparationError> {
    let modality = match declared {
        Some(m) => m,
        None => Modality::from_path(path)?,
    };
    let _span = tracing::info_span!("prepare_file", modality = modality.as_str()).entered();

    let bytes = std::fs::read(path)?;
    let request = prepare_bytes(&bytes, modality)?;

    tracing::info!(
        request_id = %request.id(),
        size = bytes.len(),
        "Report prepared for analysis"
    );
    Ok(request)
}
