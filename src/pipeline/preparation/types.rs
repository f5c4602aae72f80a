use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PreparationError;

/// Whether a submitted report is a raster image or extracted plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Image,
    Text,
}

impl Modality {
    /// Infer the modality from a file's MIME type.
    ///
    /// `image/jpeg` and `image/png` are images; `application/pdf` goes
    /// through text extraction. Everything else is rejected.
    pub fn from_path(path: &Path) -> Result<Self, PreparationError> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("image", "jpeg") | ("image", "png") => Ok(Self::Image),
            ("application", "pdf") => Ok(Self::Text),
            _ => Err(PreparationError::UnsupportedFormat(mime.essence_str().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// A decoded, validated raster image ready to be attached to a request.
///
/// The original encoded bytes are kept as-is; decoding only proves they are
/// usable and yields the dimensions.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle {
    bytes: Vec<u8>,
    mime_type: &'static str,
    width: u32,
    height: u32,
}

impl ImageHandle {
    pub(crate) fn new(bytes: Vec<u8>, mime_type: &'static str, width: u32, height: u32) -> Self {
        Self {
            bytes,
            mime_type,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Output of the Content Preparer: exactly what the orchestrator embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedContent {
    Image(ImageHandle),
    Text(String),
}

impl PreparedContent {
    pub fn modality(&self) -> Modality {
        match self {
            Self::Image(_) => Modality::Image,
            Self::Text(_) => Modality::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_inferred_from_extension() {
        assert_eq!(Modality::from_path(Path::new("ref.jpg")).unwrap(), Modality::Image);
        assert_eq!(Modality::from_path(Path::new("ref.JPEG")).unwrap(), Modality::Image);
        assert_eq!(Modality::from_path(Path::new("ref.png")).unwrap(), Modality::Image);
        assert_eq!(Modality::from_path(Path::new("referto.pdf")).unwrap(), Modality::Text);
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = Modality::from_path(Path::new("notes.docx")).unwrap_err();
        assert!(matches!(err, PreparationError::UnsupportedFormat(_)));
    }

    #[test]
    fn extensionless_file_rejected() {
        let err = Modality::from_path(Path::new("scan")).unwrap_err();
        match err {
            PreparationError::UnsupportedFormat(mime) => {
                assert_eq!(mime, "application/octet-stream")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn image_handle_debug_omits_bytes() {
        let handle = ImageHandle::new(vec![1, 2, 3, 4], "image/png", 10, 20);
        let debug = format!("{handle:?}");
        assert!(debug.contains("size: 4"));
        assert!(!debug.contains("[1, 2, 3, 4]"));
    }

    #[test]
    fn content_reports_modality() {
        let handle = ImageHandle::new(vec![0], "image/png", 1, 1);
        assert_eq!(PreparedContent::Image(handle).modality(), Modality::Image);
        assert_eq!(PreparedContent::Text("x".into()).modality(), Modality::Text);
    }
}
