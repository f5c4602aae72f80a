use image::{GenericImageView, ImageFormat};

use super::types::ImageHandle;
use super::PreparationError;

/// Request-size ceiling of the remote service for inline data (20 MB).
pub const MAX_REQUEST_BYTES: usize = 20_000_000;

/// Room kept in the request for the prompt and the JSON envelope.
const PROMPT_HEADROOM_BYTES: usize = 64 * 1024;

/// Largest raw image whose base64 encoding still fits in one request
/// next to the prompt (about 14.9 MB).
pub const MAX_IMAGE_BYTES: usize = (MAX_REQUEST_BYTES - PROMPT_HEADROOM_BYTES) / 4 * 3;

/// Validate raster bytes and wrap them in an [`ImageHandle`].
///
/// Only JPEG and PNG are accepted. The bytes are fully decoded once so a
/// truncated or corrupt upload is caught here rather than by the remote
/// service.
pub fn decode_image(bytes: &[u8]) -> Result<ImageHandle, PreparationError> {
    if bytes.is_empty() {
        return Err(PreparationError::EmptyImage);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(PreparationError::ImageTooLarge(bytes.len()));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| PreparationError::ImageDecoding(e.to_string()))?;
    let mime_type = match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        other => {
            return Err(PreparationError::UnsupportedFormat(format!("{other:?}")));
        }
    };

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PreparationError::ImageDecoding(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    tracing::debug!(mime_type, width, height, size = bytes.len(), "Image decoded");

    Ok(ImageHandle::new(bytes.to_vec(), mime_type, width, height))
}
