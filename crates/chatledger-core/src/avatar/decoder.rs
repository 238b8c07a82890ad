//! Avatar decoding.

use std::path::Path;
use std::sync::Arc;

use super::Avatar;

/// Decodes an image file.
pub trait AvatarDecoder: Send + Sync {
    /// Decoded image at `path`, or `None` if the file is missing or unreadable.
    fn decode_file(&self, path: &Path) -> Option<Avatar>;
}

/// Decoder backed by the `image` crate. The format is guessed from the content,
/// since backup files carry no extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl AvatarDecoder for ImageDecoder {
    fn decode_file(&self, path: &Path) -> Option<Avatar> {
        let reader = match image::ImageReader::open(path) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::debug!("Cannot open avatar {:?}: {e}", path);
                return None;
            }
        };

        let decoded = reader
            .with_guessed_format()
            .map_err(image::ImageError::from)
            .and_then(|reader| reader.decode());

        match decoded {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                tracing::debug!("Cannot decode avatar {:?}: {e}", path);
                None
            }
        }
    }
}
