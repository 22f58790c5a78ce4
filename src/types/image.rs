//! Image payload submitted for mood extraction.
//!
//! An ImageInput is ephemeral: it is created when the user selects a photo,
//! held by the pipeline while analysis runs and discarded on reset.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PipelineError, Result};

/// Media type assumed when none is declared or detected.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Opaque binary image payload plus its declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl ImageInput {
    /// Creates an image from raw bytes and a media type.
    ///
    /// A blank media type falls back to [`DEFAULT_MIME_TYPE`].
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type.trim().to_string()
        };
        Self {
            bytes: Arc::from(bytes.into()),
            mime_type,
        }
    }

    /// Decodes a base64 payload.
    ///
    /// Accepts either bare base64 or a `data:<mime>;base64,<payload>` URL;
    /// the data URL's media type takes precedence over `mime_type`.
    pub fn from_base64(payload: &str, mime_type: Option<&str>) -> Result<Self> {
        let (data, url_mime) = split_data_url(payload.trim());
        let bytes = STANDARD.decode(data).map_err(|e| {
            PipelineError::with_source(
                crate::error::ErrorCode::InvalidInput,
                format!("imageBase64 is not valid base64: {}", e),
                e,
            )
        })?;
        let mime = url_mime
            .or(mime_type)
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Ok(Self::new(bytes, mime))
    }

    /// Reads an image file, sniffing its media type from the content.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PipelineError::with_source(
                crate::error::ErrorCode::InvalidInput,
                format!("Failed to read image {}: {}", path.display(), e),
                e,
            )
        })?;
        let mime = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Ok(Self::new(bytes, mime))
    }

    /// Returns the raw payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the declared media type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns true if the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the payload encoded as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Checks the preconditions for extraction.
    ///
    /// The payload must be non-empty and the media type must be `image/*`.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(PipelineError::empty_image());
        }
        let is_image = self
            .mime_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"));
        if !is_image {
            return Err(PipelineError::invalid_input(format!(
                "Unsupported media type: {} (expected image/*)",
                self.mime_type
            )));
        }
        Ok(())
    }

    /// Captures the preview reference shown while the attempt runs.
    pub fn preview(&self) -> ImagePreview {
        ImagePreview {
            reference: compute_preview_reference(&self.bytes),
            mime_type: self.mime_type.clone(),
            byte_len: self.bytes.len(),
        }
    }
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageInput")
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}

/// Locally displayable reference to the selected image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePreview {
    /// `preview:` followed by 16 hex characters of the payload's SHA256.
    pub reference: String,
    /// Media type of the previewed image.
    pub mime_type: String,
    /// Payload size in bytes.
    pub byte_len: usize,
}

/// Computes the preview reference for an image payload.
///
/// Identical payloads always map to the same reference.
pub fn compute_preview_reference(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("preview:{}", hex::encode(&digest[..8]))
}

/// Splits a data URL into its payload and media type.
fn split_data_url(payload: &str) -> (&str, Option<&str>) {
    let Some(rest) = payload.strip_prefix("data:") else {
        return (payload, None);
    };
    match rest.split_once(',') {
        Some((header, data)) => {
            let mime = header.split(';').next().filter(|m| !m.is_empty());
            (data, mime)
        }
        None => (payload, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_mime_defaults_to_jpeg() {
        let image = ImageInput::new(vec![1, 2, 3], "  ");
        assert_eq!(image.mime_type(), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn empty_payload_is_invalid_input() {
        let err = ImageInput::new(Vec::new(), "image/png").validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn empty_payload_message_names_no_transport_field() {
        let err = ImageInput::new(Vec::new(), "image/png").validate().unwrap_err();
        assert_eq!(err.message, "Image payload is empty");
    }

    #[test]
    fn media_type_check_ignores_case() {
        assert!(ImageInput::new(vec![1], "IMAGE/JPEG").validate().is_ok());
        assert!(ImageInput::new(vec![1], "Image/Png").validate().is_ok());

        let image = ImageInput::from_base64("data:IMAGE/JPEG;base64,AQID", None).unwrap();
        assert!(image.validate().is_ok());
        assert!(ImageInput::new(vec![1], "imag").validate().is_err());
    }

    #[test]
    fn non_image_media_type_is_rejected() {
        let err = ImageInput::new(vec![1], "text/plain").validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
        assert!(err.message.contains("text/plain"));
    }

    #[test]
    fn decodes_bare_base64() {
        let image = ImageInput::from_base64("AQID", Some("image/png")).unwrap();
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn data_url_media_type_wins() {
        let image = ImageInput::from_base64("data:image/webp;base64,AQID", Some("image/png")).unwrap();
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.mime_type(), "image/webp");
    }

    #[test]
    fn invalid_base64_is_invalid_input() {
        let err = ImageInput::from_base64("not base64!!", None).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn preview_reference_is_deterministic() {
        let a = compute_preview_reference(b"sunset");
        let b = compute_preview_reference(b"sunset");
        let c = compute_preview_reference(b"rain");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), "preview:".len() + 16);
    }

    #[tokio::test]
    async fn from_path_sniffs_png() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        // PNG signature followed by a few bytes of junk.
        file.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0])
            .unwrap();
        let image = ImageInput::from_path(file.path()).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.preview().byte_len, 12);
    }

    #[test]
    fn debug_hides_payload() {
        let image = ImageInput::new(vec![7; 64], "image/jpeg");
        let debug = format!("{:?}", image);
        assert!(debug.contains("byte_len: 64"));
    }
}
