use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Part;

/// An image staged by the user, held as base64 text with its original MIME
/// type.
///
/// This can be created from a file path or from a `data:` URL of the form
/// `data:<mime>;base64,<payload>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAttachment {
    /// The IANA media type, always `image/*`.
    pub mime_type: String,

    /// The base64-encoded bytes of the image.
    pub data: String,
}

impl ImageAttachment {
    /// Create an attachment from already-encoded data.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(Error::validation(
                format!("not an image media type: {mime_type}"),
                Some("mime_type".to_string()),
            ));
        }
        Ok(Self {
            mime_type,
            data: data.into(),
        })
    }

    /// Create an attachment from raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Self::new(
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )
    }

    /// Read an image file and encode it as base64.
    ///
    /// The media type is determined from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_type_for_extension)
            .ok_or_else(|| {
                Error::validation(
                    format!(
                        "unsupported image file {}: expected jpeg, png, gif, webp, heic, or heif",
                        path.display()
                    ),
                    Some("path".to_string()),
                )
            })?;

        let mut file = File::open(path)
            .map_err(|err| Error::io(format!("failed to open {}", path.display()), err))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        if buffer.is_empty() {
            return Err(Error::validation(
                format!("image file {} is empty", path.display()),
                Some("path".to_string()),
            ));
        }

        Self::from_bytes(mime_type, &buffer)
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let malformed = || {
            Error::validation(
                "expected a data URL of the form data:<mime>;base64,<payload>",
                Some("data_url".to_string()),
            )
        };
        let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
        let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(malformed)?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| {
                Error::encoding(
                    format!("invalid base64 image payload: {err}"),
                    Some(Box::new(err)),
                )
            })?;
        Self::new(mime_type, payload)
    }

    /// Render this attachment back into a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Size of the decoded image in bytes.
    pub fn decoded_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }

    /// The request part carrying this image inline.
    pub fn to_part(&self) -> Part {
        Part::inline_data(self.mime_type.clone(), self.data.clone())
    }
}

fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trip() {
        let url = "data:image/png;base64,SGVsbG8gV29ybGQ=";
        let image = ImageAttachment::from_data_url(url).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "SGVsbG8gV29ybGQ=");
        assert_eq!(image.decoded_len(), "Hello World".len());
        assert_eq!(image.to_data_url(), url);
    }

    #[test]
    fn rejects_malformed_data_urls() {
        assert!(ImageAttachment::from_data_url("image/png;base64,AAAA").is_err());
        assert!(ImageAttachment::from_data_url("data:image/png,AAAA").is_err());
        assert!(ImageAttachment::from_data_url("data:text/plain;base64,AAAA").is_err());
        assert!(ImageAttachment::from_data_url("data:image/png;base64,***").is_err());
    }

    #[test]
    fn from_path_detects_type() {
        let path = std::env::temp_dir().join(format!("compass-test-{}.JPG", std::process::id()));
        std::fs::write(&path, b"\xff\xd8\xff\xe0fake").unwrap();
        let image = ImageAttachment::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.decoded_len(), 8);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let err = ImageAttachment::from_path("drawing.bmp").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn to_part_is_inline() {
        let image = ImageAttachment::from_bytes("image/gif", b"GIF89a").unwrap();
        let part = image.to_part();
        let blob = part.inline_data.unwrap();
        assert_eq!(blob.mime_type, "image/gif");
        assert_eq!(blob.data, "R0lGODlh");
        assert!(part.text.is_none());
    }
}
