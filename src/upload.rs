//! # Upload Pipeline
//!
//! Turns a user-supplied file into the session's "original image":
//!
//! 1. detect the MIME type (content sniffing first, extension second)
//! 2. reject anything that is not `image/*`
//! 3. keep the bytes as a [`DataUrl`]
//! 4. probe width/height and classify the aspect ratio
//!
//! The data URL is what the generation request decodes back to raw bytes for
//! the multipart body, so `DataUrl::parse(&url.encode())` must give back the
//! exact same bytes.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, ImageReader};
use tracing::{debug, warn};

use crate::aspect::{AspectRatio, classify};
use crate::error::{StagingError, StagingResult};

/// An inline `data:<mime>;base64,<payload>` image.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Render as a `data:` URL string.
    pub fn encode(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Parse a base64 `data:` URL.
    pub fn parse(url: &str) -> StagingResult<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| StagingError::decode("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StagingError::decode("data URL has no payload separator"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| StagingError::decode("only base64 data URLs are supported"))?;
        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        // Some encoders wrap long payloads; whitespace is never significant.
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = general_purpose::STANDARD.decode(compact)?;
        Ok(Self::new(mime, bytes))
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin")
    }
}

/// A validated, decoded upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub data: DataUrl,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
}

impl Upload {
    /// Read and validate an image file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> StagingResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| StagingError::io("read upload", e).with_path(path.display().to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, bytes)
    }

    /// Validate and decode an in-memory upload.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> StagingResult<Self> {
        let name = name.into();
        let mime = detect_mime(&name, &bytes);
        if !mime.starts_with("image/") {
            warn!(%name, %mime, "rejected non-image upload");
            return Err(StagingError::invalid_upload(name, mime)
                .with_recovery_suggestion("Choose a JPEG, PNG or WebP photo of the room"));
        }

        let (width, height) = probe_dimensions(&bytes)?;
        let aspect_ratio = classify(width, height);
        debug!(%name, %mime, width, height, aspect = %aspect_ratio, "upload accepted");

        Ok(Self {
            name,
            data: DataUrl::new(mime, bytes),
            width,
            height,
            aspect_ratio,
        })
    }

    pub fn mime(&self) -> &str {
        &self.data.mime
    }
}

/// Best-effort MIME detection: magic bytes, then extension.
pub fn detect_mime(name: &str, bytes: &[u8]) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    if let Ok(format) = ImageFormat::from_path(name) {
        return format.to_mime_type().to_string();
    }
    if std::str::from_utf8(bytes).is_ok() {
        return "text/plain".to_string();
    }
    "application/octet-stream".to_string()
}

/// Read width/height from the image header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> StagingResult<(u32, u32)> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StagingError::decode(e.to_string()))?
        .into_dimensions()?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(w, h, Rgba([9, 8, 7, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn data_url_round_trip_is_byte_identical() {
        let bytes = png(5, 3);
        let url = DataUrl::new("image/png", bytes.clone()).encode();
        assert!(url.starts_with("data:image/png;base64,"));
        let back = DataUrl::parse(&url).unwrap();
        assert_eq!(back.bytes, bytes);
        assert_eq!(back.mime, "image/png");
        assert_eq!(back.extension(), "png");
    }

    #[test]
    fn data_url_rejects_garbage() {
        assert!(DataUrl::parse("https://example.com/a.png").is_err());
        assert!(DataUrl::parse("data:image/png;base64").is_err());
        assert!(DataUrl::parse("data:image/png,plain").is_err());
        assert!(DataUrl::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn upload_classifies_aspect_ratio() {
        let upload = Upload::from_bytes("room.png", png(160, 120)).unwrap();
        assert_eq!((upload.width, upload.height), (160, 120));
        assert_eq!(upload.aspect_ratio, AspectRatio::Landscape4x3);
        assert_eq!(upload.mime(), "image/png");
    }

    #[test]
    fn non_image_is_rejected() {
        let err = Upload::from_bytes("notes.txt", b"hello world".to_vec()).unwrap_err();
        assert!(matches!(err, StagingError::InvalidUpload { ref mime, .. } if mime == "text/plain"));
    }

    #[test]
    fn image_extension_with_broken_content_fails_to_decode() {
        let err = Upload::from_bytes("photo.jpg", vec![0u8, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, StagingError::Decode { .. }));
    }
}
