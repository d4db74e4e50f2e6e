//! Turns a picked image file into something that can travel in a JSON request.

use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use color_eyre::{Result, eyre::eyre};

use crate::EditError;

/// File extensions offered by the file picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "heic", "heif"];

/// A picked file together with the media type it was declared as.
///
/// Nothing is read at construction time. The contents are only read when a
/// preview or a payload is requested, so a file that vanishes after being
/// picked surfaces as [`EditError::Read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub media_type: String,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }

    /// Declares the media type from the file extension, like a browser would.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = media_type_for_path(&path).unwrap_or("application/octet-stream");
        Self::new(path, media_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub media_type: String,
}

pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub fn data_url(media_type: &str, base64_data: &str) -> String {
    format!("data:{media_type};base64,{base64_data}")
}

/// Reads the whole file and returns it as a `data:` URL.
pub async fn read_as_data_url(file: &ImageFile) -> Result<String, EditError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| EditError::Read {
            path: file.path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(data_url(&file.media_type, &STANDARD.encode(bytes)))
}

/// Everything after the first comma, if there is anything.
pub fn base64_body(data_url: &str) -> Option<&str> {
    data_url
        .split_once(',')
        .map(|(_, body)| body)
        .filter(|body| !body.is_empty())
}

pub async fn encode(file: &ImageFile) -> Result<EncodedPayload, EditError> {
    let url = read_as_data_url(file).await?;
    let data = base64_body(&url).ok_or(EditError::Format)?;
    Ok(EncodedPayload {
        data: data.to_string(),
        media_type: file.media_type.clone(),
    })
}

/// Recovers the raw bytes of a data URL, for handing them to an image widget.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let body = base64_body(data_url).ok_or(eyre!("Data URL without a base64 body"))?;
    Ok(STANDARD.decode(body)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn png_file(contents: &[u8]) -> (NamedTempFile, ImageFile) {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.write_all(contents).unwrap();
        let file = ImageFile::from_path(tmp.path());
        (tmp, file)
    }

    #[tokio::test]
    async fn encodes_contents_with_declared_media_type() {
        let (_tmp, file) = png_file(&PNG_MAGIC);
        let payload = encode(&file).await.unwrap();

        assert_eq!(payload.media_type, "image/png");
        assert_eq!(payload.data, STANDARD.encode(PNG_MAGIC));
    }

    #[tokio::test]
    async fn media_type_comes_from_the_file_not_the_bytes() {
        let (tmp, _) = png_file(&PNG_MAGIC);
        let file = ImageFile::new(tmp.path(), "image/webp");
        let payload = encode(&file).await.unwrap();
        assert_eq!(payload.media_type, "image/webp");
    }

    #[tokio::test]
    async fn encoding_twice_is_identical() {
        let (_tmp, file) = png_file(b"some image bytes, or close enough");
        let first = encode(&file).await.unwrap();
        let second = encode(&file).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_file_has_no_body() {
        let (_tmp, file) = png_file(&[]);
        assert_eq!(encode(&file).await, Err(EditError::Format));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = ImageFile::from_path(dir.path().join("gone.png"));
        let err = encode(&file).await.unwrap_err();
        assert!(matches!(err, EditError::Read { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn preview_url_round_trips_to_bytes() {
        let (_tmp, file) = png_file(&PNG_MAGIC);
        let url = read_as_data_url(&file).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn body_is_split_on_first_comma() {
        assert_eq!(base64_body("data:image/png;base64,AAAA"), Some("AAAA"));
        assert_eq!(base64_body("data:x,a,b"), Some("a,b"));
        assert_eq!(base64_body("data:image/png;base64,"), None);
        assert_eq!(base64_body("no comma at all"), None);
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(media_type_for_path(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(media_type_for_path(Path::new("a.txt")), None);
        assert_eq!(
            ImageFile::from_path("noext").media_type,
            "application/octet-stream"
        );
    }
}
