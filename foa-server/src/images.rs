//! Image store
//!
//! Uploads are decoded to prove they are images, re-encoded as JPEG and
//! stored under their content hash, so identical uploads share one file.

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::{AppError, AppResult, ErrorCode};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Accepted upload extensions
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Served names are bare file names, nothing that can leave the directory
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.starts_with('.')
}

pub fn image_url(filename: &str) -> String {
    format!("/api/image/{filename}")
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    fn validate(&self, original_name: &str, data: &[u8]) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!("File too large. Maximum size is {}MB", self.max_bytes / 1024 / 1024),
            )
            .with_detail("maxBytes", self.max_bytes));
        }
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidFileExtension).with_detail("filename", original_name)
            })?;
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Unsupported file format '{ext}'. Supported: {}", SUPPORTED_FORMATS.join(", ")),
            ));
        }
        Ok(ext)
    }

    /// Re-encode as JPEG
    fn compress(data: &[u8]) -> AppResult<Vec<u8>> {
        let img = image::load_from_memory(data).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
        })?;

        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            let rgb = img.to_rgb8();
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            rgb.write_with_encoder(encoder).map_err(|e| {
                AppError::with_message(ErrorCode::ImageProcessingFailed, format!("Failed to compress image: {e}"))
            })?;
        }
        Ok(buffer)
    }

    /// Validate, re-encode and store an upload
    ///
    /// Blocking (decode + encode + file I/O); call from `spawn_blocking`.
    pub fn save(&self, original_name: &str, data: &[u8]) -> AppResult<StoredImage> {
        self.validate(original_name, data)?;
        let compressed = Self::compress(data)?;
        let hash = calculate_hash(&compressed);
        let filename = format!("{hash}.jpg");
        let path = self.dir.join(&filename);

        let storage_err = |e: std::io::Error| {
            tracing::error!(error = %e, path = %path.display(), "Image write failed");
            AppError::with_message(ErrorCode::FileStorageFailed, format!("Failed to save file: {e}"))
        };

        if path.exists() {
            tracing::info!(original_name = %original_name, existing_file = %filename, "Duplicate image, reusing stored file");
        } else {
            std::fs::create_dir_all(&self.dir).map_err(storage_err)?;
            // Write then rename so readers never see a partial file
            let tmp = self.dir.join(format!(".{hash}.tmp"));
            std::fs::write(&tmp, &compressed).map_err(storage_err)?;
            std::fs::rename(&tmp, &path).map_err(storage_err)?;
            tracing::info!(original_name = %original_name, size = compressed.len(), hash = %hash, "Image stored");
        }

        Ok(StoredImage {
            file_id: hash,
            url: image_url(&filename),
            filename,
            original_name: original_name.to_string(),
            size: compressed.len(),
            format: "jpg".to_string(),
        })
    }

    /// Read a stored image; `None` when it does not exist
    pub async fn load(&self, filename: &str) -> AppResult<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            return Err(AppError::with_message(ErrorCode::InvalidRequest, "Invalid filename"));
        }
        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_message(ErrorCode::FileStorageFailed, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
        out
    }

    #[tokio::test]
    async fn stores_under_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("images"), 5 * 1024 * 1024);

        let first = store.save("dish.PNG", &png_bytes()).unwrap();
        assert!(first.filename.ends_with(".jpg"));
        assert_eq!(first.filename.len(), 64 + 4);
        assert_eq!(first.url, format!("/api/image/{}", first.filename));

        let second = store.save("copy.png", &png_bytes()).unwrap();
        assert_eq!(first.filename, second.filename);

        let bytes = store.load(&first.filename).await.unwrap().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(store.load("missing.jpg").await.unwrap().is_none());
    }

    #[test]
    fn rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 64);
        let code = |name: &str, data: &[u8]| store.save(name, data).unwrap_err().code;

        assert_eq!(code("a.png", b""), ErrorCode::EmptyFile);
        assert_eq!(code("a.png", &[0u8; 65]), ErrorCode::FileTooLarge);
        assert_eq!(code("noext", b"abc"), ErrorCode::InvalidFileExtension);
        assert_eq!(code("a.gif", b"abc"), ErrorCode::UnsupportedFileFormat);
        assert_eq!(code("a.png", b"not an image"), ErrorCode::InvalidImageFile);
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 1024);
        for name in ["../secret", "a/b.jpg", "..\\x", "", ".hidden"] {
            assert_eq!(store.load(name).await.unwrap_err().code, ErrorCode::InvalidRequest);
        }
    }
}
