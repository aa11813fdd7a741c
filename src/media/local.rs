//! # Local Filesystem Image Store
//!
//! Images are written as `<product_id>.jpg` directly under the uploads
//! directory, which the HTTP server also serves at `/uploads` with an
//! `image/jpeg` content type. Only uploads whose leading bytes carry the
//! JPEG signature are accepted; bytes are stored as received.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{MediaError, MediaResult};
use super::store::ImageStore;

/// Path prefix under which the uploads directory is served
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Local filesystem image store
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: u64,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(product_id: i64) -> String {
        format!("{}.jpg", product_id)
    }

    fn full_path(&self, product_id: i64) -> PathBuf {
        self.root.join(Self::file_name(product_id))
    }
}

impl ImageStore for LocalImageStore {
    fn validate(&self, data: &[u8]) -> MediaResult<()> {
        if data.is_empty() {
            return Err(MediaError::EmptyUpload);
        }
        let size = data.len() as u64;
        if size > self.max_bytes {
            return Err(MediaError::TooLarge(size, self.max_bytes));
        }
        if !is_jpeg(data) {
            return Err(MediaError::InvalidImage);
        }
        Ok(())
    }

    fn store(&self, product_id: i64, data: &[u8]) -> MediaResult<String> {
        self.validate(data)?;

        fs::create_dir_all(&self.root).map_err(|e| MediaError::IoError(e.to_string()))?;
        fs::write(self.full_path(product_id), data)
            .map_err(|e| MediaError::IoError(e.to_string()))?;

        Ok(self.url_for(product_id))
    }

    fn remove(&self, product_id: i64) -> MediaResult<()> {
        match fs::remove_file(self.full_path(product_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::IoError(e.to_string())),
        }
    }

    fn url_for(&self, product_id: i64) -> String {
        format!(
            "{}{}/{}",
            self.public_base_url,
            UPLOADS_ROUTE,
            Self::file_name(product_id)
        )
    }
}

/// JPEG start-of-image marker followed by a marker prefix
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(b"\xff\xd8\xff")
}
