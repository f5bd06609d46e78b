//! Sighting image upload validation.
//!
//! Uploaded files are checked for extension, size and decodability before
//! being stored under a random name. Writing the bytes is left to the caller.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};

/// Default size ceiling for one uploaded file (8 MB).
pub const DEFAULT_MAX_BYTES: usize = 8 * 1024 * 1024;

/// Default longest-side limit in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

/// Extensions accepted by default, lowercase with leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// URL prefix under which stored files are served.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/static/uploads";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No files were uploaded")]
    NoFiles,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large (max {} MB)", .max_bytes / (1024 * 1024))]
    TooLarge { max_bytes: usize },

    #[error("Invalid image file")]
    InvalidImage,

    #[error("Image is {width}x{height}, larger than the {max}px limit")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },
}

/// Upload limits and storage location, fixed at startup.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory stored files are written to.
    pub upload_dir: PathBuf,
    pub max_bytes: usize,
    pub max_dimension: u32,
    /// Lowercase extensions including the leading dot.
    pub allowed_extensions: Vec<String>,
    /// URL path prefix returned to clients, without trailing slash.
    pub public_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
            max_bytes: DEFAULT_MAX_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
        }
    }
}

impl UploadConfig {
    /// Validate one upload and pick its stored name.
    ///
    /// Checks run cheapest first: extension, byte size, then the image header.
    /// The content's format must agree with the extension.
    pub fn validate(&self, filename: &str, bytes: &[u8]) -> Result<ValidatedImage, UploadError> {
        let extension = extension_of(filename);
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(UploadError::UnsupportedType(extension));
        }

        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|_| UploadError::InvalidImage)?;
        let declared = ImageFormat::from_extension(extension.trim_start_matches('.'));
        if reader.format().is_none() || reader.format() != declared {
            return Err(UploadError::InvalidImage);
        }
        let (width, height) = reader
            .into_dimensions()
            .map_err(|_| UploadError::InvalidImage)?;

        if width.max(height) > self.max_dimension {
            return Err(UploadError::DimensionsTooLarge {
                width,
                height,
                max: self.max_dimension,
            });
        }

        let stored_ext = if extension == ".jpeg" { ".jpg" } else { extension.as_str() };
        Ok(ValidatedImage {
            file_name: format!("{}{stored_ext}", uuid::Uuid::new_v4().simple()),
            width,
            height,
        })
    }

    /// Filesystem path for a stored file.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.upload_dir.join(file_name)
    }

    /// Public URL for a stored file.
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.public_prefix.trim_end_matches('/'))
    }
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    /// Random name with normalized extension, e.g. `3f2a...c1.jpg`.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Lowercased extension with leading dot, or an empty string.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}
