//! Opaque image payloads attached to identities and events.

use std::fmt;

/// Largest accepted age-verification document.
pub const VERIFICATION_DOCUMENT_MAX_BYTES: usize = 1024 * 1024;
/// Largest accepted event image.
pub const EVENT_IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Validation errors raised when accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageBlobError {
    /// Content type was not an `image/*` type.
    #[error("only image files are allowed")]
    NotAnImage,
    /// Upload carried no bytes.
    #[error("uploaded file is empty")]
    Empty,
    /// Upload exceeded the size bound.
    #[error("file exceeds the {max} byte limit")]
    TooLarge {
        /// Maximum accepted size in bytes.
        max: usize,
    },
}

/// Image bytes with their declared content type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    content_type: String,
    data: Vec<u8>,
}

impl ImageBlob {
    /// Validate an upload against the content-type rule and a size bound.
    ///
    /// # Examples
    /// ```
    /// use nightlist::domain::{ImageBlob, ImageBlobError};
    ///
    /// let blob = ImageBlob::new("image/png", vec![1, 2, 3], 1024).unwrap();
    /// assert_eq!(blob.len(), 3);
    /// assert_eq!(
    ///     ImageBlob::new("text/plain", vec![1], 1024),
    ///     Err(ImageBlobError::NotAnImage)
    /// );
    /// ```
    pub fn new(
        content_type: impl Into<String>,
        data: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ImageBlobError> {
        let content_type = content_type.into().trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(ImageBlobError::NotAnImage);
        }
        if data.is_empty() {
            return Err(ImageBlobError::Empty);
        }
        if data.len() > max_bytes {
            return Err(ImageBlobError::TooLarge { max: max_bytes });
        }
        Ok(Self { content_type, data })
    }

    /// Rebuild a blob from storage without re-validating it.
    #[must_use]
    pub fn from_stored(content_type: String, data: Vec<u8>) -> Self {
        Self { content_type, data }
    }

    /// Declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob is empty. Only stored blobs can be.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}
