//! Bounded `multipart/form-data` collection for upload endpoints.
//!
//! Parts are buffered in memory. A file part aborts as soon as it exceeds its
//! byte limit, so oversize uploads are rejected without reading the rest.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt as _;
use tracing::warn;

use crate::domain::{Error, ImageBlob, ImageBlobError};

/// Text parts are short form fields; anything longer is rejected.
const TEXT_FIELD_MAX_BYTES: usize = 16 * 1024;

/// Limits for one upload form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UploadLimits {
    /// Name of the part carrying files.
    pub file_field: &'static str,
    /// Maximum number of file parts.
    pub max_files: usize,
    /// Maximum bytes per file part.
    pub max_file_bytes: usize,
}

/// Collected form: validated images in submission order plus text fields.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub images: Vec<ImageBlob>,
    pub text: HashMap<String, String>,
}

impl UploadForm {
    /// Remove and return a text field.
    pub(crate) fn take_text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }
}

fn multipart_error(error: impl std::fmt::Display) -> Error {
    warn!(%error, "multipart payload rejected");
    Error::invalid_request(format!("Malformed multipart payload: {error}"))
}

fn image_error(field: &str, error: &ImageBlobError) -> Error {
    Error::invalid_request(format!("{field}: {error}"))
        .with_details(serde_json::json!({ "field": field }))
}

async fn read_part(field: &mut Field, limit: usize, name: &str) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        if data.len() + chunk.len() > limit {
            return Err(image_error(name, &ImageBlobError::TooLarge { max: limit }));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Drain `payload` into an [`UploadForm`], validating file parts as images.
pub(crate) async fn collect_upload(
    mut payload: Multipart,
    limits: UploadLimits,
) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;
        let name = field.name().unwrap_or_default().to_owned();
        if name == limits.file_field {
            if form.images.len() == limits.max_files {
                return Err(Error::invalid_request(format!(
                    "at most {} files are allowed in {}",
                    limits.max_files, limits.file_field
                )));
            }
            let content_type = field
                .content_type()
                .map(ToString::to_string)
                .unwrap_or_default();
            let data = read_part(&mut field, limits.max_file_bytes, &name).await?;
            let image = ImageBlob::new(content_type, data, limits.max_file_bytes)
                .map_err(|err| image_error(&name, &err))?;
            form.images.push(image);
        } else if !name.is_empty() {
            let bytes = read_part(&mut field, TEXT_FIELD_MAX_BYTES, &name).await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| Error::invalid_request(format!("{name} must be UTF-8 text")))?;
            form.text.insert(name, value);
        }
    }
    Ok(form)
}
