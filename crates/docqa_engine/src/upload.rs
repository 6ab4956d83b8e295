use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("path has no file name: {0:?}")]
    MissingFileName(PathBuf),
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A local file ready to be posted as the `file` multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        Self {
            content_type: guess_content_type(&filename).to_string(),
            filename,
            content: content.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let filename = file_name_of(path)?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(filename, content))
    }
}

/// File name component of `path`, used for notices before the upload finishes.
pub fn file_name_of(path: &Path) -> Result<String, UploadError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| UploadError::MissingFileName(path.to_path_buf()))
}

/// The backend rejects parts without a content type, so always send one.
pub fn guess_content_type(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(guess_content_type("Report.PDF"), "application/pdf");
        assert_eq!(guess_content_type("notes.md"), "text/markdown");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }

    #[test]
    fn file_name_is_required() {
        assert!(matches!(
            file_name_of(Path::new("/")),
            Err(UploadError::MissingFileName(_))
        ));
        assert_eq!(file_name_of(Path::new("dir/a.txt")).unwrap(), "a.txt");
    }
}
