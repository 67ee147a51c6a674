use std::path::PathBuf;

use bytes::Bytes;

use crate::errors::ValidationError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const MAX_FILE_SIZE_MB: u64 = 20;
pub const MAX_FILE_SIZE: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;

/// Where the bytes of a candidate file come from. Never read during validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    Memory(Bytes),
    Path(PathBuf),
}

/// A file the user dropped or picked, described by the metadata the host
/// already knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    pub fn from_path(
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            source: FileSource::Path(path.into()),
        }
    }
}

/// Checks the declared type first, then the size. Returns the file unchanged
/// when both pass.
pub fn validate(file: CandidateFile) -> Result<CandidateFile, ValidationError> {
    if file.content_type != PDF_MEDIA_TYPE {
        return Err(ValidationError::UnsupportedType {
            content_type: file.content_type,
        });
    }

    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size: file.size });
    }

    Ok(file)
}
