use crate::types::MappingKey;
use crate::uploads::UploadedFile;
use chrono::{DateTime, Utc};

/// File columns of a mapping row, with the bytes already base64-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub file_type: String,
    pub file_data_base64: String,
}

impl From<&UploadedFile> for StoredFile {
    fn from(file: &UploadedFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            file_type: file.content_type.clone(),
            file_data_base64: file.to_base64(),
        }
    }
}

/// Database request for inserting a mapping or replacing the one under the same key
#[derive(Debug, Clone)]
pub struct MappingUpsertDBRequest {
    pub key: MappingKey,
    pub file: StoredFile,
}

/// Database request for editing an existing mapping
#[derive(Debug, Clone)]
pub struct MappingUpdateDBRequest {
    /// Key the mapping should have after the update (may equal the current one)
    pub key: MappingKey,
    /// Replacement file; `None` keeps the stored one
    pub file: Option<StoredFile>,
}

/// Mapping metadata, as returned by every query that does not need the file bytes
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MappingDBResponse {
    pub id_number: String,
    pub serial_number: String,
    pub file_name: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

impl MappingDBResponse {
    pub fn key(&self) -> MappingKey {
        MappingKey {
            id_number: self.id_number.clone(),
            serial_number: self.serial_number.clone(),
        }
    }
}

/// The stored file of a mapping, for downloads
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MappingContentDBResponse {
    pub file_name: String,
    pub file_type: String,
    pub file_data_base64: String,
}
