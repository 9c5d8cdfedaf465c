use crate::db::models::mappings::MappingDBResponse;
use crate::types::MappingKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Path every mapping operation is served under
pub const MAPPINGS_PATH: &str = "/mappings";

/// Query parameters for `GET /mappings`
///
/// With neither identifier the whole list is returned; with both, the single mapping (or its
/// file when `download` is set).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MappingQuery {
    /// National ID, residency or establishment number
    pub id_number: Option<String>,

    /// Serial or reference number
    pub serial_number: Option<String>,

    /// Set to `1` to receive the file itself instead of its metadata
    #[param(example = "1")]
    pub download: Option<String>,
}

impl MappingQuery {
    pub fn wants_download(&self) -> bool {
        matches!(self.download.as_deref().map(str::trim), Some("1") | Some("true"))
    }

    /// True when neither identifier was supplied (blank values count as absent)
    pub fn is_listing(&self) -> bool {
        is_blank(self.id_number.as_deref()) && is_blank(self.serial_number.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// A document mapping as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingResponse {
    #[schema(example = "1010101010")]
    pub id_number: String,
    #[schema(example = "A-7")]
    pub serial_number: String,
    #[schema(example = "my-file.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub file_type: String,
    /// Relative URL that downloads the stored file
    #[schema(example = "/mappings?idNumber=1010101010&serialNumber=A-7&download=1")]
    pub file_url: String,
    /// Time of the last write to this mapping
    pub created_at: DateTime<Utc>,
}

impl From<MappingDBResponse> for MappingResponse {
    fn from(db: MappingDBResponse) -> Self {
        let file_url = download_url(&db.key());
        Self {
            id_number: db.id_number,
            serial_number: db.serial_number,
            file_name: db.file_name,
            file_type: db.file_type,
            file_url,
            created_at: db.created_at,
        }
    }
}

/// Multipart body accepted by `POST /mappings` (documentation only)
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct MappingUpload {
    pub id_number: String,
    pub serial_number: String,
    /// PDF document
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Multipart body accepted by `PUT /mappings` (documentation only)
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct MappingEdit {
    /// New ID number of the mapping
    pub id_number: String,
    /// New serial number of the mapping
    pub serial_number: String,
    /// Current ID number; defaults to `idNumber`
    pub current_id_number: Option<String>,
    /// Current serial number; defaults to `serialNumber`
    pub current_serial_number: Option<String>,
    /// Replacement PDF; the stored file is kept when omitted
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}

/// Relative download link for a mapping, with both identifiers form-encoded
pub fn download_url(key: &MappingKey) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("idNumber", &key.id_number)
        .append_pair("serialNumber", &key.serial_number)
        .append_pair("download", "1")
        .finish();
    format!("{MAPPINGS_PATH}?{query}")
}
