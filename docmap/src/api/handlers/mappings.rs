use crate::api::models::mappings::{MappingEdit, MappingQuery, MappingResponse, MappingUpload};
use crate::db::errors::DbError;
use crate::db::handlers::{Mappings, Repository};
use crate::db::models::mappings::{MappingUpdateDBRequest, MappingUpsertDBRequest, StoredFile};
use crate::errors::{Error, KEY_ALREADY_LINKED, Result};
use crate::types::MappingKey;
use crate::uploads::{DEFAULT_CONTENT_TYPE, UploadedFile, attachment_disposition, decode_file_data};
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

const MISSING_REQUIRED_FIELDS: &str = "Missing required fields.";
const FILE_UPLOAD_REQUIRED: &str = "File upload is required.";

/// A file part as it arrived, before validation
#[derive(Debug, Default)]
struct RawFilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// The multipart fields shared by the upload and edit forms
#[derive(Debug, Default)]
struct MappingForm {
    id_number: Option<String>,
    serial_number: Option<String>,
    current_id_number: Option<String>,
    current_serial_number: Option<String>,
    file: Option<RawFilePart>,
}

impl MappingForm {
    fn key(&self) -> Result<MappingKey> {
        MappingKey::from_parts(self.id_number.as_deref(), self.serial_number.as_deref()).ok_or_else(missing_fields)
    }

    /// Key of the row being edited. Each half falls back to the corresponding half of `new_key`.
    fn current_key(&self, new_key: &MappingKey) -> Result<MappingKey> {
        let pick = |current: &Option<String>, fallback: &str| -> String {
            current
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        MappingKey::new(
            &pick(&self.current_id_number, &new_key.id_number),
            &pick(&self.current_serial_number, &new_key.serial_number),
        )
        .ok_or_else(missing_fields)
    }

    /// Validate the file part, if one with content was sent
    fn uploaded_file(&mut self) -> Result<Option<UploadedFile>> {
        match self.file.take() {
            Some(part) if !part.data.is_empty() => {
                UploadedFile::from_part(part.file_name.as_deref(), part.content_type.as_deref(), part.data).map(Some)
            }
            _ => Ok(None),
        }
    }
}

fn missing_fields() -> Error {
    Error::BadRequest {
        message: MISSING_REQUIRED_FIELDS.to_string(),
    }
}

fn payload_too_large(max_file_size: u64) -> Error {
    Error::PayloadTooLarge {
        message: format!(
            "File size exceeds maximum allowed size of {} bytes ({} MB)",
            max_file_size,
            max_file_size / (1024 * 1024)
        ),
    }
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        payload_too_large(max_file_size)
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", err),
        }
    }
}

/// Read every field of a mapping form, aborting as soon as the file exceeds `max_file_size`
async fn read_mapping_form(multipart: &mut Multipart, max_file_size: u64) -> Result<MappingForm> {
    let mut form = MappingForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, max_file_size))? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let mut part = RawFilePart {
                    file_name: field.file_name().map(|s| s.to_string()),
                    content_type: field.content_type().map(|s| s.to_string()),
                    data: Vec::new(),
                };

                while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max_file_size))? {
                    if (part.data.len() + chunk.len()) as u64 > max_file_size {
                        tracing::warn!(
                            file_name = ?part.file_name,
                            max_file_size = max_file_size,
                            "File size limit exceeded, aborting upload"
                        );
                        return Err(payload_too_large(max_file_size));
                    }
                    part.data.extend_from_slice(&chunk);
                }

                tracing::debug!(file_name = ?part.file_name, size = part.data.len(), "Read file part");
                form.file = Some(part);
            }
            "idNumber" | "serialNumber" | "currentIdNumber" | "currentSerialNumber" => {
                let value = field.text().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read {}: {}", field_name, e),
                })?;
                let slot = match field_name.as_str() {
                    "idNumber" => &mut form.id_number,
                    "serialNumber" => &mut form.serial_number,
                    "currentIdNumber" => &mut form.current_id_number,
                    _ => &mut form.current_serial_number,
                };
                *slot = Some(value);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(form)
}

#[utoipa::path(
    get,
    path = "/mappings",
    tag = "mappings",
    summary = "List, get or download mappings",
    description = "Without identifiers, returns every mapping, most recently updated first. With both \
        `idNumber` and `serialNumber`, returns that mapping, or its file when `download=1`.",
    params(MappingQuery),
    responses(
        (status = 200, description = "Mapping list, a single mapping, or the document itself", body = [MappingResponse]),
        (status = 400, description = "Only one identifier was supplied", body = crate::errors::ErrorBody),
        (status = 404, description = "No matching document", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn get_mappings(State(state): State<AppState>, Query(query): Query<MappingQuery>) -> Result<Response> {
    if query.is_listing() {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mappings = Mappings::new(&mut conn).list().await?;
        let data: Vec<MappingResponse> = mappings.into_iter().map(MappingResponse::from).collect();
        return Ok(Json(data).into_response());
    }

    let key = MappingKey::from_parts(query.id_number.as_deref(), query.serial_number.as_deref()).ok_or_else(missing_fields)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Mappings::new(&mut conn);

    if query.wants_download() {
        let content = repo.get_content(&key).await?.ok_or_else(|| Error::NotFound {
            resource: "Document mapping".to_string(),
            id: key.to_string(),
        })?;
        return download_response(&key, content.file_name, content.file_type, &content.file_data_base64);
    }

    let mapping = repo.get_by_id(&key).await?.ok_or_else(|| Error::NotFound {
        resource: "Document mapping".to_string(),
        id: key.to_string(),
    })?;

    Ok(Json(MappingResponse::from(mapping)).into_response())
}

fn download_response(key: &MappingKey, file_name: String, file_type: String, file_data_base64: &str) -> Result<Response> {
    let bytes = decode_file_data(file_data_base64).map_err(|e| {
        Error::Database(DbError::InvalidData {
            message: format!("stored file for {} is not valid base64: {}", key, e),
        })
    })?;

    let content_type = HeaderValue::from_str(&file_type).unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&attachment_disposition(&file_name)).map_err(|_| Error::Internal {
        operation: "build Content-Disposition header".to_string(),
    })?;

    tracing::debug!(key = %key, size = bytes.len(), "Serving document download");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(bytes.len())),
        ],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/mappings",
    tag = "mappings",
    summary = "Upload a document",
    description = "Link a PDF to an ID number and serial number. A second upload for the same pair replaces the stored document.",
    request_body(content = MappingUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = MappingResponse),
        (status = 400, description = "Missing identifiers or invalid file", body = crate::errors::ErrorBody),
        (status = 413, description = "Payload too large", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorBody)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn upsert_mapping(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<MappingResponse>)> {
    let mut form = read_mapping_form(&mut multipart, state.config.uploads.max_file_size).await?;

    let key = form.key()?;
    let file = form.uploaded_file()?.ok_or_else(|| Error::BadRequest {
        message: FILE_UPLOAD_REQUIRED.to_string(),
    })?;

    let request = MappingUpsertDBRequest {
        key,
        file: StoredFile::from(&file),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mapping = Mappings::new(&mut conn).upsert(&request).await?;

    tracing::info!(
        key = %request.key,
        file_name = %mapping.file_name,
        size = file.data.len(),
        "Document linked"
    );

    Ok((StatusCode::CREATED, Json(MappingResponse::from(mapping))))
}

#[utoipa::path(
    put,
    path = "/mappings",
    tag = "mappings",
    summary = "Edit a mapping",
    description = "Change the identifiers of an existing mapping and optionally replace its document. \
        The mapping is addressed by `currentIdNumber`/`currentSerialNumber`, which default to the new identifiers.",
    request_body(content = MappingEdit, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Mapping updated", body = MappingResponse),
        (status = 400, description = "Missing identifiers or invalid file", body = crate::errors::ErrorBody),
        (status = 404, description = "No mapping under the current identifiers", body = crate::errors::ErrorBody),
        (status = 409, description = "The new identifiers belong to another mapping", body = crate::errors::ErrorBody),
        (status = 413, description = "Payload too large", body = crate::errors::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorBody)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn edit_mapping(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<MappingResponse>> {
    let mut form = read_mapping_form(&mut multipart, state.config.uploads.max_file_size).await?;

    let key = form.key()?;
    let current_key = form.current_key(&key)?;
    let file = form.uploaded_file()?;

    let request = MappingUpdateDBRequest {
        key,
        file: file.as_ref().map(StoredFile::from),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mapping = Mappings::new(&mut conn)
        .update(&current_key, &request)
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => Error::Conflict {
                message: KEY_ALREADY_LINKED.to_string(),
            },
            other => Error::Database(other),
        })?;

    tracing::info!(
        key = %current_key,
        new_key = %request.key,
        replaced_file = file.is_some(),
        "Document mapping updated"
    );

    Ok(Json(MappingResponse::from(mapping)))
}
