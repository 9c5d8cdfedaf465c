//! Repository for the `document_mappings` table.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::mappings::{MappingContentDBResponse, MappingDBResponse, MappingUpdateDBRequest, MappingUpsertDBRequest},
};
use crate::types::MappingKey;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Mappings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Mappings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch the stored file of a mapping
    #[instrument(skip(self), fields(key = %key), err)]
    pub async fn get_content(&mut self, key: &MappingKey) -> Result<Option<MappingContentDBResponse>> {
        let content = sqlx::query_as::<_, MappingContentDBResponse>(
            r#"
            SELECT file_name, file_type, file_data_base64
            FROM document_mappings
            WHERE id_number = $1 AND serial_number = $2
            "#,
        )
        .bind(&key.id_number)
        .bind(&key.serial_number)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(content)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Mappings<'c> {
    type UpsertRequest = MappingUpsertDBRequest;
    type UpdateRequest = MappingUpdateDBRequest;
    type Response = MappingDBResponse;
    type Id = MappingKey;

    #[instrument(skip(self, request), fields(key = %request.key, file_name = %request.file.file_name), err)]
    async fn upsert(&mut self, request: &Self::UpsertRequest) -> Result<Self::Response> {
        let mapping = sqlx::query_as::<_, MappingDBResponse>(
            r#"
            INSERT INTO document_mappings (id_number, serial_number, file_name, file_type, file_data_base64)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id_number, serial_number)
            DO UPDATE SET
                file_name = EXCLUDED.file_name,
                file_type = EXCLUDED.file_type,
                file_data_base64 = EXCLUDED.file_data_base64,
                created_at = NOW()
            RETURNING id_number, serial_number, file_name, file_type, created_at
            "#,
        )
        .bind(&request.key.id_number)
        .bind(&request.key.serial_number)
        .bind(&request.file.file_name)
        .bind(&request.file.file_type)
        .bind(&request.file.file_data_base64)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(mapping)
    }

    #[instrument(skip(self), fields(key = %id), err)]
    async fn get_by_id(&mut self, id: &Self::Id) -> Result<Option<Self::Response>> {
        let mapping = sqlx::query_as::<_, MappingDBResponse>(
            r#"
            SELECT id_number, serial_number, file_name, file_type, created_at
            FROM document_mappings
            WHERE id_number = $1 AND serial_number = $2
            "#,
        )
        .bind(&id.id_number)
        .bind(&id.serial_number)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(mapping)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let mappings = sqlx::query_as::<_, MappingDBResponse>(
            r#"
            SELECT id_number, serial_number, file_name, file_type, created_at
            FROM document_mappings
            ORDER BY created_at DESC, id_number ASC, serial_number ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(mappings)
    }

    #[instrument(skip(self, request), fields(key = %id, new_key = %request.key, replaces_file = request.file.is_some()), err(level = "debug"))]
    async fn update(&mut self, id: &Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let file = request.file.as_ref();

        // fetch_one turns a missing row into DbError::NotFound; moving onto a key that another row
        // owns fails the primary key with a unique violation. Both are caller mistakes.
        let mapping = sqlx::query_as::<_, MappingDBResponse>(
            r#"
            UPDATE document_mappings
            SET
                id_number = $3,
                serial_number = $4,
                file_name = COALESCE($5, file_name),
                file_type = COALESCE($6, file_type),
                file_data_base64 = COALESCE($7, file_data_base64),
                created_at = NOW()
            WHERE id_number = $1 AND serial_number = $2
            RETURNING id_number, serial_number, file_name, file_type, created_at
            "#,
        )
        .bind(&id.id_number)
        .bind(&id.serial_number)
        .bind(&request.key.id_number)
        .bind(&request.key.serial_number)
        .bind(file.map(|f| f.file_name.as_str()))
        .bind(file.map(|f| f.file_type.as_str()))
        .bind(file.map(|f| f.file_data_base64.as_str()))
        .fetch_one(&mut *self.db)
        .await?;

        Ok(mapping)
    }
}
