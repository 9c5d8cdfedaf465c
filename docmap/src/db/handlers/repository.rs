//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is basically a data access layer for a postgres table. It provides methods for
/// writing, reading, updating and listing entities. There is no delete: rows are only
/// ever overwritten.
///
/// Each repository is generic over the entity type it returns, which must implement sqlx::FromRow.
use crate::db::errors::Result;

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for write requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for inserting-or-replacing entities
    type UpsertRequest;

    /// The request type for updating entities in place
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Insert an entity, or replace the one already stored under the same ID
    async fn upsert(&mut self, request: &Self::UpsertRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: &Self::Id) -> Result<Option<Self::Response>>;

    /// List all entities, most recently written first
    async fn list(&mut self) -> Result<Vec<Self::Response>>;

    /// Update the entity stored under `id`. Fails with `DbError::NotFound` if there is none.
    async fn update(&mut self, id: &Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
