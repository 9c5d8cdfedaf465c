//! API request and response data models.
//!
//! API models are distinct from the database models in [`crate::db::models`]; they own the
//! camelCase JSON contract and carry `utoipa` schemas.

pub mod mappings;
