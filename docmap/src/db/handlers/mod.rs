//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed SQLx connection (or transaction), binds parameters and
//! returns models from [`crate::db::models`].
//!
//! - [`Mappings`]: the `document_mappings` table

pub mod mappings;
pub mod repository;

pub use mappings::Mappings;
pub use repository::Repository;
