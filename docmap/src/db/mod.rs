//! Database layer for document mappings.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to keep SQL out of the HTTP handlers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use docmap::db::handlers::{Mappings, Repository};
//!
//! async fn example(pool: &sqlx::PgPool, key: &docmap::types::MappingKey) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Mappings::new(&mut conn);
//!
//!     if let Some(mapping) = repo.get_by_id(key).await? {
//!         println!("{} is linked to {}", key, mapping.file_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Migrations
//!
//! The schema lives in the `migrations/` directory and is applied at startup through
//! [`crate::migrator`]:
//!
//! ```ignore
//! docmap::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
