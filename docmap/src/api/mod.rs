//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Mappings** (`/mappings`): list, fetch, download, upload and edit document mappings
//! - **Forms** (`/`, `/admin`, `/assets/*`): the embedded public and admin pages
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with `utoipa` annotations. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;
