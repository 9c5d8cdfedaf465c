//! Database record models matching table schemas.
//!
//! Database models are distinct from the API models in [`crate::api::models`], which own the
//! JSON representation.

pub mod mappings;
