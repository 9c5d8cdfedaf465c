//! HTTP request handlers.
//!
//! - [`mappings`]: document mapping list, lookup, download, upload and edit
//! - [`static_assets`]: embedded form pages and their scripts
//!
//! Handlers return [`crate::errors::Error`], which converts to a status code and a
//! `{"message": ...}` JSON body.

pub mod mappings;
pub mod static_assets;
