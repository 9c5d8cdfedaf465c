//! Common type definitions.
//!
//! A document mapping is addressed by the pair of identifiers the administrator typed in when the
//! document was uploaded:
//!
//! - the national / residency / establishment ID number
//! - the serial (reference) number
//!
//! [`MappingKey`] is the only way handlers and repositories refer to a row, so every key that
//! reaches the database has already been trimmed and checked for emptiness.

use std::fmt;

/// Composite primary key of a document mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingKey {
    pub id_number: String,
    pub serial_number: String,
}

impl MappingKey {
    /// Build a key from raw user input. Surrounding whitespace is ignored; returns `None` if either
    /// half is empty afterwards.
    pub fn new(id_number: &str, serial_number: &str) -> Option<Self> {
        let id_number = id_number.trim();
        let serial_number = serial_number.trim();

        if id_number.is_empty() || serial_number.is_empty() {
            return None;
        }

        Some(Self {
            id_number: id_number.to_string(),
            serial_number: serial_number.to_string(),
        })
    }

    /// Like [`MappingKey::new`], but for optional inputs (query parameters, multipart fields).
    pub fn from_parts(id_number: Option<&str>, serial_number: Option<&str>) -> Option<Self> {
        Self::new(id_number?, serial_number?)
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_number, self.serial_number)
    }
}
