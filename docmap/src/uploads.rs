//! Uploaded document handling: filename sanitization, PDF checks, and the base64 text encoding the
//! bytes are persisted in.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::errors::{Error, Result};

/// Name used when an upload has no usable filename.
pub const DEFAULT_FILE_NAME: &str = "document.pdf";

/// MIME type recorded when the client did not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// A validated document ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Sanitized filename
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Validate a raw multipart file part.
    ///
    /// Rejects empty uploads and filenames whose extension is not `pdf`. A part without a filename
    /// is accepted and stored as [`DEFAULT_FILE_NAME`].
    pub fn from_part(file_name: Option<&str>, content_type: Option<&str>, data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::BadRequest {
                message: "File upload is required.".to_string(),
            });
        }

        let file_name = match file_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) if !has_pdf_extension(name) => {
                return Err(Error::BadRequest {
                    message: "Only PDF files are allowed.".to_string(),
                });
            }
            Some(name) => sanitize_file_name(name),
            None => DEFAULT_FILE_NAME.to_string(),
        };

        // Browsers and HTTP clients fall back to octet-stream for parts they cannot type
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case(GENERIC_CONTENT_TYPE))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    /// The file bytes as standard padded base64, the form they are persisted in.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Decode file bytes read back from storage.
pub fn decode_file_data(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

/// Whether the last dot-separated segment of `name` is `pdf` (any case).
pub fn has_pdf_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Reduce a filename to `[a-z0-9._-]`.
///
/// Runs of whitespace become a single `-`, every other character outside the safe set is dropped
/// and the result is lowercased. Names left without an alphanumeric stem fall back to
/// [`DEFAULT_FILE_NAME`].
pub fn sanitize_file_name(name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                safe.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            safe.push(c.to_ascii_lowercase());
        }
    }

    let stem = safe.rsplit_once('.').map_or(safe.as_str(), |(stem, _)| stem);
    if !stem.chars().any(|c| c.is_ascii_alphanumeric()) {
        return DEFAULT_FILE_NAME.to_string();
    }

    safe
}

/// `Content-Disposition` value that makes browsers save the file under its sanitized name.
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_spaces_and_punctuation() {
        assert_eq!(sanitize_file_name("My File!.pdf"), "my-file.pdf");
        assert_eq!(sanitize_file_name("Annual   Report (2024).PDF"), "annual-report-2024.pdf");
        assert_eq!(sanitize_file_name("already_safe-name.pdf"), "already_safe-name.pdf");
    }

    #[test]
    fn test_sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize_file_name(""), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_file_name("!!!"), DEFAULT_FILE_NAME);
        // Arabic-only names lose their whole stem
        assert_eq!(sanitize_file_name("شهادة.pdf"), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_file_name("شهادة 2024.pdf"), "-2024.pdf");
    }

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension("a.pdf"));
        assert!(has_pdf_extension("a.PDF"));
        assert!(has_pdf_extension("archive.tar.pdf"));
        assert!(!has_pdf_extension("a.docx"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("a.pdf.exe"));
    }

    #[test]
    fn test_from_part_rejects_non_pdf() {
        let err = UploadedFile::from_part(Some("notes.txt"), Some("text/plain"), b"hello".to_vec()).unwrap_err();
        assert_eq!(err.user_message(), "Only PDF files are allowed.");
    }

    #[test]
    fn test_from_part_rejects_empty_file() {
        let err = UploadedFile::from_part(Some("empty.pdf"), None, Vec::new()).unwrap_err();
        assert_eq!(err.user_message(), "File upload is required.");
    }

    #[test]
    fn test_from_part_defaults() {
        let file = UploadedFile::from_part(None, None, b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(file.file_name, DEFAULT_FILE_NAME);
        assert_eq!(file.content_type, DEFAULT_CONTENT_TYPE);

        let file = UploadedFile::from_part(Some("Contract Copy.pdf"), Some("application/pdf"), b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(file.file_name, "contract-copy.pdf");
    }

    #[test]
    fn test_generic_content_type_is_recorded_as_pdf() {
        let file = UploadedFile::from_part(Some("scan.pdf"), Some("application/octet-stream"), b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(file.content_type, DEFAULT_CONTENT_TYPE);

        let file = UploadedFile::from_part(Some("scan.pdf"), Some("  "), b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(file.content_type, DEFAULT_CONTENT_TYPE);

        let file = UploadedFile::from_part(Some("scan.pdf"), Some("application/x-pdf"), b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(file.content_type, "application/x-pdf");
    }

    #[test]
    fn test_base64_storage_form() {
        let file = UploadedFile::from_part(Some("a.pdf"), None, b"%PDF-1.7\n".to_vec()).unwrap();
        let encoded = file.to_base64();
        assert_eq!(encoded, "JVBERi0xLjcK");
        assert_eq!(decode_file_data(&encoded).unwrap(), file.data);
        assert!(decode_file_data("not base64!").is_err());
    }

    #[test]
    fn test_attachment_disposition_is_sanitized() {
        assert_eq!(attachment_disposition("My \"quoted\" file.pdf"), "attachment; filename=\"my-quoted-file.pdf\"");
    }
}
