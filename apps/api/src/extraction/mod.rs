//! Text Extractor: turns an uploaded résumé blob into plain text.
//!
//! Three declared media types are accepted: PDF, DOCX and plain text. None of
//! the decoders reconstruct layout; they recover readable text in document
//! order and nothing more.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

mod docx;
mod pdf;

/// Upper bound on upload size: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const TEXT_MIME: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Pdf,
    Docx,
    PlainText,
}

impl MediaType {
    /// Parses a declared MIME type. Parameters (`; charset=utf-8`) and case
    /// are ignored.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            TEXT_MIME => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::PlainText => TEXT_MIME,
        }
    }
}

/// A file as received at the upload boundary: raw bytes plus what the client
/// declared about them.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Pre-flight rejection. The messages are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FileRejection {
    #[error("File size must be less than 10MB")]
    FileTooLarge { size: u64 },

    #[error("File type not supported. Please upload PDF, DOCX, or TXT files.")]
    InvalidFileType { media_type: String },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Please upload PDF, DOCX, or TXT files.")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from file: {0}")]
    ExtractionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Checks size first, then declared type.
pub fn validate_file(file: &UploadedFile) -> Result<MediaType, FileRejection> {
    if file.size > MAX_FILE_SIZE {
        return Err(FileRejection::FileTooLarge { size: file.size });
    }
    MediaType::from_mime(&file.media_type).ok_or_else(|| FileRejection::InvalidFileType {
        media_type: file.media_type.clone(),
    })
}

/// Extracts plain text according to the file's declared media type.
pub fn extract_text(file: &UploadedFile) -> Result<String, ExtractionError> {
    let media_type = MediaType::from_mime(&file.media_type)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(file.media_type.clone()))?;

    match media_type {
        MediaType::Pdf => Ok(pdf::recover_text(&file.bytes)),
        MediaType::Docx => docx::recover_text(&file.bytes),
        MediaType::PlainText => Ok(String::from_utf8_lossy(&file.bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_file(body: &str) -> UploadedFile {
        UploadedFile::new("resume.txt", "text/plain", Bytes::from(body.to_string()))
    }

    #[test]
    fn test_media_type_ignores_parameters_and_case() {
        assert_eq!(
            MediaType::from_mime("Text/Plain; charset=UTF-8"),
            Some(MediaType::PlainText)
        );
        assert_eq!(MediaType::from_mime("application/pdf"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_mime(DOCX_MIME), Some(MediaType::Docx));
        assert_eq!(MediaType::from_mime("application/msword"), None);
        assert_eq!(MediaType::from_mime(""), None);
    }

    #[test]
    fn test_validate_accepts_exact_ceiling() {
        let mut file = text_file("x");
        file.size = MAX_FILE_SIZE;
        assert_eq!(validate_file(&file), Ok(MediaType::PlainText));
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let mut file = text_file("x");
        file.size = MAX_FILE_SIZE + 1;
        let err = validate_file(&file).unwrap_err();
        assert_eq!(err, FileRejection::FileTooLarge { size: MAX_FILE_SIZE + 1 });
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn test_validate_size_checked_before_type() {
        let file = UploadedFile {
            file_name: "photo.png".to_string(),
            media_type: "image/png".to_string(),
            size: MAX_FILE_SIZE * 2,
            bytes: Bytes::new(),
        };
        assert!(matches!(
            validate_file(&file),
            Err(FileRejection::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let file = UploadedFile::new("photo.png", "image/png", Bytes::from_static(b"\x89PNG"));
        assert_eq!(
            validate_file(&file),
            Err(FileRejection::InvalidFileType {
                media_type: "image/png".to_string()
            })
        );
    }

    #[test]
    fn test_plain_text_is_verbatim() {
        let body = "Jane Doe\r\n\r\n  Senior Engineer\tRemote\nCafé ☕\n";
        assert_eq!(extract_text(&text_file(body)).unwrap(), body);
    }

    #[test]
    fn test_plain_text_legacy_encoding_is_decoded_lossily() {
        let file = UploadedFile::new(
            "resume.txt",
            "text/plain",
            Bytes::from_static(b"Jos\xe9 P\xe9rez\nPython developer"),
        );
        assert_eq!(
            extract_text(&file).unwrap(),
            "Jos\u{FFFD} P\u{FFFD}rez\nPython developer"
        );
    }

    #[test]
    fn test_unsupported_format() {
        let file = UploadedFile::new("resume.rtf", "application/rtf", Bytes::from_static(b"{\\rtf1}"));
        match extract_text(&file) {
            Err(ExtractionError::UnsupportedFormat(mime)) => assert_eq!(mime, "application/rtf"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_pdf_dispatch() {
        let file = UploadedFile::new(
            "resume.pdf",
            "application/pdf",
            Bytes::from_static(b"%PDF-1.4\n(Jane Doe)\x00\x01Tj"),
        );
        assert_eq!(extract_text(&file).unwrap(), "%PDF-1.4 (Jane Doe) Tj");
    }
}
