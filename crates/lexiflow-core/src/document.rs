//! Uploaded source files and the MIME policy for what can be analyzed.

use std::path::{Path, PathBuf};

pub const PDF_MIME: &str = "application/pdf";

/// Fallback when neither the extension nor the content identifies the file.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Notice shown when a file outside the accepted types is offered.
pub const ACCEPTED_TYPES_NOTICE: &str = "Please upload an image (JPG, PNG) or a PDF document.";

// ── Extension table ──

const EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("pdf", PDF_MIME),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("rtf", "application/rtf"),
    ("zip", "application/zip"),
];

/// A file offered for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Display name (final path component).
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            mime: mime.into(),
            size,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME
    }
}

/// MIME type implied by a file's extension (case-insensitive).
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// MIME type from the leading magic bytes of a file.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// `image/*` or exactly `application/pdf`.
pub fn is_accepted_mime(mime: &str) -> bool {
    mime.starts_with("image/") || mime == PDF_MIME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("scan.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("lease.Pdf")), Some(PDF_MIME));
        assert_eq!(mime_for_path(Path::new("a/b/photo.jpeg")), Some("image/jpeg"));
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(mime_for_path(Path::new("contract")), None);
        assert_eq!(mime_for_path(Path::new("contract.xyz")), None);
    }

    #[test]
    fn accepted_types() {
        assert!(is_accepted_mime("image/png"));
        assert!(is_accepted_mime("image/heic"));
        assert!(is_accepted_mime(PDF_MIME));
        assert!(!is_accepted_mime("text/plain"));
        assert!(!is_accepted_mime("application/pdfx"));
        assert!(!is_accepted_mime(UNKNOWN_MIME));
    }

    #[test]
    fn sniffs_pdf_and_png() {
        assert_eq!(sniff_mime(b"%PDF-1.7\n%\xe2\xe3"), Some(PDF_MIME));
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(sniff_mime(&png), Some("image/png"));
        assert_eq!(sniff_mime(b"plain words"), None);
    }

    #[test]
    fn source_file_name_and_kind() {
        let f = SourceFile::new("/tmp/docs/nda.pdf", PDF_MIME, 42);
        assert_eq!(f.name, "nda.pdf");
        assert!(f.is_pdf());
        assert!(!SourceFile::new("scan.png", "image/png", 1).is_pdf());
    }
}
