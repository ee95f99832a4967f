//! Binary-to-text encoding of uploaded documents.
//!
//! The same encoding backs the local preview (as a data URI) and the inline
//! payload sent to the analysis service.

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use lexiflow_core::SourceFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A document's bytes as standard, padded base64 plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub mime: String,
    pub data: String,
}

impl EncodedDocument {
    /// `data:<mime>;base64,<data>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }
}

pub fn encode_bytes(mime: &str, bytes: &[u8]) -> EncodedDocument {
    EncodedDocument {
        mime: mime.to_string(),
        data: general_purpose::STANDARD.encode(bytes),
    }
}

/// Read the whole file and encode it. Single attempt; I/O errors propagate.
pub async fn encode_file(file: &SourceFile) -> Result<EncodedDocument, EncodeError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| EncodeError::Read {
            path: file.path.clone(),
            source,
        })?;
    debug!(name = %file.name, bytes = bytes.len(), mime = %file.mime, "encoded document");
    Ok(encode_bytes(&file.mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use std::io::Write;

    #[test]
    fn encodes_with_padding() {
        let doc = encode_bytes("image/png", b"ab");
        assert_eq!(doc.data, "YWI=");
        assert_eq!(doc.data_uri(), "data:image/png;base64,YWI=");
    }

    #[test]
    fn empty_input_gives_empty_payload() {
        let doc = encode_bytes("application/pdf", b"");
        assert_eq!(doc.data_uri(), "data:application/pdf;base64,");
    }

    #[tokio::test]
    async fn encodes_file_contents() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4 hello").unwrap();
        let file = SourceFile::new(tmp.path(), "application/pdf", 14);

        let doc = encode_file(&file).await.unwrap();
        assert_eq!(doc.mime, "application/pdf");
        assert_eq!(
            general_purpose::STANDARD.decode(&doc.data).unwrap(),
            b"%PDF-1.4 hello"
        );
        assert!(doc.data_uri().starts_with("data:application/pdf;base64,JVBERi"));
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SourceFile::new(dir.path().join("gone.png"), "image/png", 0);
        let err = encode_file(&file).await.unwrap_err();
        assert!(matches!(err, EncodeError::Read { .. }));
        assert!(err.to_string().contains("gone.png"));
    }
}
