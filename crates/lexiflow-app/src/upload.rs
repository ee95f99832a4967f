//! Upload surface: accepts a file from the picker or a terminal drop and
//! forwards it to the session.
//!
//! Dropping a file onto most terminals pastes its path, quoted or with
//! backslash-escaped spaces; [`parse_dropped_path`] undoes that.

use std::path::{Path, PathBuf};

use lexiflow_core::document::{ACCEPTED_TYPES_NOTICE, UNKNOWN_MIME};
use lexiflow_core::{SourceFile, is_accepted_mime, mime_for_path, sniff_mime};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::state::{PendingAnalysis, Session, SessionError, Status};

/// Bytes read from the head of a file for content sniffing.
const SNIFF_LEN: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    Picker,
    DragDrop,
}

impl UploadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Picker => "picker",
            Self::DragDrop => "drag-drop",
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploads are disabled while {0}")]
    Disabled(Status),

    #[error("no file given")]
    Empty,

    #[error("cannot open {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("{} ({name} is {mime})", ACCEPTED_TYPES_NOTICE)]
    UnsupportedType { name: String, mime: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Undo terminal drop quoting: `'a b.pdf'`, `"a b.pdf"`, `a\ b.pdf`,
/// `file:///a%20b.pdf` (any percent escape).
pub fn parse_dropped_path(raw: &str) -> Option<PathBuf> {
    let mut s = raw.trim();
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            s = &s[1..s.len() - 1];
            return non_empty(uri_to_path(s));
        }
    }
    if cfg!(windows) || s.starts_with("file://") {
        return non_empty(uri_to_path(s));
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c => out.push(c),
        }
    }
    non_empty(out)
}

fn uri_to_path(s: &str) -> String {
    match s.strip_prefix("file://") {
        Some(rest) => match urlencoding::decode(rest) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => rest.to_string(),
        },
        None => s.to_string(),
    }
}

fn non_empty(s: String) -> Option<PathBuf> {
    if s.is_empty() {
        None
    } else {
        Some(PathBuf::from(s))
    }
}

/// Resolve the file's MIME type: extension first, then content.
async fn resolve_mime(path: &Path) -> Result<String, UploadError> {
    if let Some(mime) = mime_for_path(path) {
        return Ok(mime.to_string());
    }
    let mut head = Vec::with_capacity(SNIFF_LEN);
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| UploadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(|source| UploadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let mime = sniff_mime(&head).unwrap_or(UNKNOWN_MIME);
    debug!(path = %path.display(), mime, "sniffed MIME type");
    Ok(mime.to_string())
}

/// Check that `raw` names a readable image or PDF and describe it.
pub async fn prepare(source: UploadSource, raw: &str) -> Result<SourceFile, UploadError> {
    let path = match source {
        UploadSource::DragDrop => parse_dropped_path(raw),
        UploadSource::Picker => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
        }
    }
    .ok_or(UploadError::Empty)?;

    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|source| UploadError::Unreadable {
            path: path.clone(),
            source,
        })?;
    if !meta.is_file() {
        return Err(UploadError::NotAFile { path });
    }

    let mime = resolve_mime(&path).await?;
    let file = SourceFile::new(path, mime, meta.len());
    if !is_accepted_mime(&file.mime) {
        warn!(file = %file.name, mime = %file.mime, "rejected upload");
        return Err(UploadError::UnsupportedType {
            name: file.name,
            mime: file.mime,
        });
    }
    Ok(file)
}

/// Validate and hand the file to the session. Rejected files leave the
/// session untouched; so does any call made outside `Idle`.
pub async fn submit(
    session: &mut Session,
    source: UploadSource,
    raw: &str,
) -> Result<PendingAnalysis, UploadError> {
    let status = session.status();
    if status != Status::Idle {
        return Err(UploadError::Disabled(status));
    }
    let file = prepare(source, raw).await?;
    info!(
        source = source.as_str(),
        file = %file.name,
        mime = %file.mime,
        size = file.size,
        "upload accepted"
    );
    Ok(session.select_file(file).await?)
}
