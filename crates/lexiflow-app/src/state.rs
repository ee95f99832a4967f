//! Application state machine.
//!
//! `Idle → Analyzing → Complete | Error`, and back to `Idle` on reset. Payload
//! lives on the variant it belongs to, and every change goes through a named
//! transition on [`Session`].
//!
//! An analysis outcome is only committed if the session is still waiting on
//! the same [`RequestId`]; anything else is a stale result from an abandoned
//! request and is dropped.

use std::fmt;
use std::sync::Arc;

use lexiflow_ai::{AnalysisError, Analyzer, EncodeError, EncodedDocument, encode_file};
use lexiflow_core::{DocumentAnalysis, SourceFile};
use thiserror::Error;
use tracing::{debug, error, info};

/// The only failure text ever shown to the user. Causes go to the log.
pub const FALLBACK_MESSAGE: &str =
    "Analysis failed. Please ensure your API key is valid and try again.";

/// Identity of one `select_file` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderable encoding of the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub mime: String,
    pub data_uri: String,
}

impl Preview {
    pub fn is_pdf(&self) -> bool {
        self.data_uri.starts_with("data:application/pdf")
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_pdf() { "PDF" } else { "Image" }
    }
}

impl From<EncodedDocument> for Preview {
    fn from(doc: EncodedDocument) -> Self {
        let data_uri = doc.data_uri();
        Self {
            mime: doc.mime,
            data_uri,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Analyzing,
    Complete,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum AppState {
    Idle,
    Analyzing {
        file: SourceFile,
        preview: Preview,
        request: RequestId,
    },
    Complete {
        file: SourceFile,
        preview: Preview,
        analysis: Arc<DocumentAnalysis>,
    },
    Error {
        file: SourceFile,
        /// `None` when the preview itself could not be built.
        preview: Option<Preview>,
        message: &'static str,
    },
}

impl AppState {
    pub fn status(&self) -> Status {
        match self {
            Self::Idle => Status::Idle,
            Self::Analyzing { .. } => Status::Analyzing,
            Self::Complete { .. } => Status::Complete,
            Self::Error { .. } => Status::Error,
        }
    }

    pub fn file(&self) -> Option<&SourceFile> {
        match self {
            Self::Idle => None,
            Self::Analyzing { file, .. }
            | Self::Complete { file, .. }
            | Self::Error { file, .. } => Some(file),
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        match self {
            Self::Idle => None,
            Self::Analyzing { preview, .. } | Self::Complete { preview, .. } => Some(preview),
            Self::Error { preview, .. } => preview.as_ref(),
        }
    }

    pub fn analysis(&self) -> Option<&Arc<DocumentAnalysis>> {
        match self {
            Self::Complete { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Error { message, .. } => Some(*message),
            _ => None,
        }
    }
}

/// Ticket for an analysis the caller must run and hand back to
/// [`Session::resolve`].
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub id: RequestId,
    pub file: SourceFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(Status),
    /// The session moved on; the outcome was discarded.
    Stale,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot select a file while {0}; reset first")]
    Busy(Status),

    #[error("could not build a preview: {0}")]
    Preview(#[source] EncodeError),
}

/// Owner of the single [`AppState`].
#[derive(Debug)]
pub struct Session {
    state: AppState,
    last_request: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
            last_request: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// `Idle → Analyzing`. The preview is built before the state changes, so
    /// it exists before any analysis result can arrive.
    ///
    /// If the preview cannot be built the session moves to `Error` and
    /// [`SessionError::Preview`] is returned.
    pub async fn select_file(&mut self, file: SourceFile) -> Result<PendingAnalysis, SessionError> {
        let status = self.status();
        if status != Status::Idle {
            return Err(SessionError::Busy(status));
        }

        let preview = match encode_file(&file).await {
            Ok(doc) => Preview::from(doc),
            Err(e) => {
                error!(file = %file.name, error = %e, "preview failed");
                self.state = AppState::Error {
                    file,
                    preview: None,
                    message: FALLBACK_MESSAGE,
                };
                return Err(SessionError::Preview(e));
            }
        };

        self.last_request += 1;
        let id = RequestId(self.last_request);
        info!(request = %id, file = %file.name, mime = %file.mime, "analysis started");
        self.state = AppState::Analyzing {
            file: file.clone(),
            preview,
            request: id,
        };
        Ok(PendingAnalysis { id, file })
    }

    /// `Analyzing → Complete | Error`, only for the request still in flight.
    pub fn resolve(
        &mut self,
        id: RequestId,
        outcome: Result<DocumentAnalysis, AnalysisError>,
    ) -> Resolution {
        let (file, preview) = match std::mem::replace(&mut self.state, AppState::Idle) {
            AppState::Analyzing {
                file,
                preview,
                request,
            } if request == id => (file, preview),
            other => {
                self.state = other;
                debug!(request = %id, status = %self.status(), "dropping stale analysis result");
                return Resolution::Stale;
            }
        };

        self.state = match outcome {
            Ok(analysis) => {
                info!(
                    request = %id,
                    document_type = %analysis.document_type,
                    risks = analysis.risks.len(),
                    checklist = analysis.checklist.len(),
                    "analysis committed"
                );
                AppState::Complete {
                    file,
                    preview,
                    analysis: Arc::new(analysis),
                }
            }
            Err(e) => {
                error!(
                    request = %id,
                    category = e.category().as_str(),
                    error = %e,
                    "analysis failed"
                );
                AppState::Error {
                    file,
                    preview: Some(preview),
                    message: FALLBACK_MESSAGE,
                }
            }
        };
        Resolution::Applied(self.status())
    }

    /// Back to `Idle` from any state. From `Analyzing` this abandons the
    /// request: it keeps running, but its outcome will be stale.
    pub fn reset(&mut self) {
        if let AppState::Analyzing { request, .. } = &self.state {
            info!(request = %request, "abandoning in-flight analysis");
        }
        self.state = AppState::Idle;
    }

    /// Select, analyze and resolve in one sequential step.
    pub async fn analyze_with<A: Analyzer + ?Sized>(
        &mut self,
        analyzer: &A,
        file: SourceFile,
    ) -> Result<Status, SessionError> {
        let pending = self.select_file(file).await?;
        let outcome = analyzer.analyze(&pending.file).await;
        self.resolve(pending.id, outcome);
        Ok(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{nda, png_scan};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Canned(fn() -> Result<DocumentAnalysis, AnalysisError>);

    #[async_trait]
    impl Analyzer for Canned {
        async fn analyze(&self, _file: &SourceFile) -> Result<DocumentAnalysis, AnalysisError> {
            (self.0)()
        }
    }

    fn assert_cleared(state: &AppState) {
        assert_eq!(state.status(), Status::Idle);
        assert!(state.file().is_none());
        assert!(state.preview().is_none());
        assert!(state.analysis().is_none());
        assert!(state.error_message().is_none());
    }

    #[test]
    fn starts_idle_and_empty() {
        assert_cleared(Session::new().state());
    }

    #[tokio::test]
    async fn select_file_builds_preview_before_resolution() {
        let (_tmp, file) = png_scan();
        let mut session = Session::new();
        let pending = session.select_file(file.clone()).await.unwrap();

        assert_eq!(session.status(), Status::Analyzing);
        let preview = session.state().preview().unwrap();
        assert!(preview.data_uri.starts_with("data:image/png;base64,"));
        assert!(preview.data_uri.len() > "data:image/png;base64,".len());
        assert_eq!(preview.kind_label(), "Image");
        assert_eq!(pending.file, file);
        assert!(session.state().analysis().is_none());
    }

    #[tokio::test]
    async fn success_reaches_complete() {
        let (_tmp, file) = png_scan();
        let mut session = Session::new();
        let status = session
            .analyze_with(&Canned(|| Ok(nda())), file)
            .await
            .unwrap();

        assert_eq!(status, Status::Complete);
        let analysis = session.state().analysis().unwrap();
        assert_eq!(**analysis, nda());
        assert!(analysis.checklist.iter().all(|i| !i.is_completed));
        assert!(session.state().preview().is_some());
        assert!(session.state().error_message().is_none());
    }

    #[tokio::test]
    async fn every_failure_kind_reaches_error_with_fixed_message() {
        let failures: [fn() -> Result<DocumentAnalysis, AnalysisError>; 5] = [
            || Err(AnalysisError::EmptyResponse),
            || Err(lexiflow_ai::parse_analysis("{oops").unwrap_err()),
            || Err(AnalysisError::MissingApiKey),
            || {
                Err(AnalysisError::Server {
                    status: 429,
                    body: "rate limited".into(),
                })
            },
            || Err(AnalysisError::Timeout(Duration::from_secs(1))),
        ];
        for failure in failures {
            let (_tmp, file) = png_scan();
            let mut session = Session::new();
            let status = session.analyze_with(&Canned(failure), file).await.unwrap();
            assert_eq!(status, Status::Error);
            assert_eq!(session.state().error_message(), Some(FALLBACK_MESSAGE));
            assert!(session.state().analysis().is_none());
        }
    }

    #[tokio::test]
    async fn reset_clears_complete_and_error() {
        for canned in [
            Canned(|| Ok(nda())),
            Canned(|| Err(AnalysisError::EmptyResponse)),
        ] {
            let (_tmp, file) = png_scan();
            let mut session = Session::new();
            session.analyze_with(&canned, file).await.unwrap();
            assert_ne!(session.status(), Status::Idle);
            session.reset();
            assert_cleared(session.state());
        }
    }

    #[tokio::test]
    async fn second_select_while_analyzing_is_busy() {
        let (_tmp, file) = png_scan();
        let mut session = Session::new();
        session.select_file(file.clone()).await.unwrap();
        let err = session.select_file(file).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy(Status::Analyzing)));
    }

    #[tokio::test]
    async fn result_after_reset_is_dropped() {
        let (_tmp, file) = png_scan();
        let mut session = Session::new();
        let first = session.select_file(file.clone()).await.unwrap();
        session.reset();

        assert_eq!(session.resolve(first.id, Ok(nda())), Resolution::Stale);
        assert_cleared(session.state());

        // A newer request must not be completed by the old one.
        let second = session.select_file(file).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(
            session.resolve(first.id, Err(AnalysisError::EmptyResponse)),
            Resolution::Stale
        );
        assert_eq!(session.status(), Status::Analyzing);
        assert_eq!(
            session.resolve(second.id, Ok(nda())),
            Resolution::Applied(Status::Complete)
        );
    }

    #[tokio::test]
    async fn unreadable_file_fails_into_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SourceFile::new(dir.path().join("missing.pdf"), "application/pdf", 0);
        let mut session = Session::new();
        let err = session.select_file(file).await.unwrap_err();
        assert!(matches!(err, SessionError::Preview(_)));
        assert_eq!(session.status(), Status::Error);
        assert_eq!(session.state().error_message(), Some(FALLBACK_MESSAGE));
        assert!(session.state().preview().is_none());
    }

    #[test]
    fn pdf_preview_label() {
        let preview = Preview::from(lexiflow_ai::encode_bytes("application/pdf", b"%PDF"));
        assert!(preview.is_pdf());
        assert_eq!(preview.kind_label(), "PDF");
    }
}
