//! Session layer: state machine, upload validation, dashboard, and report rendering.

pub mod dashboard;
pub mod display;
pub mod progress;
pub mod report;
pub mod state;
pub mod upload;

pub use dashboard::{Dashboard, ExportError, Tab};
pub use state::{
    AppState, FALLBACK_MESSAGE, PendingAnalysis, Preview, RequestId, Resolution, Session,
    SessionError, Status,
};
pub use upload::{UploadError, UploadSource};
