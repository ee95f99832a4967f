//! Dashboard for a completed analysis.
//!
//! Holds a local copy of the checklist so completion ticks never touch the
//! immutable [`DocumentAnalysis`] owned by the session. Ticks are lost on reset.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use lexiflow_core::{ChecklistItem, DocumentAnalysis, RiskLevel, SourceFile};
use thiserror::Error;
use tracing::{info, warn};

use crate::display;
use crate::report::render_report;
use crate::state::{AppState, Preview, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Risks,
    Checklist,
    ExtractedText,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Risks, Tab::Checklist, Tab::ExtractedText];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Risks => "Risk Analysis",
            Self::Checklist => "Action Plan",
            Self::ExtractedText => "Extracted Text",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Risks => "risks",
            Self::Checklist => "checklist",
            Self::ExtractedText => "text",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown tab {0:?} (expected overview, risks, checklist or text)")]
pub struct UnknownTab(String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "risks" | "risk" => Ok(Self::Risks),
            "checklist" | "plan" => Ok(Self::Checklist),
            "text" | "ocr" | "extracted-text" => Ok(Self::ExtractedText),
            _ => Err(UnknownTab(s.to_string())),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    file: SourceFile,
    preview: Preview,
    analysis: Arc<DocumentAnalysis>,
    checklist: Vec<ChecklistItem>,
    tab: Tab,
}

impl Dashboard {
    /// Mount over a `Complete` session; `None` in any other state.
    pub fn mount(state: &AppState) -> Option<Self> {
        match state {
            AppState::Complete {
                file,
                preview,
                analysis,
            } => Some(Self {
                file: file.clone(),
                preview: preview.clone(),
                checklist: analysis.checklist.clone(),
                analysis: Arc::clone(analysis),
                tab: Tab::default(),
            }),
            _ => None,
        }
    }

    pub fn analysis(&self) -> &DocumentAnalysis {
        &self.analysis
    }

    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// The local checklist, including completion ticks.
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Flip completion for the item with `id`. Returns the new value, or
    /// `None` when no item matches.
    pub fn toggle_item(&mut self, id: &str) -> Option<bool> {
        let mut toggled = None;
        for item in self.checklist.iter_mut().filter(|i| i.id == id) {
            item.is_completed = !item.is_completed;
            toggled.get_or_insert(item.is_completed);
        }
        toggled
    }

    /// Recomputed on every call, never stored.
    pub fn overall_risk(&self) -> RiskLevel {
        self.analysis.overall_risk()
    }

    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        display::render_dashboard(self, w)
    }

    pub fn render_report(&self, generated_on: &str) -> String {
        render_report(&self.analysis, &self.checklist, generated_on)
    }

    /// Write the print report into `dir` and, if `open` is set, hand it to
    /// the platform so its print/export dialog comes up.
    pub fn export_report(&self, dir: &Path, open: bool) -> Result<PathBuf, ExportError> {
        let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();
        let path = dir.join(report_file_name(&self.analysis.document_type));
        std::fs::write(&path, self.render_report(&generated_on)).map_err(|source| {
            ExportError::Write {
                path: path.clone(),
                source,
            }
        })?;
        info!(path = %path.display(), "report written");
        if open {
            open_with_host(&path);
        }
        Ok(path)
    }

    /// Drop the dashboard (and its local ticks) and reset the session.
    pub fn reset(self, session: &mut Session) {
        session.reset();
    }
}

/// `"Service Agreement"` → `service-agreement-report.html`.
pub fn report_file_name(document_type: &str) -> String {
    let mut slug = String::new();
    for c in document_type.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "document-report.html".to_string()
    } else {
        format!("{slug}-report.html")
    }
}

fn open_with_host(path: &Path) {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    match spawn_reaped(cmd.arg(path)) {
        Ok(_) => info!(path = %path.display(), "opened report for printing"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "could not open report; open it manually to print"
        ),
    }
}

/// Start `cmd` and wait for it on a background thread so it never lingers
/// as a zombie.
fn spawn_reaped(cmd: &mut Command) -> io::Result<thread::JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{nda, png_scan};
    use crate::state::Status;
    use lexiflow_core::analysis::NOT_DETECTED;

    async fn complete_session() -> (tempfile::NamedTempFile, Session) {
        let (tmp, file) = png_scan();
        let mut session = Session::new();
        let pending = session.select_file(file).await.unwrap();
        session.resolve(pending.id, Ok(nda()));
        (tmp, session)
    }

    #[tokio::test]
    async fn mounts_only_when_complete() {
        assert!(Dashboard::mount(Session::new().state()).is_none());
        let (_tmp, session) = complete_session().await;
        let dash = Dashboard::mount(session.state()).unwrap();
        assert_eq!(dash.tab(), Tab::Overview);
        assert_eq!(dash.checklist().len(), 1);
    }

    #[tokio::test]
    async fn double_toggle_restores_value() {
        let (_tmp, session) = complete_session().await;
        let mut dash = Dashboard::mount(session.state()).unwrap();

        assert_eq!(dash.toggle_item("TASK-01"), Some(true));
        assert!(dash.checklist()[0].is_completed);
        assert_eq!(dash.toggle_item("TASK-01"), Some(false));
        assert!(!dash.checklist()[0].is_completed);
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_noop() {
        let (_tmp, session) = complete_session().await;
        let mut dash = Dashboard::mount(session.state()).unwrap();
        let before = dash.checklist().to_vec();
        assert_eq!(dash.toggle_item("TASK-99"), None);
        assert_eq!(dash.checklist(), before.as_slice());
    }

    #[tokio::test]
    async fn toggling_never_touches_session_analysis() {
        let (_tmp, session) = complete_session().await;
        let mut dash = Dashboard::mount(session.state()).unwrap();
        dash.toggle_item("TASK-01");
        let held = session.state().analysis().unwrap();
        assert!(!held.checklist[0].is_completed);
    }

    #[tokio::test]
    async fn nda_scenario() {
        let (_tmp, session) = complete_session().await;
        let dash = Dashboard::mount(session.state()).unwrap();
        assert_eq!(dash.analysis().execution_date_label(), NOT_DETECTED);
        assert_eq!(dash.overall_risk(), RiskLevel::Low);
        assert_eq!(dash.checklist().iter().filter(|i| !i.is_completed).count(), 1);

        let mut out = Vec::new();
        dash.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Not Detected"));
        assert!(text.contains("LOW"));
    }

    #[tokio::test]
    async fn reset_discards_local_ticks() {
        let (tmp, mut session) = complete_session().await;
        let mut dash = Dashboard::mount(session.state()).unwrap();
        dash.toggle_item("TASK-01");
        dash.reset(&mut session);
        assert_eq!(session.status(), Status::Idle);

        let pending = session
            .select_file(SourceFile::new(tmp.path(), "image/png", 12))
            .await
            .unwrap();
        session.resolve(pending.id, Ok(nda()));
        let remounted = Dashboard::mount(session.state()).unwrap();
        assert!(!remounted.checklist()[0].is_completed);
    }

    #[tokio::test]
    async fn export_writes_report_without_opening() {
        let (_tmp, session) = complete_session().await;
        let mut dash = Dashboard::mount(session.state()).unwrap();
        dash.toggle_item("TASK-01");
        let dir = tempfile::tempdir().unwrap();

        let path = dash.export_report(dir.path(), false).unwrap();
        assert_eq!(path.file_name().unwrap(), "nda-report.html");
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("class=\"done\""));
    }

    #[test]
    fn tab_parsing() {
        assert_eq!("Risks".parse::<Tab>().unwrap(), Tab::Risks);
        assert_eq!("ocr".parse::<Tab>().unwrap(), Tab::ExtractedText);
        assert_eq!(" checklist ".parse::<Tab>().unwrap(), Tab::Checklist);
        assert!("summary".parse::<Tab>().is_err());
    }

    #[test]
    fn report_file_names() {
        assert_eq!(report_file_name("NDA"), "nda-report.html");
        assert_eq!(
            report_file_name("Service Agreement (Draft)"),
            "service-agreement-draft-report.html"
        );
        assert_eq!(report_file_name("???"), "document-report.html");
    }

    #[cfg(unix)]
    #[test]
    fn opener_process_is_waited_on() {
        let handle = spawn_reaped(&mut Command::new("true")).unwrap();
        let status = handle.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn missing_opener_is_an_error() {
        assert!(spawn_reaped(&mut Command::new("lexiflow-no-such-opener")).is_err());
    }
}
