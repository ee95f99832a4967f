//! Interactive shell: a single-threaded event loop over stdin lines and
//! analysis outcomes.
//!
//! Analyses run on spawned tasks and report back over a channel. A reset
//! while one is running abandons it; its outcome still arrives but is
//! dropped by [`Session::resolve`].

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lexiflow_ai::{AnalysisError, Analyzer};
use lexiflow_app::report::TAGLINE;
use lexiflow_app::upload::{self, UploadSource, parse_dropped_path};
use lexiflow_app::{Dashboard, RequestId, Resolution, Session, Status, Tab, progress};
use lexiflow_core::DocumentAnalysis;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

type Outcome = (RequestId, Result<DocumentAnalysis, AnalysisError>);

const HELP: &str = "\
Commands:
  open <path>     analyze an image or PDF (or just drop/paste the file path)
  tab <name>      switch tab: overview, risks, checklist, text
  toggle <id>     tick or untick a checklist item
  show            redraw the dashboard
  export          write the print report and open the print dialog
  reset           start over
  status          show the session state
  help            this text
  quit            leave";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Open(String),
    Drop(String),
    Tab(String),
    Toggle(String),
    Show,
    Export,
    Reset,
    Status,
    Help,
    Quit,
    Blank,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Blank;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        match (word.to_ascii_lowercase().as_str(), rest.is_empty()) {
            ("open", false) => Self::Open(rest.to_string()),
            ("tab", false) => Self::Tab(rest.to_string()),
            ("toggle", false) => Self::Toggle(rest.to_string()),
            ("show", true) => Self::Show,
            ("export" | "print", true) => Self::Export,
            ("reset", true) => Self::Reset,
            ("status", true) => Self::Status,
            ("help" | "?", true) => Self::Help,
            ("quit" | "exit", true) => Self::Quit,
            _ if looks_like_path(line) => Self::Drop(line.to_string()),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// Terminals paste dropped files as absolute or quoted paths.
fn looks_like_path(line: &str) -> bool {
    let first = line.chars().next().unwrap_or(' ');
    matches!(first, '/' | '~' | '.' | '\'' | '"')
        || line.starts_with("file://")
        || parse_dropped_path(line).is_some_and(|p| p.exists())
}

pub struct Shell {
    session: Session,
    dashboard: Option<Dashboard>,
    analyzer: Arc<dyn Analyzer>,
    report_dir: PathBuf,
    open_reports: bool,
    started: Option<Instant>,
}

impl Shell {
    pub fn new(
        session: Session,
        analyzer: Arc<dyn Analyzer>,
        report_dir: PathBuf,
        open_reports: bool,
    ) -> Self {
        let dashboard = Dashboard::mount(session.state());
        Self {
            session,
            dashboard,
            analyzer,
            report_dir,
            open_reports,
            started: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut tick = tokio::time::interval(Duration::from_secs(1));

        self.greet();
        loop {
            let analyzing = self.session.status() == Status::Analyzing;
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.handle(Input::parse(&line), &tx).await? {
                        break;
                    }
                }
                Some((id, outcome)) = rx.recv() => self.on_outcome(id, outcome)?,
                _ = tick.tick(), if analyzing => {
                    if let Some(started) = self.started {
                        eprint!("{}", progress::ticker(started.elapsed()));
                    }
                }
            }
        }
        Ok(())
    }

    fn greet(&self) {
        println!("LexiFlow: {TAGLINE}");
        match self.session.status() {
            Status::Idle => {
                println!("Open a contract, NDA, or agreement (PDF, JPG, PNG). Type `help` for commands.")
            }
            status => println!("Session is {status}. Type `help` for commands."),
        }
    }

    /// Returns `false` when the shell should exit.
    async fn handle(
        &mut self,
        input: Input,
        tx: &mpsc::UnboundedSender<Outcome>,
    ) -> anyhow::Result<bool> {
        match input {
            Input::Open(raw) => self.upload(UploadSource::Picker, &raw, tx).await?,
            Input::Drop(raw) => self.upload(UploadSource::DragDrop, &raw, tx).await?,
            Input::Tab(name) => match (name.parse::<Tab>(), self.dashboard.as_mut()) {
                (Ok(tab), Some(dash)) => {
                    dash.select_tab(tab);
                    dash.render(&mut std::io::stdout().lock())?;
                }
                (Err(e), _) => println!("{e}"),
                (_, None) => println!("No analysis to show."),
            },
            Input::Toggle(id) => match self.dashboard.as_mut() {
                Some(dash) => match dash.toggle_item(&id) {
                    Some(done) => {
                        println!("{id}: {}", if done { "done" } else { "open" });
                        if dash.tab() == Tab::Checklist {
                            dash.render(&mut std::io::stdout().lock())?;
                        }
                    }
                    None => println!("No checklist item {id}."),
                },
                None => println!("No analysis to show."),
            },
            Input::Show => match &self.dashboard {
                Some(dash) => dash.render(&mut std::io::stdout().lock())?,
                None => self.print_status(),
            },
            Input::Export => match &self.dashboard {
                Some(dash) => match dash.export_report(&self.report_dir, self.open_reports) {
                    Ok(path) => println!("Report: {}", path.display()),
                    Err(e) => println!("{e}"),
                },
                None => println!("No analysis to export."),
            },
            Input::Reset => self.reset(),
            Input::Status => self.print_status(),
            Input::Help => println!("{HELP}"),
            Input::Quit => return Ok(false),
            Input::Blank => {}
            Input::Unknown(line) => println!("Unknown command {line:?}. Type `help`."),
        }
        std::io::stdout().flush()?;
        Ok(true)
    }

    async fn upload(
        &mut self,
        source: UploadSource,
        raw: &str,
        tx: &mpsc::UnboundedSender<Outcome>,
    ) -> anyhow::Result<()> {
        let pending = match upload::submit(&mut self.session, source, raw).await {
            Ok(pending) => pending,
            Err(e) => {
                // Blocking notice; nothing else happens.
                println!("! {e}");
                if let Some(message) = self.session.state().error_message() {
                    println!("Error: {message} (type `reset` to try again)");
                }
                return Ok(());
            }
        };

        progress::render(&mut std::io::stderr().lock(), &pending.file.name)?;
        self.started = Some(Instant::now());

        let analyzer = Arc::clone(&self.analyzer);
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = analyzer.analyze(&pending.file).await;
            // The shell may be gone; nothing to do then.
            let _ = tx.send((pending.id, outcome));
        });
        Ok(())
    }

    fn on_outcome(
        &mut self,
        id: RequestId,
        outcome: Result<DocumentAnalysis, AnalysisError>,
    ) -> anyhow::Result<()> {
        match self.session.resolve(id, outcome) {
            Resolution::Stale => debug!(request = %id, "ignored abandoned analysis"),
            Resolution::Applied(_) => {
                eprintln!();
                self.started = None;
                self.dashboard = Dashboard::mount(self.session.state());
                match &self.dashboard {
                    Some(dash) => dash.render(&mut std::io::stdout().lock())?,
                    None => self.print_status(),
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        match self.dashboard.take() {
            Some(dash) => dash.reset(&mut self.session),
            None => self.session.reset(),
        }
        self.started = None;
        println!("Ready for a new document.");
    }

    fn print_status(&self) {
        let state = self.session.state();
        print!("Status: {}", state.status());
        if let Some(file) = state.file() {
            print!(" ({}, {})", file.name, file.mime);
        }
        println!();
        if let Some(message) = state.error_message() {
            println!("Error: {message} (type `reset` to try again)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("open ./nda.pdf"), Input::Open("./nda.pdf".into()));
        assert_eq!(Input::parse("  TAB risks "), Input::Tab("risks".into()));
        assert_eq!(Input::parse("toggle TASK-01"), Input::Toggle("TASK-01".into()));
        assert_eq!(Input::parse("print"), Input::Export);
        assert_eq!(Input::parse("exit"), Input::Quit);
        assert_eq!(Input::parse(""), Input::Blank);
    }

    #[test]
    fn dropped_paths_are_uploads() {
        assert_eq!(
            Input::parse("'/home/me/My Scans/nda.png' "),
            Input::Drop("'/home/me/My Scans/nda.png'".into())
        );
        assert_eq!(
            Input::parse("/tmp/lease.pdf"),
            Input::Drop("/tmp/lease.pdf".into())
        );
    }

    #[test]
    fn unknown_words_are_not_paths() {
        assert_eq!(
            Input::parse("summarize please"),
            Input::Unknown("summarize please".into())
        );
        // A command word missing its argument is not silently accepted.
        assert_eq!(Input::parse("tab"), Input::Unknown("tab".into()));
    }
}
