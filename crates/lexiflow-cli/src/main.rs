mod shell;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use lexiflow_ai::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL, MAX_THINKING_BUDGET};
use lexiflow_ai::{AnalysisConfig, Analyzer, GeminiClient};
use lexiflow_app::upload::{self, UploadError, UploadSource};
use lexiflow_app::{AppState, Dashboard, Session, Status, Tab, progress};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Upload a legal document image or PDF and get a summary, risk list,
/// action checklist, and OCR text back.
///
/// The API key is read from API_KEY or GEMINI_API_KEY when an analysis runs.
#[derive(Parser, Debug)]
#[command(name = "lexiflow", version)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ServiceArgs {
    /// Model used for analysis
    #[arg(long, global = true, env = "LEXIFLOW_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the generative-AI API
    #[arg(long, global = true, env = "LEXIFLOW_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Give up on an analysis after this many seconds
    #[arg(long, global = true, env = "LEXIFLOW_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Reasoning budget in tokens
    #[arg(
        long,
        global = true,
        env = "LEXIFLOW_THINKING_BUDGET",
        default_value_t = MAX_THINKING_BUDGET
    )]
    thinking_budget: u32,
}

impl ServiceArgs {
    fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            thinking_budget: self.thinking_budget,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Directory the print report is written to
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,

    /// Write the report without opening the platform print dialog
    #[arg(long)]
    no_open: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one document and show the dashboard
    Analyze {
        /// Image (JPG, PNG, ...) or PDF to analyze
        file: String,

        /// Dashboard tab to show: overview, risks, checklist, text
        #[arg(long, default_value = "overview")]
        tab: Tab,

        /// Also export the print report
        #[arg(long)]
        report: bool,

        /// Continue in the interactive shell afterwards
        #[arg(long, short)]
        interactive: bool,

        #[command(flatten)]
        report_args: ReportArgs,
    },
    /// Interactive session: open or drop files, switch tabs, tick items
    Shell {
        #[command(flatten)]
        report_args: ReportArgs,
    },
    /// Print the response-shape contract sent with every request
    Schema,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,lexiflow=info,lexiflow_ai=info,lexiflow_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("lexiflow v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&lexiflow_core::response_schema())?;
            println!("{schema}");
            Ok(())
        }
        Command::Shell { report_args } => {
            let analyzer = Arc::new(GeminiClient::new(cli.service.to_config())?);
            shell::Shell::new(
                Session::new(),
                analyzer,
                report_args.report_dir,
                !report_args.no_open,
            )
            .run()
            .await
        }
        Command::Analyze {
            file,
            tab,
            report,
            interactive,
            report_args,
        } => {
            let analyzer = Arc::new(GeminiClient::new(cli.service.to_config())?);
            let mut session = Session::new();
            analyze_once(&mut session, analyzer.as_ref(), &file).await?;

            if let AppState::Error { message, .. } = session.state() {
                if !interactive {
                    bail!("{message}");
                }
                eprintln!("Error: {message}");
            }
            if let Some(mut dash) = Dashboard::mount(session.state()) {
                dash.select_tab(tab);
                dash.render(&mut std::io::stdout().lock())?;
                if report {
                    let path = dash
                        .export_report(&report_args.report_dir, !report_args.no_open)
                        .context("exporting report")?;
                    println!("\nReport: {}", path.display());
                }
                if !interactive {
                    return Ok(());
                }
            }
            shell::Shell::new(session, analyzer, report_args.report_dir, !report_args.no_open)
                .run()
                .await
        }
    }
}

/// Upload, show progress while the request runs, and commit the outcome.
async fn analyze_once(
    session: &mut Session,
    analyzer: &dyn Analyzer,
    raw: &str,
) -> anyhow::Result<()> {
    let pending = match upload::submit(session, UploadSource::Picker, raw).await {
        Ok(pending) => pending,
        // The session already holds the error; the caller reports it.
        Err(UploadError::Session(_)) if session.status() == Status::Error => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    progress::render(&mut std::io::stderr().lock(), &pending.file.name)?;

    let started = Instant::now();
    let analysis = analyzer.analyze(&pending.file);
    tokio::pin!(analysis);
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    let outcome = loop {
        tokio::select! {
            outcome = &mut analysis => break outcome,
            _ = tick.tick() => eprint!("{}", progress::ticker(started.elapsed())),
        }
    };
    eprintln!();
    session.resolve(pending.id, outcome);
    Ok(())
}
