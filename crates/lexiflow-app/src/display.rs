//! Terminal card display for a completed analysis.
//!
//! Renders the dashboard's header, source document line, tab bar, and the
//! active tab. Labels are padded to a fixed column like a vertical card.

use std::io::{self, Write};

use lexiflow_core::{ChecklistItem, DocumentAnalysis};

use crate::dashboard::{Dashboard, Tab};

const LABEL_WIDTH: usize = 18;
const WRAP_WIDTH: usize = 78;
const MAX_PARTIES: usize = 10;

// ── Public API ──

pub fn render_dashboard(dash: &Dashboard, w: &mut impl Write) -> io::Result<()> {
    let analysis = dash.analysis();

    writeln!(w, "=== {} Analysis ===", analysis.document_type)?;
    let preview = dash.preview();
    writeln!(
        w,
        "{:<LABEL_WIDTH$} {} ({}, {} byte preview)",
        "Source Document",
        dash.file().name,
        preview.kind_label(),
        preview.data_uri.len()
    )?;
    writeln!(w)?;
    render_tab_bar(dash.tab(), w)?;
    writeln!(w)?;

    match dash.tab() {
        Tab::Overview => render_overview(analysis, dash, w),
        Tab::Risks => render_risks(analysis, w),
        Tab::Checklist => render_checklist(dash.checklist(), w),
        Tab::ExtractedText => render_text(&analysis.extracted_text, w),
    }
}

// ── Tabs ──

fn render_tab_bar(active: Tab, w: &mut impl Write) -> io::Result<()> {
    let labels: Vec<String> = Tab::ALL
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{}]", t.label())
            } else {
                format!(" {} ", t.label())
            }
        })
        .collect();
    writeln!(w, "{}", labels.join("  "))
}

fn render_overview(
    analysis: &DocumentAnalysis,
    dash: &Dashboard,
    w: &mut impl Write,
) -> io::Result<()> {
    writeln!(w, "Executive Summary")?;
    write_wrapped(&analysis.summary, "  ", w)?;
    writeln!(w)?;

    writeln!(w, "Parties Involved")?;
    if analysis.parties_involved.is_empty() {
        writeln!(w, "  (none identified)")?;
    }
    for party in analysis.parties_involved.iter().take(MAX_PARTIES) {
        writeln!(w, "  - {party}")?;
    }
    if analysis.parties_involved.len() > MAX_PARTIES {
        writeln!(
            w,
            "  ... and {} more",
            analysis.parties_involved.len() - MAX_PARTIES
        )?;
    }
    writeln!(w)?;

    writeln!(w, "Execution Details")?;
    writeln!(
        w,
        "  {:<LABEL_WIDTH$} {}",
        "Date",
        analysis.execution_date_label()
    )?;
    writeln!(w, "  {:<LABEL_WIDTH$} {}", "Risk Factor", dash.overall_risk())
}

fn render_risks(analysis: &DocumentAnalysis, w: &mut impl Write) -> io::Result<()> {
    if analysis.risks.is_empty() {
        return writeln!(w, "  No risks identified.");
    }
    for risk in &analysis.risks {
        writeln!(w, "  [{}] {}", risk.severity, risk.issue)?;
        write_wrapped(&format!("\"{}\"", risk.clause), "      ", w)?;
        write_wrapped(
            &format!("Recommendation: {}", risk.recommendation),
            "      ",
            w,
        )?;
        writeln!(w)?;
    }
    Ok(())
}

fn render_checklist(items: &[ChecklistItem], w: &mut impl Write) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(w, "  No actions generated.");
    }
    for item in items {
        let mark = if item.is_completed { "x" } else { " " };
        writeln!(
            w,
            "  [{mark}] {:<10} {}  ({}, {})",
            item.id,
            item.action,
            item.role.to_uppercase(),
            item.priority
        )?;
        write_wrapped(&item.description, "                 ", w)?;
    }
    Ok(())
}

fn render_text(text: &str, w: &mut impl Write) -> io::Result<()> {
    for line in text.lines() {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

// ── Helpers ──

/// Greedy word wrap at [`WRAP_WIDTH`], each line prefixed with `indent`.
fn write_wrapped(text: &str, indent: &str, w: &mut impl Write) -> io::Result<()> {
    let width = WRAP_WIDTH.saturating_sub(indent.len()).max(20);
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            writeln!(w, "{indent}{line}")?;
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        writeln!(w, "{indent}{line}")?;
    }
    Ok(())
}
