//! Print-oriented report: every tab's content on paginated A4, rendered as a
//! standalone HTML page that opens the platform print dialog when loaded.

use std::fmt::Write as _;

use lexiflow_core::{ChecklistItem, DocumentAnalysis, RiskLevel};

pub const PRODUCT: &str = "LexiFlow";
pub const TAGLINE: &str = "Automated Legal Intelligence";

/// Characters of extracted text included in the report sample.
pub const SAMPLE_CHARS: usize = 1200;

pub const DISCLAIMER: &str = "This document is generated by an artificial intelligence system \
(LexiFlow) and is intended for informational purposes only. It does not constitute legal advice, \
attorney-client privilege, or professional legal opinion. Please consult a qualified attorney for \
verification of all findings, risks, and recommendations.";

const STYLE: &str = r#"
@page { size: A4; margin: 18mm; }
body { font-family: Georgia, "Times New Roman", serif; color: #0f172a; max-width: 210mm; margin: 0 auto; }
header { display: flex; justify-content: space-between; align-items: flex-end; border-bottom: 4px solid #0f172a; padding-bottom: 16px; margin-bottom: 24px; }
header h1 { font-size: 32px; margin: 0; }
.tagline { text-transform: uppercase; letter-spacing: 0.2em; font-size: 11px; color: #64748b; font-weight: bold; }
.doc-type { background: #f1f5f9; padding: 4px 12px; border-radius: 4px; font-weight: bold; }
.generated { color: #64748b; font-size: 13px; text-align: right; }
section { margin-bottom: 24px; }
h3 { text-transform: uppercase; letter-spacing: 0.08em; font-size: 15px; border-bottom: 1px solid #e2e8f0; padding-bottom: 6px; }
.summary { background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 10px; padding: 16px; }
.meta { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin-top: 16px; padding-top: 16px; border-top: 1px solid #e2e8f0; }
.label { font-size: 11px; text-transform: uppercase; color: #94a3b8; font-weight: bold; }
.risk, .task { border: 1px solid #e2e8f0; border-radius: 8px; padding: 12px; margin-bottom: 10px; break-inside: avoid; }
.risk-head { display: flex; justify-content: space-between; font-weight: bold; font-size: 14px; }
.badge { font-size: 10px; font-weight: bold; padding: 2px 10px; border-radius: 4px; border: 1px solid; text-transform: uppercase; }
.badge.critical { background: #fee2e2; color: #991b1b; border-color: #fecaca; }
.badge.high { background: #ffedd5; color: #9a3412; border-color: #fed7aa; }
.badge.other { background: #dbeafe; color: #1e40af; border-color: #bfdbfe; }
.clause { background: #f8fafc; font-style: italic; font-size: 12px; padding: 8px; border-radius: 4px; margin: 8px 0; }
.task { display: flex; gap: 12px; }
.box { width: 14px; height: 14px; border: 2px solid #cbd5e1; border-radius: 3px; flex-shrink: 0; text-align: center; line-height: 14px; font-size: 11px; }
.role { font-size: 10px; background: #f1f5f9; color: #64748b; padding: 1px 6px; border-radius: 3px; text-transform: uppercase; font-weight: bold; }
.done { text-decoration: line-through; color: #64748b; }
.sample { font-size: 10px; color: #94a3b8; text-align: justify; white-space: pre-wrap; }
.page-break { page-break-after: always; break-after: page; }
footer { border-top: 1px solid #e2e8f0; padding-top: 16px; font-size: 10px; color: #64748b; }
.disclaimer { background: #f8fafc; padding: 12px; border-radius: 4px; text-align: justify; }
.footer-line { display: flex; justify-content: space-between; text-transform: uppercase; letter-spacing: 0.15em; margin-top: 12px; }
"#;

const PRINT_ON_LOAD: &str =
    r#"<script>window.addEventListener("load", function () { window.print(); });</script>"#;

/// Render the full report. `checklist` is the dashboard's local copy, so
/// completion ticks made on screen carry over.
pub fn render_report(
    analysis: &DocumentAnalysis,
    checklist: &[ChecklistItem],
    generated_on: &str,
) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let title = escape(&analysis.document_type);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{PRODUCT} report: {title}</title>");
    let _ = writeln!(html, "<style>{STYLE}</style>\n{PRINT_ON_LOAD}\n</head>\n<body>");

    // Title block.
    let _ = writeln!(
        html,
        "<header><div><h1>{PRODUCT}</h1><div class=\"tagline\">{TAGLINE}</div></div>\
         <div><div class=\"doc-type\">{title}</div><div class=\"generated\">{}</div></div></header>",
        escape(generated_on)
    );

    // Executive summary.
    html.push_str("<section class=\"summary\">\n<h3>Executive Summary</h3>\n");
    let _ = writeln!(html, "<p>{}</p>", escape(&analysis.summary));
    html.push_str("<div class=\"meta\"><div><div class=\"label\">Parties Involved</div><ul>");
    for party in &analysis.parties_involved {
        let _ = write!(html, "<li>{}</li>", escape(party));
    }
    let _ = writeln!(
        html,
        "</ul></div><div><div class=\"label\">Execution Details</div><p>Date: {}</p>\
         <p>Risk Factor: {}</p></div></div>\n</section>",
        escape(analysis.execution_date_label()),
        badge(&analysis.overall_risk())
    );

    // Risk analysis.
    html.push_str("<section>\n<h3>Risk Analysis</h3>\n");
    if analysis.risks.is_empty() {
        html.push_str("<p>No risks identified.</p>\n");
    }
    for risk in &analysis.risks {
        let _ = writeln!(
            html,
            "<div class=\"risk\"><div class=\"risk-head\"><span>{}</span>{}</div>\
             <div class=\"clause\">&ldquo;{}&rdquo;</div>\
             <p><span class=\"label\">Recommendation:</span> {}</p></div>",
            escape(&risk.issue),
            badge(&risk.severity),
            escape(&risk.clause),
            escape(&risk.recommendation)
        );
    }
    html.push_str("</section>\n<div class=\"page-break\"></div>\n");

    // Action checklist.
    html.push_str("<section>\n<h3>Action Checklist</h3>\n");
    for item in checklist {
        let (mark, class) = if item.is_completed {
            ("&#10003;", " class=\"done\"")
        } else {
            ("", "")
        };
        let _ = writeln!(
            html,
            "<div class=\"task\"><div class=\"box\">{mark}</div><div>\
             <strong{class}>{}</strong> <span class=\"role\">{}</span> {}\
             <p{class}>{}</p></div></div>",
            escape(&item.action),
            escape(&item.role),
            badge(&item.priority),
            escape(&item.description)
        );
    }
    html.push_str("</section>\n");

    // Extracted text sample.
    let _ = writeln!(
        html,
        "<section>\n<div class=\"label\">Extracted Text Sample</div>\n<div class=\"sample\">{}</div>\n</section>",
        escape(&sample(&analysis.extracted_text, SAMPLE_CHARS))
    );

    // Footer.
    let _ = writeln!(
        html,
        "<footer><div class=\"disclaimer\"><strong>Disclaimer:</strong> {DISCLAIMER}</div>\
         <div class=\"footer-line\"><span>{PRODUCT} AI System</span><span>Confidential &amp; Privileged</span></div></footer>"
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn badge(level: &RiskLevel) -> String {
    let class = match level {
        RiskLevel::Critical => "critical",
        RiskLevel::High => "high",
        _ => "other",
    };
    format!(
        "<span class=\"badge {class}\">{}</span>",
        escape(level.as_str())
    )
}

/// First `max` characters, with an ellipsis when cut.
pub fn sample(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
