//! Passive progress display while an analysis is in flight.

use std::io::{self, Write};
use std::time::Duration;

pub const STEPS: &[&str] = &[
    "Performing High-Res OCR extraction",
    "Identifying key legal risks & obligations",
    "Structuring action checklist",
];

/// Write the progress panel for `file_name`.
pub fn render(w: &mut impl Write, file_name: &str) -> io::Result<()> {
    writeln!(w, "LexiFlow is thinking...")?;
    writeln!(
        w,
        "Reading {file_name}, analyzing clauses, and formulating a checklist."
    )?;
    writeln!(w)?;
    for step in STEPS {
        writeln!(w, "  - {step}")?;
    }
    writeln!(w)
}

/// One-line elapsed-time ticker, meant to be redrawn in place with `\r`.
pub fn ticker(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("\r  analyzing... {:02}:{:02}", secs / 60, secs % 60)
}
