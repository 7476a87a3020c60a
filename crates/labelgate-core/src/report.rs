//! Human-readable report of a classification.

use std::io::{self, Write};

use crate::classify::Classification;

/// Render the report printed to stdout.
pub fn render_report(classification: &Classification) -> String {
    let mut out = String::new();

    out.push_str("\nThese PRs have exactly one label from the pool:\n");
    for number in &classification.valid {
        out.push_str(&format!("PR #{number}\n"));
    }

    if classification.invalid.is_empty() {
        out.push_str("\nAll PRs have exactly one label from the pool\n");
    } else {
        out.push_str("\nThese PRs don't have exactly one label from the pool:\n");
        for pr in &classification.invalid {
            out.push_str(&format!("PR #{}: {}\n", pr.number, pr.html_url));
        }
    }

    out
}

/// Write the rendered report to `writer`.
pub fn write_report<W: Write>(writer: &mut W, classification: &Classification) -> io::Result<()> {
    writer.write_all(render_report(classification).as_bytes())?;
    writer.flush()
}
