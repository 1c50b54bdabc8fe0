//! Human- and machine-readable renderings of [`SummaryStats`]

use crate::core::SummaryStats;
use crate::types::DetectionError;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render a narrative summary of a detection run
///
/// ```text
/// Out of 7 transactions, 5 (71.4%) were flagged as suspicious.
/// Total volume: 39010
///
/// Flagged by rule:
/// - Large Transaction: 1
/// ...
/// ```
pub fn narrative(stats: &SummaryStats) -> String {
    let mut text = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        text,
        "Out of {} transactions, {} ({:.1}%) were flagged as suspicious.",
        stats.total_transactions, stats.suspicious_count, stats.suspicious_percentage
    );
    let _ = writeln!(text, "Total volume: {}", stats.total_volume);

    text.push_str("\nFlagged by rule:\n");
    for (label, count) in stats.rule_counts.labelled() {
        let _ = writeln!(text, "- {}: {}", label, count);
    }

    text.push_str("\nTop countries with suspicious activity:\n");
    if stats.top_countries.is_empty() {
        text.push_str("- none\n");
    }
    for entry in &stats.top_countries {
        let _ = writeln!(text, "- {}: {} cases", entry.country, entry.count);
    }

    text
}

/// Write summary statistics as pretty-printed JSON
pub fn write_summary_json(stats: &SummaryStats, output: &mut dyn Write) -> Result<(), DetectionError> {
    serde_json::to_writer_pretty(&mut *output, stats).map_err(|e| DetectionError::Io {
        message: format!("Failed to serialize summary: {}", e),
    })?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

/// Write summary statistics as JSON to a file, replacing any existing one
pub fn write_summary_json_file(stats: &SummaryStats, path: &Path) -> Result<(), DetectionError> {
    let file = File::create(path).map_err(|e| DetectionError::Io {
        message: format!("Failed to create '{}': {}", path.display(), e),
    })?;

    write_summary_json(stats, &mut BufWriter::new(file))
}
