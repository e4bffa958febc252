//! `haul reconcile` — canonical table export.

use std::path::Path;

use haul_schema::{CanonicalRecord, DatePolicy, ReconcileSummary, SchemaConfig};

use crate::{load_input, print_json, CliError};

pub fn cmd_reconcile(
    config: &SchemaConfig,
    file: &Path,
    output: Option<&Path>,
    keep_bad_dates: bool,
    sheet: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut reconciler = config.reconciler().map_err(CliError::schema)?;
    if keep_bad_dates {
        reconciler = reconciler.with_date_policy(DatePolicy::Keep);
    }

    let raw = load_input(file, sheet, config)?;
    let table = reconciler.reconcile(&raw).map_err(CliError::schema)?;
    let records: Vec<&CanonicalRecord> = table.records.iter().collect();

    if let Some(path) = output {
        haul_io::write_table(&table, &records, path).map_err(CliError::export)?;
        eprintln!("wrote {} row(s) to {}", records.len(), path.display());
    }

    if json {
        print_json(&table)?;
    } else if output.is_none() {
        let stdout = std::io::stdout();
        haul_io::csv::write_csv(&table, &records, stdout.lock()).map_err(CliError::export)?;
    }

    eprintln!("{}", summary_line(&table.summary));
    Ok(())
}

/// One-line account of what reconciliation absorbed.
pub(crate) fn summary_line(summary: &ReconcileSummary) -> String {
    let mut line = format!("reconciled {} of {} row(s)", summary.rows_out, summary.rows_in);

    let mut notes = Vec::new();
    if summary.dropped_bad_dates > 0 {
        notes.push(format!("{} dropped for unparseable dates", summary.dropped_bad_dates));
    }
    if summary.kept_bad_dates > 0 {
        notes.push(format!("{} kept without a date", summary.kept_bad_dates));
    }
    if summary.numeric_zeroed > 0 {
        notes.push(format!("{} non-numeric value(s) set to 0", summary.numeric_zeroed));
    }
    if !notes.is_empty() {
        line.push_str(&format!(" ({})", notes.join(", ")));
    }

    if !summary.defaulted.is_empty() {
        let names: Vec<&str> = summary.defaulted.iter().map(|f| f.name()).collect();
        line.push_str(&format!("; defaulted: {}", names.join(", ")));
    }
    line
}
