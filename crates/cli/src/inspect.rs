//! `haul inspect` — header mapping diagnostics for one sheet.

use std::path::Path;

use serde::Serialize;

use haul_schema::{CanonicalField, MatchKind, SchemaConfig};

use crate::exit_codes::EXIT_SCHEMA;
use crate::util::render_table;
use crate::{load_input, print_json, CliError};

#[derive(Serialize)]
struct Inspection {
    file: String,
    rows: usize,
    headers: Vec<HeaderRow>,
    mapping: Vec<MappingRow>,
    /// Required fields with no matching header.
    missing: Vec<MissingRow>,
    passthrough: Vec<String>,
}

#[derive(Serialize)]
struct HeaderRow {
    index: usize,
    original: String,
    normalized: String,
}

#[derive(Serialize)]
struct MappingRow {
    field: CanonicalField,
    header: Option<String>,
    alias: Option<String>,
    #[serde(rename = "match")]
    kind: Option<MatchKind>,
    required: bool,
}

#[derive(Serialize)]
struct MissingRow {
    field: CanonicalField,
    label: &'static str,
}

pub fn cmd_inspect(
    config: &SchemaConfig,
    file: &Path,
    sheet: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let reconciler = config.reconciler().map_err(CliError::schema)?;
    let raw = load_input(file, sheet, config)?;
    let mapping = reconciler.map_headers(raw.headers());

    let headers = haul_schema::normalize_headers(raw.headers())
        .iter()
        .map(|h| HeaderRow {
            index: h.index,
            original: h.original.clone(),
            normalized: h.key.clone(),
        })
        .collect();

    let rows = CanonicalField::ALL
        .into_iter()
        .map(|field| {
            let col = mapping.get(field);
            MappingRow {
                field,
                header: col.map(|c| c.header.clone()),
                alias: col.map(|c| c.alias.clone()),
                kind: col.map(|c| c.kind),
                required: reconciler.is_required(field),
            }
        })
        .collect();

    let inspection = Inspection {
        file: file.display().to_string(),
        rows: raw.row_count(),
        headers,
        mapping: rows,
        missing: reconciler
            .missing_required(&mapping)
            .into_iter()
            .map(|field| MissingRow { field, label: field.label() })
            .collect(),
        passthrough: mapping.unmatched().iter().map(|h| h.original.clone()).collect(),
    };

    if json {
        print_json(&inspection)?;
    } else {
        print_text(&inspection);
    }

    // The report above already names the missing fields.
    if inspection.missing.is_empty() {
        Ok(())
    } else {
        Err(CliError { code: EXIT_SCHEMA, message: String::new(), hint: None })
    }
}

fn print_text(inspection: &Inspection) {
    println!("{}: {} data row(s)\n", inspection.file, inspection.rows);

    let rows: Vec<Vec<String>> = inspection
        .mapping
        .iter()
        .map(|m| {
            vec![
                m.field.name().to_string(),
                m.header.clone().unwrap_or_else(|| "-".to_string()),
                m.alias.clone().unwrap_or_default(),
                match m.kind {
                    Some(MatchKind::Exact) => "exact",
                    Some(MatchKind::Substring) => "substring",
                    None if m.required => "MISSING",
                    None => "default",
                }
                .to_string(),
            ]
        })
        .collect();
    print!("{}", render_table(&["field", "header", "alias", "match"], &rows));

    if !inspection.passthrough.is_empty() {
        println!("\npassthrough: {}", inspection.passthrough.join(", "));
    }

    if !inspection.missing.is_empty() {
        let labels: Vec<&str> = inspection.missing.iter().map(|m| m.label).collect();
        println!("\nrequired columns not found: {}", labels.join(", "));
    }
}
