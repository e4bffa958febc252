//! `haul aliases` — the canonical fields and what header text maps onto them.

use serde::Serialize;

use haul_schema::{CanonicalField, SchemaConfig};

use crate::util::render_table;
use crate::{print_json, CliError};

#[derive(Serialize)]
struct FieldInfo<'a> {
    field: &'static str,
    label: &'static str,
    kind: &'static str,
    required: bool,
    /// Value used when the column is absent; dates have none.
    default: Option<&'static str>,
    aliases: &'a [String],
}

pub fn cmd_aliases(config: &SchemaConfig, json: bool) -> Result<(), CliError> {
    let reconciler = config.reconciler().map_err(CliError::schema)?;

    let fields: Vec<FieldInfo> = CanonicalField::ALL
        .into_iter()
        .map(|field| FieldInfo {
            field: field.name(),
            label: field.label(),
            kind: field.kind().name(),
            required: reconciler.is_required(field),
            default: field.kind().default_text(),
            aliases: reconciler.aliases().aliases(field),
        })
        .collect();

    if json {
        return print_json(&fields);
    }

    let rows: Vec<Vec<String>> = fields
        .iter()
        .map(|f| {
            vec![
                f.field.to_string(),
                f.label.to_string(),
                f.kind.to_string(),
                if f.required { "yes" } else { "" }.to_string(),
                f.default.unwrap_or("-").to_string(),
                f.aliases.join(", "),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["field", "label", "kind", "required", "default", "aliases"], &rows)
    );
    Ok(())
}
