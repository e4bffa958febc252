use thiserror::Error;

use crate::field::CanonicalField;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more required fields matched no header. Fatal for the table.
    #[error("required columns not found: {}", labels(.fields))]
    MissingFields { fields: Vec<CanonicalField> },

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (empty alias, empty format list, ...).
    #[error("config validation error: {0}")]
    Config(String),
}

impl SchemaError {
    /// Human-readable labels of the missing fields, in declaration order.
    pub fn missing_labels(&self) -> Vec<&'static str> {
        match self {
            Self::MissingFields { fields } => fields.iter().map(|f| f.label()).collect(),
            _ => Vec::new(),
        }
    }
}

fn labels(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
