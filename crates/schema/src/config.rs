use std::collections::BTreeMap;

use serde::Deserialize;

use crate::alias::AliasTable;
use crate::coerce::DateParser;
use crate::error::SchemaError;
use crate::field::CanonicalField;
use crate::reconcile::{DatePolicy, Reconciler};

/// Default upper bound for an uploaded sheet.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Per-deployment tuning of the reconciler, read from TOML.
///
/// Every key is optional; an empty file yields the built-in behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default = "default_required")]
    pub required: Vec<CanonicalField>,
    /// Extra aliases appended after the built-in ones, keyed by field name.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub unparseable_dates: DatePolicy,
    /// Replaces the built-in date format list when set.
    #[serde(default)]
    pub date_formats: Option<Vec<String>>,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_required() -> Vec<CanonicalField> {
    CanonicalField::DEFAULT_REQUIRED.to_vec()
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            required: default_required(),
            aliases: BTreeMap::new(),
            unparseable_dates: DatePolicy::default(),
            date_formats: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SchemaConfig {
    pub fn from_toml(input: &str) -> Result<Self, SchemaError> {
        let config: SchemaConfig =
            toml::from_str(input).map_err(|e| SchemaError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        for (field, aliases) in &self.aliases {
            if CanonicalField::from_name(field).is_none() {
                return Err(SchemaError::Config(format!(
                    "unknown field '{field}' in [aliases]"
                )));
            }
            if aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(SchemaError::Config(format!(
                    "empty alias for field '{field}'"
                )));
            }
        }

        if let Some(formats) = &self.date_formats {
            if formats.is_empty() {
                return Err(SchemaError::Config(
                    "date_formats must list at least one format".into(),
                ));
            }
        }

        if self.max_file_bytes == 0 {
            return Err(SchemaError::Config("max_file_bytes must be positive".into()));
        }

        Ok(())
    }

    pub fn alias_table(&self) -> Result<AliasTable, SchemaError> {
        let mut table = AliasTable::default();
        for (name, extra) in &self.aliases {
            let field = CanonicalField::from_name(name)
                .ok_or_else(|| SchemaError::Config(format!("unknown field '{name}' in [aliases]")))?;
            table.extend(field, extra)?;
        }
        Ok(table)
    }

    pub fn reconciler(&self) -> Result<Reconciler, SchemaError> {
        let dates = match &self.date_formats {
            Some(formats) => DateParser::new(formats.clone()),
            None => DateParser::default(),
        };
        Ok(Reconciler::new(self.alias_table()?)
            .with_required(&self.required)
            .with_date_policy(self.unparseable_dates)
            .with_date_parser(dates))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
required = ["delivery_date", "volume"]
unparseable_dates = "keep"
date_formats = ["%m/%d/%Y"]
max_file_bytes = 1048576

[aliases]
volume = ["Jumlah M3"]
end_customer = ["proyek"]
"#;

    #[test]
    fn empty_config_is_builtin_behaviour() {
        let config = SchemaConfig::from_toml("").unwrap();
        assert_eq!(config.required, CanonicalField::DEFAULT_REQUIRED.to_vec());
        assert_eq!(config.unparseable_dates, DatePolicy::Drop);
        assert!(config.date_formats.is_none());
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(&config.alias_table().unwrap(), AliasTable::builtin());
    }

    #[test]
    fn parse_full_config() {
        let config = SchemaConfig::from_toml(FULL).unwrap();
        assert_eq!(
            config.required,
            vec![CanonicalField::DeliveryDate, CanonicalField::Volume]
        );
        assert_eq!(config.unparseable_dates, DatePolicy::Keep);
        assert_eq!(config.max_file_bytes, 1_048_576);

        let reconciler = config.reconciler().unwrap();
        assert!(!reconciler.is_required(CanonicalField::Salesman));
        assert_eq!(reconciler.date_policy(), DatePolicy::Keep);
        assert!(reconciler
            .aliases()
            .aliases(CanonicalField::Volume)
            .contains(&"jumlah m3".to_string()));
    }

    #[test]
    fn reject_unknown_field_name() {
        let err = SchemaConfig::from_toml("required = [\"tonnage\"]").unwrap_err();
        assert!(matches!(err, SchemaError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_key() {
        let err = SchemaConfig::from_toml("strict = true").unwrap_err();
        assert!(matches!(err, SchemaError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_alias_field() {
        let err = SchemaConfig::from_toml("[aliases]\ntonnage = [\"ton\"]").unwrap_err();
        assert!(err.to_string().contains("unknown field 'tonnage'"));
    }

    #[test]
    fn reject_empty_alias() {
        let err = SchemaConfig::from_toml("[aliases]\narea = [\" \"]").unwrap_err();
        assert!(err.to_string().contains("empty alias for field 'area'"));
    }

    #[test]
    fn reject_empty_date_formats() {
        let err = SchemaConfig::from_toml("date_formats = []").unwrap_err();
        assert!(err.to_string().contains("date_formats"));
    }

    #[test]
    fn reject_invalid_policy() {
        assert!(SchemaConfig::from_toml("unparseable_dates = \"fix\"").is_err());
    }
}
