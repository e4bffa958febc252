use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::coerce::{self, DateParser};
use crate::error::SchemaError;
use crate::field::{CanonicalField, FieldKind};
use crate::header::normalize_headers;
use crate::mapping::{build_mapping, ColumnMapping};
use crate::model::{CanonicalRecord, CanonicalTable, CellValue, RawTable, ReconcileSummary};

/// What happens to a row whose delivery date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Exclude the row from the canonical table.
    #[default]
    Drop,
    /// Keep the row with no date.
    Keep,
}

/// A configured reconciliation: alias table, required set, date handling.
///
/// Holds no per-table state; one instance can reconcile any number of
/// tables and each call returns an independent result.
#[derive(Debug, Clone)]
pub struct Reconciler {
    aliases: AliasTable,
    required: BTreeSet<CanonicalField>,
    date_policy: DatePolicy,
    dates: DateParser,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(AliasTable::default())
    }
}

impl Reconciler {
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            required: CanonicalField::DEFAULT_REQUIRED.into_iter().collect(),
            date_policy: DatePolicy::default(),
            dates: DateParser::default(),
        }
    }

    pub fn with_required(mut self, fields: &[CanonicalField]) -> Self {
        self.required = fields.iter().copied().collect();
        self
    }

    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }

    pub fn with_date_parser(mut self, dates: DateParser) -> Self {
        self.dates = dates;
        self
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn is_required(&self, field: CanonicalField) -> bool {
        self.required.contains(&field)
    }

    pub fn date_policy(&self) -> DatePolicy {
        self.date_policy
    }

    pub fn map_headers<S: AsRef<str>>(&self, headers: &[S]) -> ColumnMapping {
        build_mapping(&normalize_headers(headers), &self.aliases)
    }

    /// Required fields the mapping could not fill, in declaration order.
    pub fn missing_required(&self, mapping: &ColumnMapping) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| self.is_required(*f) && !mapping.contains(*f))
            .collect()
    }

    pub fn reconcile(&self, raw: &RawTable) -> Result<CanonicalTable, SchemaError> {
        let mapping = self.map_headers(raw.headers());

        let missing = self.missing_required(&mapping);
        if !missing.is_empty() {
            log::warn!(
                "rejecting table: {} required field(s) unmatched: {:?}",
                missing.len(),
                missing
            );
            return Err(SchemaError::MissingFields { fields: missing });
        }

        // everything absent at this point is optional
        let defaulted = mapping.absent();
        let passthrough_cols: Vec<usize> = mapping.unmatched().iter().map(|h| h.index).collect();
        let passthrough = mapping
            .unmatched()
            .iter()
            .map(|h| h.original.clone())
            .collect();

        let mut summary = ReconcileSummary {
            rows_in: raw.row_count(),
            defaulted,
            ..Default::default()
        };
        let mut records = Vec::with_capacity(raw.row_count());

        for row in raw.rows() {
            let source = |field: CanonicalField| mapping.get(field).map(|c| &row[c.index]);

            let delivery_date = match source(CanonicalField::DeliveryDate) {
                None => None,
                Some(cell) => match self.dates.parse_cell(cell) {
                    Some(dt) => Some(dt),
                    None if self.date_policy == DatePolicy::Drop => {
                        summary.dropped_bad_dates += 1;
                        continue;
                    }
                    None => {
                        summary.kept_bad_dates += 1;
                        None
                    }
                },
            };

            let mut numeric = |field: CanonicalField| match source(field) {
                None => FieldKind::NUMERIC_DEFAULT,
                Some(cell) => coerce::number(cell).unwrap_or_else(|| {
                    summary.numeric_zeroed += 1;
                    0.0
                }),
            };
            let volume = numeric(CanonicalField::Volume);
            let distance = numeric(CanonicalField::Distance);

            let text = |field: CanonicalField| {
                source(field)
                    .and_then(coerce::text)
                    .unwrap_or_else(|| field.kind().default_text().unwrap_or_default().to_string())
            };

            records.push(CanonicalRecord {
                delivery_date,
                volume,
                salesman: text(CanonicalField::Salesman),
                trip_id: text(CanonicalField::TripId),
                truck_id: text(CanonicalField::TruckId),
                area: text(CanonicalField::Area),
                plant: text(CanonicalField::Plant),
                end_customer: text(CanonicalField::EndCustomer),
                distance,
                extra: passthrough_cols.iter().map(|&i| row[i].clone()).collect::<Vec<CellValue>>(),
            });
        }

        summary.rows_out = records.len();
        if summary.dropped_bad_dates > 0 {
            log::warn!(
                "dropped {} of {} row(s) with unparseable delivery dates",
                summary.dropped_bad_dates,
                summary.rows_in
            );
        }
        log::debug!(
            "reconciled {} -> {} row(s); {} numeric cell(s) zeroed; defaulted {:?}",
            summary.rows_in,
            summary.rows_out,
            summary.numeric_zeroed,
            summary.defaulted
        );

        Ok(CanonicalTable {
            mapping,
            passthrough,
            records,
            summary,
        })
    }
}

/// Reconcile with the default date policy and formats.
pub fn reconcile(
    raw: &RawTable,
    aliases: &AliasTable,
    required: &[CanonicalField],
) -> Result<CanonicalTable, SchemaError> {
    Reconciler::new(aliases.clone())
        .with_required(required)
        .reconcile(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    fn t(s: &str) -> CellValue {
        CellValue::from(s)
    }

    #[test]
    fn keep_policy_retains_bad_dates() {
        let raw = table(
            &["Tanggal", "Qty", "Salesman", "Ritase"],
            vec![
                vec![t("2024-01-02"), t("5"), t("Ani"), t("1")],
                vec![t("kemarin"), t("6"), t("Ani"), t("2")],
            ],
        );
        let out = Reconciler::default()
            .with_date_policy(DatePolicy::Keep)
            .reconcile(&raw)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.records[1].delivery_date.is_none());
        assert_eq!(out.summary.kept_bad_dates, 1);
        assert_eq!(out.summary.dropped_bad_dates, 0);
    }

    #[test]
    fn non_numeric_cells_become_zero() {
        let raw = table(
            &["Tanggal", "Qty", "Salesman", "Ritase", "Jarak"],
            vec![
                vec![t("2024-01-02"), t("abc"), t("Ani"), t("1"), t("")],
                vec![t("2024-01-03"), CellValue::Number(7.0), t("Ani"), t("2"), t("12.5")],
            ],
        );
        let out = Reconciler::default().reconcile(&raw).unwrap();
        assert_eq!(out.records[0].volume, 0.0);
        assert_eq!(out.records[0].distance, 0.0);
        assert_eq!(out.records[1].volume, 7.0);
        assert_eq!(out.records[1].distance, 12.5);
        assert_eq!(out.summary.numeric_zeroed, 2);
    }

    #[test]
    fn empty_text_cells_take_the_field_default() {
        let raw = table(
            &["Tanggal", "Qty", "Salesman", "Ritase", "Area"],
            vec![vec![t("2024-01-02"), t("1"), t(""), t("1"), t("  ")]],
        );
        let out = Reconciler::default().reconcile(&raw).unwrap();
        assert_eq!(out.records[0].salesman, "Unknown");
        assert_eq!(out.records[0].area, "Unknown");
    }

    #[test]
    fn relaxed_required_set_defaults_instead_of_failing() {
        let raw = table(&["Qty", "Salesman"], vec![vec![t("3"), t("Budi")]]);
        let out = Reconciler::default()
            .with_required(&[CanonicalField::Volume])
            .reconcile(&raw)
            .unwrap();
        let rec = &out.records[0];
        assert_eq!(rec.delivery_date, None);
        assert_eq!(rec.trip_id, "1");
        assert!(out.summary.defaulted.contains(&CanonicalField::DeliveryDate));
        assert!(out.summary.defaulted.contains(&CanonicalField::TripId));
    }

    #[test]
    fn required_field_is_never_defaulted() {
        let raw = table(&["Qty", "Salesman", "Ritase"], vec![]);
        let err = Reconciler::default().reconcile(&raw).unwrap_err();
        match err {
            SchemaError::MissingFields { fields } => {
                assert_eq!(fields, vec![CanonicalField::DeliveryDate])
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
