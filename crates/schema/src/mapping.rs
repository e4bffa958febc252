use std::collections::BTreeMap;

use serde::Serialize;

use crate::alias::AliasTable;
use crate::field::CanonicalField;
use crate::header::{HeaderKey, HeaderTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
}

/// The source column chosen for one canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedColumn {
    pub index: usize,
    pub header: String,
    pub alias: String,
    pub kind: MatchKind,
}

/// Canonical field -> source column, built once per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    fields: BTreeMap<CanonicalField, MappedColumn>,
    /// Headers no field claimed, in column order.
    unmatched: Vec<HeaderKey>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<&MappedColumn> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Mapped fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &MappedColumn)> {
        self.fields.iter().map(|(f, c)| (*f, c))
    }

    /// Fields that matched no header, in declaration order.
    pub fn absent(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    pub fn unmatched(&self) -> &[HeaderKey] {
        &self.unmatched
    }

    /// Canonical field fed by the column at `index`, if any.
    pub fn field_for_column(&self, index: usize) -> Option<CanonicalField> {
        self.fields
            .iter()
            .find(|(_, c)| c.index == index)
            .map(|(f, _)| *f)
    }
}

/// Assign each canonical field at most one header.
///
/// Fields are processed in declaration order. For each field an exact alias
/// match anywhere in the sheet beats any substring match; within a tier the
/// leftmost unassigned header wins. An assigned header is consumed.
pub fn build_mapping(headers: &HeaderTransform, aliases: &AliasTable) -> ColumnMapping {
    let mut taken = vec![false; headers.len()];
    let mut fields = BTreeMap::new();

    for entry in aliases.entries() {
        let found = find_exact(headers, &taken, &entry.aliases)
            .map(|(pos, alias)| (pos, alias, MatchKind::Exact))
            .or_else(|| {
                find_substring(headers, &taken, &entry.aliases)
                    .map(|(pos, alias)| (pos, alias, MatchKind::Substring))
            });

        if let Some((pos, alias, kind)) = found {
            let header = &headers.entries[pos];
            log::debug!(
                "mapped '{}' -> {} ({:?} on alias '{}')",
                header.original,
                entry.field,
                kind,
                alias
            );
            taken[pos] = true;
            fields.insert(
                entry.field,
                MappedColumn {
                    index: header.index,
                    header: header.original.clone(),
                    alias: alias.to_string(),
                    kind,
                },
            );
        }
    }

    let unmatched = headers
        .iter()
        .zip(&taken)
        .filter(|(_, t)| !**t)
        .map(|(h, _)| h.clone())
        .collect();

    ColumnMapping { fields, unmatched }
}

fn find_exact<'a>(
    headers: &HeaderTransform,
    taken: &[bool],
    aliases: &'a [String],
) -> Option<(usize, &'a str)> {
    headers
        .iter()
        .enumerate()
        .filter(|(pos, h)| !taken[*pos] && !h.key.is_empty())
        .find_map(|(pos, h)| {
            aliases
                .iter()
                .find(|a| **a == h.key)
                .map(|a| (pos, a.as_str()))
        })
}

fn find_substring<'a>(
    headers: &HeaderTransform,
    taken: &[bool],
    aliases: &'a [String],
) -> Option<(usize, &'a str)> {
    headers
        .iter()
        .enumerate()
        .filter(|(pos, h)| !taken[*pos] && !h.key.is_empty())
        .find_map(|(pos, h)| {
            aliases
                .iter()
                .filter(|a| !a.is_empty())
                .find(|a| h.key.contains(a.as_str()))
                .map(|a| (pos, a.as_str()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::normalize_headers;

    fn map(headers: &[&str]) -> ColumnMapping {
        build_mapping(&normalize_headers(headers), AliasTable::builtin())
    }

    #[test]
    fn maps_indonesian_and_english_synonyms() {
        let m = map(&["Tanggal Pengiriman", "Qty", "Sales Man", "DP No", "Plant Name"]);
        assert_eq!(m.get(CanonicalField::DeliveryDate).unwrap().header, "Tanggal Pengiriman");
        assert_eq!(m.get(CanonicalField::Volume).unwrap().header, "Qty");
        assert_eq!(m.get(CanonicalField::Salesman).unwrap().header, "Sales Man");
        assert_eq!(m.get(CanonicalField::TripId).unwrap().header, "DP No");
        assert_eq!(m.get(CanonicalField::Plant).unwrap().header, "Plant Name");
        assert!(m.unmatched().is_empty());
    }

    #[test]
    fn exact_beats_substring_regardless_of_column_order() {
        // "delivery date (planned)" only contains an alias; "DP Date" equals one
        let m = map(&["Delivery Date (planned)", "DP Date"]);
        let col = m.get(CanonicalField::DeliveryDate).unwrap();
        assert_eq!(col.header, "DP Date");
        assert_eq!(col.kind, MatchKind::Exact);
        assert_eq!(m.unmatched()[0].original, "Delivery Date (planned)");
    }

    #[test]
    fn substring_used_when_no_exact_match() {
        let m = map(&["Total Volume (m3)"]);
        let col = m.get(CanonicalField::Volume).unwrap();
        assert_eq!(col.kind, MatchKind::Substring);
        assert_eq!(col.alias, "volume");
    }

    #[test]
    fn leftmost_header_wins_within_a_tier() {
        let m = map(&["Ritase", "DP No"]);
        assert_eq!(m.get(CanonicalField::TripId).unwrap().header, "Ritase");
        assert_eq!(m.unmatched().len(), 1);
        assert_eq!(m.unmatched()[0].original, "DP No");

        let m = map(&["DP No", "Ritase"]);
        assert_eq!(m.get(CanonicalField::TripId).unwrap().header, "DP No");
    }

    #[test]
    fn ambiguous_header_goes_to_first_declared_field() {
        // contains both "area" and "plant"; area is declared first
        let m = map(&["Plant Area"]);
        assert_eq!(m.get(CanonicalField::Area).unwrap().header, "Plant Area");
        assert!(!m.contains(CanonicalField::Plant));
    }

    #[test]
    fn consumed_header_is_not_reused() {
        let m = map(&["Volume"]);
        assert!(m.contains(CanonicalField::Volume));
        assert_eq!(m.iter().count(), 1);
    }

    #[test]
    fn unknown_and_empty_headers_are_inert() {
        let m = map(&["", "Keterangan", "Qty"]);
        assert_eq!(m.iter().count(), 1);
        let unmatched: Vec<_> = m.unmatched().iter().map(|h| h.original.as_str()).collect();
        assert_eq!(unmatched, vec!["", "Keterangan"]);
        assert_eq!(m.field_for_column(2), Some(CanonicalField::Volume));
        assert_eq!(m.field_for_column(1), None);
    }

    #[test]
    fn absent_lists_unmapped_fields_in_order() {
        let m = map(&["Volume", "Salesman"]);
        assert_eq!(
            m.absent(),
            vec![
                CanonicalField::DeliveryDate,
                CanonicalField::TripId,
                CanonicalField::TruckId,
                CanonicalField::Area,
                CanonicalField::Plant,
                CanonicalField::EndCustomer,
                CanonicalField::Distance,
            ]
        );
    }
}
