use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::SchemaError;
use crate::field::CanonicalField;
use crate::header::normalize_key;

// ---------------------------------------------------------------------------
// Built-in aliases
// ---------------------------------------------------------------------------

// Stored already normalized. The canonical name comes first so a sheet that
// was exported with canonical headers maps back onto itself.
const DELIVERY_DATE: &[&str] = &[
    "delivery_date",
    "tanggal pengiriman",
    "dp date",
    "delivery date",
    "tgl pengiriman",
    "tanggal kirim",
    "tanggal",
    "tgl",
    "date",
];
const VOLUME: &[&str] = &["volume", "qty", "quantity", "kuantitas", "volume m3", "m3", "vol"];
const SALESMAN: &[&str] = &[
    "salesman",
    "sales man",
    "sales name",
    "nama sales",
    "sales person",
    "salesperson",
    "sales",
];
const TRIP_ID: &[&str] = &[
    "trip_id",
    "dp no",
    "no dp",
    "dp number",
    "ritase",
    "trip no",
    "trip",
    "do no",
    "delivery no",
];
const TRUCK_ID: &[&str] = &[
    "truck_id",
    "truck no",
    "truck number",
    "no truck",
    "nopol",
    "no polisi",
    "plat nomor",
    "truck",
    "vehicle",
    "armada",
];
const AREA: &[&str] = &["area", "wilayah", "region"];
const PLANT: &[&str] = &["plant", "plant name", "nama plant", "batching plant"];
const END_CUSTOMER: &[&str] = &[
    "end_customer",
    "end customer",
    "customer name",
    "nama customer",
    "customer",
    "pelanggan",
    "project",
];
const DISTANCE: &[&str] = &["distance", "jarak", "jarak tempuh", "km"];

fn builtin_aliases(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::DeliveryDate => DELIVERY_DATE,
        CanonicalField::Volume => VOLUME,
        CanonicalField::Salesman => SALESMAN,
        CanonicalField::TripId => TRIP_ID,
        CanonicalField::TruckId => TRUCK_ID,
        CanonicalField::Area => AREA,
        CanonicalField::Plant => PLANT,
        CanonicalField::EndCustomer => END_CUSTOMER,
        CanonicalField::Distance => DISTANCE,
    }
}

static BUILTIN: Lazy<AliasTable> = Lazy::new(|| AliasTable {
    entries: CanonicalField::ALL
        .into_iter()
        .map(|field| AliasEntry {
            field,
            aliases: builtin_aliases(field).iter().map(|a| a.to_string()).collect(),
        })
        .collect(),
});

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub field: CanonicalField,
    /// Normalized candidate keys, highest priority first.
    pub aliases: Vec<String>,
}

/// Candidate header keys for every canonical field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// The process-wide default table.
    pub fn builtin() -> &'static AliasTable {
        &BUILTIN
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Append extra aliases to a field, after the existing ones.
    ///
    /// Aliases are normalized the same way headers are. Empty aliases would
    /// match every header in the substring tier and are rejected.
    pub fn extend<S: AsRef<str>>(
        &mut self,
        field: CanonicalField,
        extra: &[S],
    ) -> Result<(), SchemaError> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.field == field) else {
            return Err(SchemaError::Config(format!("no alias entry for '{field}'")));
        };
        for alias in extra {
            let key = normalize_key(alias.as_ref());
            if key.is_empty() {
                return Err(SchemaError::Config(format!(
                    "empty alias for field '{field}'"
                )));
            }
            if !entry.aliases.contains(&key) {
                entry.aliases.push(key);
            }
        }
        Ok(())
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_field_in_order() {
        let table = AliasTable::builtin();
        let fields: Vec<_> = table.entries().iter().map(|e| e.field).collect();
        assert_eq!(fields, CanonicalField::ALL.to_vec());
    }

    #[test]
    fn canonical_name_is_first_alias() {
        for field in CanonicalField::ALL {
            assert_eq!(AliasTable::builtin().aliases(field)[0], field.name());
        }
    }

    #[test]
    fn builtin_aliases_are_normalized() {
        for entry in AliasTable::builtin().entries() {
            for alias in &entry.aliases {
                assert_eq!(&normalize_key(alias), alias);
                assert!(!alias.is_empty());
            }
        }
    }

    #[test]
    fn extend_normalizes_and_dedups() {
        let mut table = AliasTable::default();
        table
            .extend(CanonicalField::Volume, &["  Jumlah  M3 ", "QTY"])
            .unwrap();
        let aliases = table.aliases(CanonicalField::Volume);
        assert_eq!(aliases.last().unwrap(), "jumlah m3");
        assert_eq!(aliases.iter().filter(|a| *a == "qty").count(), 1);
        // builtin untouched
        assert!(!AliasTable::builtin()
            .aliases(CanonicalField::Volume)
            .contains(&"jumlah m3".to_string()));
    }

    #[test]
    fn extend_rejects_empty_alias() {
        let mut table = AliasTable::default();
        let err = table.extend(CanonicalField::Area, &["   "]).unwrap_err();
        assert!(err.to_string().contains("empty alias"));
    }
}
