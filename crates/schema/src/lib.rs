//! `haul-schema` — header reconciliation for delivery/sales sheets.
//!
//! Pure crate: receives a loaded table with arbitrary headers, returns a
//! canonical table or the list of required fields it could not find.
//! No file IO.

pub mod alias;
pub mod coerce;
pub mod config;
pub mod error;
pub mod field;
pub mod header;
pub mod mapping;
pub mod model;
pub mod reconcile;

pub use alias::AliasTable;
pub use config::SchemaConfig;
pub use error::SchemaError;
pub use field::{CanonicalField, FieldKind};
pub use header::{normalize_headers, normalize_key, HeaderTransform};
pub use mapping::{build_mapping, ColumnMapping, MatchKind};
pub use model::{CanonicalRecord, CanonicalTable, CellValue, RawTable, ReconcileSummary};
pub use reconcile::{reconcile, DatePolicy, Reconciler};
