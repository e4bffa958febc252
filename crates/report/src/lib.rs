//! `haul-report` — filters and dashboard metrics over reconciled records.
//!
//! Works on `CanonicalRecord`s only, so any sheet the reconciler accepts
//! can be reported on regardless of its original headers.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    avg_distance_by, avg_volume_by_truck, trips_by_date, trips_by_truck, volume_by,
    volume_by_date, Group, Report, Summary,
};
pub use filter::{Filter, FilterOptions};
