use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use haul_schema::{CanonicalField, CanonicalRecord};

/// One bucket of a grouped metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<K> {
    pub key: K,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stat {
    Sum,
    Mean,
}

/// Group records by key, reduce the measure per group. Keys ascend.
fn group_by<K, FK, FM>(records: &[&CanonicalRecord], key: FK, measure: FM, stat: Stat) -> Vec<Group<K>>
where
    K: Ord,
    FK: Fn(&CanonicalRecord) -> Option<K>,
    FM: Fn(&CanonicalRecord) -> f64,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();

    for record in records {
        let Some(k) = key(record) else { continue };
        let entry = groups.entry(k).or_insert((0.0, 0));
        entry.0 += measure(record);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (total, count))| Group {
            key,
            value: match stat {
                Stat::Sum => total,
                Stat::Mean => total / count as f64,
            },
            count,
        })
        .collect()
}

fn day(record: &CanonicalRecord) -> Option<NaiveDate> {
    record.delivery_date.map(|dt| dt.date())
}

fn text_key(field: CanonicalField) -> impl Fn(&CanonicalRecord) -> Option<String> {
    move |r| r.text(field).map(str::to_string)
}

/// Daily total volume. Undated records are skipped.
pub fn volume_by_date(records: &[&CanonicalRecord]) -> Vec<Group<NaiveDate>> {
    group_by(records, day, |r| r.volume, Stat::Sum)
}

/// Daily trips, summed from [`CanonicalRecord::trips`].
pub fn trips_by_date(records: &[&CanonicalRecord]) -> Vec<Group<NaiveDate>> {
    group_by(records, day, CanonicalRecord::trips, Stat::Sum)
}

/// Total volume per value of a text field (area, plant, salesman, customer).
pub fn volume_by(records: &[&CanonicalRecord], field: CanonicalField) -> Vec<Group<String>> {
    group_by(records, text_key(field), |r| r.volume, Stat::Sum)
}

pub fn trips_by_truck(records: &[&CanonicalRecord]) -> Vec<Group<String>> {
    group_by(records, text_key(CanonicalField::TruckId), CanonicalRecord::trips, Stat::Sum)
}

pub fn avg_volume_by_truck(records: &[&CanonicalRecord]) -> Vec<Group<String>> {
    group_by(records, text_key(CanonicalField::TruckId), |r| r.volume, Stat::Mean)
}

/// Mean distance per value of a text field (plant, area).
pub fn avg_distance_by(records: &[&CanonicalRecord], field: CanonicalField) -> Vec<Group<String>> {
    group_by(records, text_key(field), |r| r.distance, Stat::Mean)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline numbers for a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub trips: f64,
    pub total_volume: f64,
    pub avg_volume_per_trip: f64,
    pub total_distance: f64,
    pub avg_distance: f64,
    pub salesmen: usize,
    pub customers: usize,
    pub trucks: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl Summary {
    pub fn from_records(records: &[&CanonicalRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let rows = records.len();
        let trips: f64 = records.iter().map(|r| r.trips()).sum();
        let total_volume: f64 = records.iter().map(|r| r.volume).sum();
        let total_distance: f64 = records.iter().map(|r| r.distance).sum();
        let distinct = |f: fn(&CanonicalRecord) -> &str| {
            records.iter().map(|r| f(r)).collect::<BTreeSet<_>>().len()
        };
        let days = records.iter().filter_map(|r| day(r));

        Self {
            rows,
            trips,
            total_volume,
            avg_volume_per_trip: if trips > 0.0 { total_volume / trips } else { 0.0 },
            total_distance,
            avg_distance: total_distance / rows as f64,
            salesmen: distinct(|r| &r.salesman),
            customers: distinct(|r| &r.end_customer),
            trucks: distinct(|r| &r.truck_id),
            first_date: days.clone().min(),
            last_date: days.max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Every metric the delivery dashboard shows, for one filtered selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub volume_by_date: Vec<Group<NaiveDate>>,
    pub trips_by_date: Vec<Group<NaiveDate>>,
    pub volume_by_area: Vec<Group<String>>,
    pub volume_by_plant: Vec<Group<String>>,
    pub volume_by_salesman: Vec<Group<String>>,
    pub volume_by_customer: Vec<Group<String>>,
    pub trips_by_truck: Vec<Group<String>>,
    pub avg_volume_by_truck: Vec<Group<String>>,
    pub avg_distance_by_plant: Vec<Group<String>>,
    pub avg_distance_by_area: Vec<Group<String>>,
}

impl Report {
    pub fn build(records: &[&CanonicalRecord]) -> Self {
        Self {
            summary: Summary::from_records(records),
            volume_by_date: volume_by_date(records),
            trips_by_date: trips_by_date(records),
            volume_by_area: volume_by(records, CanonicalField::Area),
            volume_by_plant: volume_by(records, CanonicalField::Plant),
            volume_by_salesman: volume_by(records, CanonicalField::Salesman),
            volume_by_customer: volume_by(records, CanonicalField::EndCustomer),
            trips_by_truck: trips_by_truck(records),
            avg_volume_by_truck: avg_volume_by_truck(records),
            avg_distance_by_plant: avg_distance_by(records, CanonicalField::Plant),
            avg_distance_by_area: avg_distance_by(records, CanonicalField::Area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: Option<(i32, u32, u32)>, truck: &str, area: &str, volume: f64, distance: f64) -> CanonicalRecord {
        rec_with_trip(date, truck, area, volume, distance, &format!("DP-{truck}-{volume}"))
    }

    fn rec_with_trip(
        date: Option<(i32, u32, u32)>,
        truck: &str,
        area: &str,
        volume: f64,
        distance: f64,
        trip: &str,
    ) -> CanonicalRecord {
        CanonicalRecord {
            delivery_date: date
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
                .and_then(|d| d.and_hms_opt(8, 0, 0)),
            volume,
            salesman: "Ani".into(),
            trip_id: trip.into(),
            truck_id: truck.into(),
            area: area.into(),
            plant: "PL-01".into(),
            end_customer: "PT Beton".into(),
            distance,
            extra: vec![],
        }
    }

    #[test]
    fn basic_volume_by_date() {
        let records = vec![
            rec(Some((2024, 1, 2)), "T1", "Jakarta", 5.0, 10.0),
            rec(Some((2024, 1, 1)), "T1", "Jakarta", 3.0, 20.0),
            rec(Some((2024, 1, 2)), "T2", "Bandung", 7.0, 30.0),
            rec(None, "T2", "Bandung", 100.0, 30.0),
        ];
        let refs: Vec<_> = records.iter().collect();
        let by_date = volume_by_date(&refs);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[0].key, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(by_date[0].value, 3.0);
        assert_eq!(by_date[1].value, 12.0);
        assert_eq!(by_date[1].count, 2);
    }

    #[test]
    fn truck_metrics() {
        let records = vec![
            rec(Some((2024, 1, 1)), "T1", "Jakarta", 4.0, 10.0),
            rec(Some((2024, 1, 1)), "T1", "Jakarta", 6.0, 20.0),
            rec(Some((2024, 1, 2)), "T2", "Bandung", 7.0, 30.0),
        ];
        let refs: Vec<_> = records.iter().collect();

        let trips = trips_by_truck(&refs);
        assert_eq!(trips[0].key, "T1");
        assert_eq!(trips[0].value, 2.0);
        assert_eq!(trips[1].value, 1.0);

        let avg = avg_volume_by_truck(&refs);
        assert_eq!(avg[0].value, 5.0);
        assert_eq!(avg[1].value, 7.0);

        let dist = avg_distance_by(&refs, CanonicalField::Area);
        assert_eq!(dist[0].key, "Bandung");
        assert_eq!(dist[0].value, 30.0);
        assert_eq!(dist[1].value, 15.0);
    }

    #[test]
    fn summary_of_empty_selection_is_zero() {
        let summary = Summary::from_records(&[]);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.trips, 0.0);
        assert_eq!(summary.avg_volume_per_trip, 0.0);
        assert!(summary.first_date.is_none());
    }

    #[test]
    fn summary_counts_distinct_entities() {
        let records = vec![
            rec(Some((2024, 1, 3)), "T1", "Jakarta", 4.0, 10.0),
            rec(Some((2024, 1, 1)), "T2", "Jakarta", 6.0, 20.0),
        ];
        let refs: Vec<_> = records.iter().collect();
        let s = Summary::from_records(&refs);
        assert_eq!(s.rows, 2);
        assert_eq!(s.trips, 2.0);
        assert_eq!(s.total_volume, 10.0);
        assert_eq!(s.avg_volume_per_trip, 5.0);
        assert_eq!(s.avg_distance, 15.0);
        assert_eq!(s.trucks, 2);
        assert_eq!(s.salesmen, 1);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(s.last_date, NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn ritase_counts_are_summed() {
        let records = vec![
            rec_with_trip(Some((2024, 1, 1)), "T1", "Jakarta", 6.0, 10.0, "3"),
            rec_with_trip(Some((2024, 1, 1)), "T1", "Jakarta", 4.0, 10.0, "2"),
            rec_with_trip(Some((2024, 1, 2)), "T2", "Bandung", 5.0, 10.0, "DP-9"),
        ];
        let refs: Vec<_> = records.iter().collect();

        let by_truck = trips_by_truck(&refs);
        assert_eq!(by_truck[0].key, "T1");
        assert_eq!(by_truck[0].value, 5.0);
        assert_eq!(by_truck[0].count, 2);
        assert_eq!(by_truck[1].value, 1.0);

        let by_date = trips_by_date(&refs);
        assert_eq!(by_date[0].value, 5.0);
        assert_eq!(by_date[1].value, 1.0);

        let s = Summary::from_records(&refs);
        assert_eq!(s.rows, 3);
        assert_eq!(s.trips, 6.0);
        assert_eq!(s.avg_volume_per_trip, 2.5);
    }
}
