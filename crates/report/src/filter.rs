use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use haul_schema::{CanonicalField, CanonicalRecord};

/// Row selection over a canonical table. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Inclusive first day.
    pub from: Option<NaiveDate>,
    /// Inclusive last day.
    pub to: Option<NaiveDate>,
    pub areas: Vec<String>,
    pub plants: Vec<String>,
    pub salesmen: Vec<String>,
    pub customers: Vec<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.areas.is_empty()
            && self.plants.is_empty()
            && self.salesmen.is_empty()
            && self.customers.is_empty()
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = record.delivery_date.map(|dt| dt.date()) else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
                return false;
            }
        }

        selected(&self.areas, &record.area)
            && selected(&self.plants, &record.plant)
            && selected(&self.salesmen, &record.salesman)
            && selected(&self.customers, &record.end_customer)
    }

    pub fn apply<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        let out: Vec<_> = records.iter().filter(|r| self.matches(r)).collect();
        log::debug!("filter kept {} of {} record(s)", out.len(), records.len());
        out
    }
}

fn selected(choices: &[String], value: &str) -> bool {
    choices.is_empty() || choices.iter().any(|c| c == value)
}

/// Choices a caller can offer for each filter, drawn from the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub areas: Vec<String>,
    /// Narrowed to the selected areas when any are selected.
    pub plants: Vec<String>,
    pub salesmen: Vec<String>,
    pub customers: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_records(records: &[CanonicalRecord], selected_areas: &[String]) -> Self {
        let distinct = |field: CanonicalField, keep: &dyn Fn(&CanonicalRecord) -> bool| {
            records
                .iter()
                .filter(|r| keep(r))
                .filter_map(|r| r.text(field))
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>()
        };

        let days = records.iter().filter_map(|r| r.delivery_date.map(|dt| dt.date()));

        Self {
            areas: distinct(CanonicalField::Area, &|_| true),
            plants: distinct(CanonicalField::Plant, &|r| selected(selected_areas, &r.area)),
            salesmen: distinct(CanonicalField::Salesman, &|_| true),
            customers: distinct(CanonicalField::EndCustomer, &|_| true),
            first_date: days.clone().min(),
            last_date: days.max(),
        }
    }

    /// The filter that selects everything these options cover.
    pub fn full_range(&self) -> Filter {
        Filter {
            from: self.first_date,
            to: self.last_date,
            ..Filter::default()
        }
    }
}
