//! `haul report` — filtered dashboard metrics.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use haul_report::{Filter, FilterOptions, Group, Report};
use haul_schema::SchemaConfig;

use crate::reconcile::summary_line;
use crate::util::{fmt_number, render_table};
use crate::{load_input, print_json, CliError};

#[derive(Args)]
pub struct ReportArgs {
    /// Input file (xlsx, xls, xlsb, ods, csv, tsv)
    file: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// First delivery day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last delivery day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// Only these areas. Repeatable.
    #[arg(long, value_name = "AREA")]
    area: Vec<String>,

    /// Only these plants. Repeatable.
    #[arg(long, value_name = "PLANT")]
    plant: Vec<String>,

    /// Only these salesmen. Repeatable.
    #[arg(long, value_name = "NAME")]
    salesman: Vec<String>,

    /// Only these end customers. Repeatable.
    #[arg(long, value_name = "NAME")]
    customer: Vec<String>,

    /// Write the filtered canonical rows to a file (.xlsx or .csv)
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Output JSON instead of text tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    filter: &'a Filter,
    options: FilterOptions,
    report: Report,
}

pub fn cmd_report(config: &SchemaConfig, args: ReportArgs) -> Result<(), CliError> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            return Err(CliError::usage(format!("--from {from} is after --to {to}")));
        }
    }

    let reconciler = config.reconciler().map_err(CliError::schema)?;
    let raw = load_input(&args.file, args.sheet, config)?;
    let table = reconciler.reconcile(&raw).map_err(CliError::schema)?;
    log::info!("{}", summary_line(&table.summary));

    let filter = Filter {
        from: args.from,
        to: args.to,
        areas: args.area,
        plants: args.plant,
        salesmen: args.salesman,
        customers: args.customer,
    };
    let selection = filter.apply(&table.records);
    if selection.is_empty() {
        log::warn!("no deliveries match the filter");
    }
    let report = Report::build(&selection);

    if let Some(path) = &args.export {
        haul_io::write_table(&table, &selection, path).map_err(CliError::export)?;
        eprintln!("wrote {} row(s) to {}", selection.len(), path.display());
    }

    if args.json {
        let options = FilterOptions::from_records(&table.records, &filter.areas);
        return print_json(&ReportOutput {
            filter: &filter,
            options,
            report,
        });
    }

    print_text(&report);
    Ok(())
}

fn print_text(report: &Report) {
    let s = &report.summary;
    let period = match (s.first_date, s.last_date) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "-".to_string(),
    };

    println!("Trips:      {} over {} row(s)", fmt_number(s.trips), s.rows);
    println!(
        "Volume:     {} total, {} per trip",
        fmt_number(s.total_volume),
        fmt_number(s.avg_volume_per_trip)
    );
    println!(
        "Distance:   {} total, {} average",
        fmt_number(s.total_distance),
        fmt_number(s.avg_distance)
    );
    println!("Period:     {period}");
    println!(
        "Salesmen:   {}  Customers: {}  Trucks: {}",
        s.salesmen, s.customers, s.trucks
    );

    section("Volume by date", "date", "volume", &report.volume_by_date);
    section("Trips by date", "date", "trips", &report.trips_by_date);
    section("Volume by area", "area", "volume", &report.volume_by_area);
    section("Volume by plant", "plant", "volume", &report.volume_by_plant);
    section("Volume by salesman", "salesman", "volume", &report.volume_by_salesman);
    section("Volume by customer", "end customer", "volume", &report.volume_by_customer);
    section("Trips by truck", "truck", "trips", &report.trips_by_truck);
    section("Average volume by truck", "truck", "avg volume", &report.avg_volume_by_truck);
    section("Average distance by plant", "plant", "avg distance", &report.avg_distance_by_plant);
    section("Average distance by area", "area", "avg distance", &report.avg_distance_by_area);
}

fn section<K: ToString>(title: &str, key: &str, value: &str, groups: &[Group<K>]) {
    if groups.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| vec![g.key.to_string(), fmt_number(g.value), g.count.to_string()])
        .collect();
    println!("\n{title}");
    print!("{}", render_table(&[key, value, "rows"], &rows));
}
