//! Output formatting and persistence for dashboard reports.
//!
//! Supports text tables, pretty-printing, JSON files and CSV append.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use csv::WriterBuilder;

use crate::dashboard::Report;
use crate::types::{CheapestStation, StationRecord};

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &Report) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes `value` as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {path}"))?;
    debug!(path, "JSON written");
    Ok(())
}

/// Appends station records as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, records: &[StationRecord]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Cheapest-first list as a fixed-width table.
pub fn render_cheapest_table(entries: &[CheapestStation]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:>7}  {:<28} {:<32} {}",
        "ZIP", "PRICE", "STATION", "ADDRESS", "MAP"
    );
    for entry in entries {
        let station = &entry.summary.cheapest;
        let _ = writeln!(
            out,
            "{:<6} {:>7}  {:<28} {:<32} {}",
            entry.summary.zip,
            format!("${:.2}", entry.summary.price),
            truncate(&station.name, 28),
            truncate(&station.address, 32),
            entry.map_link
        );
    }
    out
}

/// All stations found for one zip, in the order the API listed them.
pub fn render_station_table(zip: &str, records: &[StationRecord]) -> String {
    let mut out = String::new();
    let noun = if records.len() == 1 { "station" } else { "stations" };
    let _ = writeln!(out, "{zip} ({} {noun})", records.len());
    let _ = writeln!(
        out,
        "  {:<10} {:<28} {:<32} {:>7}  {}",
        "ID", "STATION", "ADDRESS", "PRICE", "POSTED"
    );
    for record in records {
        let posted = record
            .posted_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<10} {:<28} {:<32} {:>7}  {}",
            record.id,
            truncate(&record.name, 28),
            truncate(&record.address, 32),
            format!("${:.2}", record.price),
            posted
        );
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZipSummary;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn record(id: &str, zip: &str, price: f64) -> StationRecord {
        StationRecord {
            id: id.to_string(),
            name: "Sunoco".to_string(),
            address: "100 Garfield Ave".to_string(),
            price,
            posted_at: None,
            zip: zip.to_string(),
            latitude: 40.701,
            longitude: -74.081,
        }
    }

    #[test]
    fn test_append_records_creates_file() {
        let path = temp_path("gas_price_map_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_records(&path, &[record("1001", "07305", 3.19)]).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("1001"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("gas_price_map_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[record("1001", "07305", 3.19)]).unwrap();
        append_records(&path, &[record("1002", "07305", 3.29)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        let header_count = lines.iter().filter(|l| l.starts_with("id,")).count();
        assert_eq!(header_count, 1);
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("gas_price_map_test_layers.json");

        write_json(&path, &record("1001", "07305", 3.19)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["price"], 3.19);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_cheapest_table() {
        let entry = CheapestStation::from(ZipSummary {
            zip: "07305".to_string(),
            price: 3.19,
            cheapest: record("1001", "07305", 3.19),
        });

        let table = render_cheapest_table(&[entry]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ZIP"));
        assert!(lines[1].contains("$3.19"));
        assert!(lines[1].contains("query=40.701,-74.081"));
    }

    #[test]
    fn test_render_station_table() {
        let table = render_station_table("07305", &[record("1001", "07305", 3.5)]);
        assert!(table.starts_with("07305 (1 station)\n"));
        assert!(table.contains("$3.50"));

        let table = render_station_table(
            "07305",
            &[record("1001", "07305", 3.5), record("1002", "07305", 3.4)],
        );
        assert!(table.starts_with("07305 (2 stations)\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Sunoco", 10), "Sunoco");
        assert_eq!(truncate("A very long station name", 8), "A very ~");
    }
}
