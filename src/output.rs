// src/output.rs
// =============================================================================
// Exporters for extracted records: a CSV file for analysts, plus JSON or a
// console table on stdout.
// =============================================================================

use anyhow::Result;
use std::io::Write;

use crate::extract::ExtractedRecord;
use crate::pipeline::HarvestReport;

/// Writes records with a header row, one record per line.
pub fn write_csv<W: Write>(records: &[ExtractedRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    // An empty harvest still gets a header so the file opens with the right columns
    if records.is_empty() {
        csv.write_record(CSV_HEADER)?;
    }
    csv.flush()?;
    Ok(())
}

const CSV_HEADER: [&str; 9] = [
    "latitude",
    "longitude",
    "title",
    "house_size",
    "manufacture_year",
    "rooms",
    "total_price",
    "price_per_meter",
    "token",
];

/// Prints the records either as JSON or as a table, followed by a summary.
pub fn print_results(report: &HarvestReport, json: bool, detail_base: &str) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&report.records)?;
        println!("{}", json_output);
    } else {
        print_table(&report.records, detail_base);
        print_summary(report);
    }
    Ok(())
}

fn print_table(records: &[ExtractedRecord], detail_base: &str) {
    for record in records {
        println!();
        println!("   latitude         : {}", record.latitude);
        println!("   longitude        : {}", record.longitude);
        println!("   title            : {}", record.title);
        println!("   size             : {}", record.house_size);
        println!("   manufacture year : {}", record.manufacture_year);
        println!("   rooms            : {}", record.rooms);
        println!("   total price      : {}", record.total_price);
        println!("   price per meter  : {}", record.price_per_meter);
        println!("   endpoint url     : {}", record.detail_url(detail_base));
    }
    println!();
}

pub fn print_summary(report: &HarvestReport) {
    println!("📊 Summary:");
    if let Some(crawl) = &report.crawled {
        println!(
            "   🔍 Crawled {} page(s), {} stub(s), {} without token",
            crawl.pages, crawl.stubs_seen, crawl.skipped
        );
    }
    println!("   🔗 Links: {}", report.links);
    println!("   ✅ Records: {}", report.records.len());
    println!("   ⚠️  No facts: {}", report.no_facts.len());
    println!("   ⚠️  Missing fields: {}", report.missing_fields.len());
    println!("   ❌ Unrecognized layouts: {}", report.unrecognized_layouts.len());
    for (token, widgets) in &report.unrecognized_layouts {
        println!("      {} ({} widgets)", token, widgets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExtractedRecord {
        ExtractedRecord {
            latitude: 35.7,
            longitude: 51.4,
            title: "آپارتمان، ونک".to_string(),
            house_size: "85".to_string(),
            manufacture_year: "1398".to_string(),
            rooms: "2".to_string(),
            total_price: "120,000,000".to_string(),
            price_per_meter: "1,000,000".to_string(),
            token: "gZx1Abc".to_string(),
        }
    }

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let mut out = Vec::new();
        write_csv(&[record()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "35.7,51.4,آپارتمان، ونک,85,1398,2,\"120,000,000\",\"1,000,000\",gZx1Abc"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_empty_still_has_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), CSV_HEADER.join(","));
    }
}
