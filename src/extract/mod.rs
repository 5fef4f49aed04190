// src/extract/mod.rs
// =============================================================================
// This module projects a detail document into a flat ExtractedRecord.
//
// Submodules:
// - numerals: converts native-script digits to ASCII digits
// - layout: classifies the facts section and locates the price widgets
//
// Where things live in a detail document:
//   sections[4].widgets                  the facts section
//   sections[4].widgets[0].data.items    size, build year, rooms
//   sections[4].widgets[N].data.value    prices, N decided by FactsLayout
//   seo.post_seo_schema.geo              latitude / longitude
//   seo.post_seo_schema.web_info.title   title
//   contact.action_log.server_side_info.info.post_token
//
// Outcomes of `extract`:
//   Ok(Some(record))  everything was found
//   Ok(None)          no facts items; not a listing we can use
//   Err(..)           a field we rely on is missing, or the layout is unknown
// =============================================================================

pub mod layout;
pub mod numerals;

pub use layout::{FactsLayout, PriceSlots};
pub use numerals::to_latin_digits;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// Index of the facts section in `sections`
const FACTS_SECTION: usize = 4;

// JSON Pointer paths (RFC 6901) into the detail document

const LATITUDE: &str = "/seo/post_seo_schema/geo/latitude";
const LONGITUDE: &str = "/seo/post_seo_schema/geo/longitude";
const TITLE: &str = "/seo/post_seo_schema/web_info/title";
const POST_TOKEN: &str = "/contact/action_log/server_side_info/info/post_token";

// Why a document could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Path (or logical name) of the field that was absent or empty
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Facts widget count outside the known layouts
    #[error("facts section has {widgets} widgets, which matches no known layout")]
    UnrecognizedLayout { widgets: usize },
}

// One listing, flattened
//
// Field order is the export column order (see src/output.rs). Every text
// field holds ASCII digits only; native-script digits are converted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    /// Floor area in square meters, e.g. "120"
    pub house_size: String,
    pub manufacture_year: String,
    pub rooms: String,
    /// First word of the price widget, e.g. "4,500,000,000"
    pub total_price: String,
    pub price_per_meter: String,
    pub token: String,
}

impl ExtractedRecord {
    // Rebuilds the detail link the record was fetched from
    //
    // Example:
    //   detail_url("https://api.divar.ir/v8/posts-v2/web/")
    //   -> "https://api.divar.ir/v8/posts-v2/web/abc123"
    pub fn detail_url(&self, detail_base: &str) -> String {
        crate::crawl::ListingLink::new(detail_base, &self.token).url
    }
}

// Stateless; a struct so the pipeline can hold one and tests can build one
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    // Projects one detail document into a record
    //
    // Parameters:
    //   document: parsed detail JSON, as returned by DetailCache::fetch
    //
    // Returns:
    //   Ok(Some(record)) - all fields found
    //   Ok(None)         - facts section or its items are absent/empty
    //   Err(..)          - a field is missing or the widget count is unknown
    //
    // Order of checks: items first (so non-listings are skipped quietly),
    // then coordinates and title, then facts, then prices, then the token.
    pub fn extract(&self, document: &Value) -> Result<Option<ExtractedRecord>, ExtractError> {
        let widgets = match facts_widgets(document) {
            Some(widgets) => widgets,
            None => return Ok(None),
        };

        let items = match widgets
            .first()
            .and_then(|w| w.pointer("/data/items"))
            .and_then(Value::as_array)
        {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(None),
        };

        let latitude = number_at(document, LATITUDE)?;
        let longitude = number_at(document, LONGITUDE)?;
        let title = text_at(document, TITLE)?.to_string();

        let house_size = item_value(items, 0, "facts.items[0].value")?;
        let manufacture_year = item_value(items, 1, "facts.items[1].value")?;
        let rooms = item_value(items, 2, "facts.items[2].value")?;

        // Where the prices sit depends on how many widgets the section has
        let slots = FactsLayout::classify(widgets.len())?.price_slots();
        let total_price = price_at(widgets, slots.total_price, "facts.total_price")?;
        let price_per_meter = price_at(widgets, slots.price_per_meter, "facts.price_per_meter")?;

        let token = text_at(document, POST_TOKEN)?.to_string();

        Ok(Some(ExtractedRecord {
            latitude,
            longitude,
            title,
            house_size,
            manufacture_year,
            rooms,
            total_price,
            price_per_meter,
            token,
        }))
    }
}

// sections[4].widgets, or None if any step is missing
fn facts_widgets(document: &Value) -> Option<&Vec<Value>> {
    document
        .get("sections")?
        .get(FACTS_SECTION)?
        .get("widgets")?
        .as_array()
}

// A non-empty string at `path`; an empty string counts as missing
fn text_at<'a>(document: &'a Value, path: &'static str) -> Result<&'a str, ExtractError> {
    document
        .pointer(path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::MissingField(path))
}

// Coordinates are usually numbers but some documents quote them
fn number_at(document: &Value, path: &'static str) -> Result<f64, ExtractError> {
    let number = match document.pointer(path) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => to_latin_digits(s.trim()).parse::<f64>().ok(),
        _ => None,
    };
    number.ok_or(ExtractError::MissingField(path))
}

// items[index].value with digits converted, e.g. "۱۲۰" -> "120"
fn item_value(items: &[Value], index: usize, field: &'static str) -> Result<String, ExtractError> {
    items
        .get(index)
        .and_then(|item| item.get("value"))
        .and_then(Value::as_str)
        .map(to_latin_digits)
        .ok_or(ExtractError::MissingField(field))
}

// "۱۲۰,۰۰۰,۰۰۰ تومان" -> "120,000,000"
fn price_at(widgets: &[Value], index: usize, field: &'static str) -> Result<String, ExtractError> {
    widgets
        .get(index)
        .and_then(|w| w.pointer("/data/value"))
        .and_then(Value::as_str)
        .and_then(|value| value.split_whitespace().next())
        .map(to_latin_digits)
        .ok_or(ExtractError::MissingField(field))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is Value::pointer?
//    - serde_json's way to walk a path like "/seo/post_seo_schema/geo/latitude"
//    - Returns Option<&Value>: None as soon as any step is missing
//    - Array indices are written as numbers: "/sections/4/widgets"
//
// 2. Why Result<Option<..>, ..> instead of just Result?
//    - Ok(None) means "not a listing we can use", which is normal
//    - Err means "looked like a listing but something is off", worth a warning
//
// 3. Why &'static str in MissingField?
//    - Every field name is a constant in this file, so no allocation is needed
//    - The compiler guarantees the string lives forever
//
// 4. Why keep prices as String, not numbers?
//    - They contain thousands separators ("4,500,000,000") and can exceed
//      what a spreadsheet shows without rounding; exporting text keeps them exact
// -----------------------------------------------------------------------------
