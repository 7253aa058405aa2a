//! # Ingest
//! One-pass CSV loading and cleaning. This is the only place validation
//! happens: the engine downstream assumes every record it sees is already
//! well-formed.
//!
//! Cleaning rules follow the dashboard's source data: header and field
//! whitespace is trimmed, dates accept `YYYY-MM-DD` and `MM/DD/YYYY`, and an
//! empty `EndDate` cell means the subscription is still open. Invalid rows
//! are reported with their line number, never silently dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use metrics::counter;
use serde::Deserialize;
use tracing::info;

use crate::error::ValidationError;
use crate::record::SubscriptionRecord;

/// Raw CSV row before cleaning. Column names match the source export;
/// unknown extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "CustomerID")]
    customer_id: String,
    #[serde(rename = "PlanType")]
    plan_type: String,
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "StartDate")]
    start_date: String,
    #[serde(rename = "EndDate", default)]
    end_date: Option<String>,
    #[serde(rename = "MonthlyRevenue")]
    revenue: f64,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_date(
    value: &str,
    line: usize,
    customer_id: &str,
    field: &'static str,
) -> Result<NaiveDate, ValidationError> {
    let v = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(v, fmt) {
            return Ok(d);
        }
    }
    Err(ValidationError::MalformedDate {
        line,
        customer_id: customer_id.to_string(),
        field,
        value: value.to_string(),
    })
}

/// Clean and validate one raw row. `line` is the 1-based CSV line (header
/// included) used in error reports.
fn clean_row(raw: RawRow, line: usize) -> Result<SubscriptionRecord, ValidationError> {
    let customer_id = raw.customer_id.trim().to_string();
    if customer_id.is_empty() {
        return Err(ValidationError::MissingField {
            line,
            field: "CustomerID",
        });
    }

    let start_raw = raw.start_date.trim();
    if start_raw.is_empty() {
        return Err(ValidationError::MissingField {
            line,
            field: "StartDate",
        });
    }
    let start_date = parse_date(start_raw, line, &customer_id, "StartDate")?;

    // Empty end cell = still subscribed.
    let end_date = match raw.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(v) => Some(parse_date(v, line, &customer_id, "EndDate")?),
    };

    if let Some(end) = end_date {
        if start_date > end {
            return Err(ValidationError::InvertedDates {
                line,
                customer_id,
                start: start_date,
                end,
            });
        }
    }

    if raw.revenue < 0.0 {
        return Err(ValidationError::NegativeRevenue {
            line,
            customer_id,
            revenue: raw.revenue,
        });
    }

    Ok(SubscriptionRecord {
        customer_id,
        plan_type: raw.plan_type.trim().to_string(),
        segment: raw.segment.trim().to_string(),
        start_date,
        end_date,
        revenue: raw.revenue,
    })
}

/// Parse, clean and validate an in-memory CSV document. Fails on the first
/// invalid row with a `ValidationError` naming it.
pub fn load_records(csv_content: &str) -> Result<Vec<SubscriptionRecord>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawRow>().enumerate() {
        // Line 1 is the header, data starts at line 2.
        let line = idx + 2;
        let raw = row.map_err(|e| {
            counter!("ingest_rows_rejected_total").increment(1);
            ValidationError::UnreadableRow {
                line,
                message: e.to_string(),
            }
        })?;
        match clean_row(raw, line) {
            Ok(rec) => out.push(rec),
            Err(e) => {
                counter!("ingest_rows_rejected_total").increment(1);
                return Err(e);
            }
        }
    }

    counter!("ingest_rows_kept_total").increment(out.len() as u64);
    Ok(out)
}

/// Load the session dataset from a CSV file.
pub fn load_csv_file(path: &Path) -> anyhow::Result<Vec<SubscriptionRecord>> {
    use anyhow::Context;

    let mut content = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut content))
        .with_context(|| format!("reading subscription data from {}", path.display()))?;

    let records = load_records(&content)
        .with_context(|| format!("validating subscription data from {}", path.display()))?;

    info!(
        rows = records.len(),
        path = %path.display(),
        "loaded subscription dataset"
    );
    Ok(records)
}
