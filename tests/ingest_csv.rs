// tests/ingest_csv.rs
//
// File-level ingestion tests: loading, cleaning and validation errors end to
// end through `load_csv_file`.

use std::io::Write;

use subscription_analytics::ingest;
use subscription_analytics::ValidationError;

const HEADER: &str = "CustomerID,PlanType,Segment,StartDate,EndDate,MonthlyRevenue\n";

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp csv");
    f.write_all(content.as_bytes()).expect("write csv");
    f
}

#[test]
fn loads_a_clean_file() {
    let f = write_csv(&format!(
        "{HEADER}c1,basic,smb,2024-01-10,,10\n\
         c2,premium,enterprise,2024-01-15,2024-02-01,20\n\
         c3,basic,enterprise,02/20/2024,,15\n"
    ));
    let recs = ingest::load_csv_file(f.path()).expect("load");
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[2].start_date, "2024-02-20".parse().unwrap());
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = ingest::load_csv_file("/no/such/file.csv".as_ref()).unwrap_err();
    assert!(err.to_string().contains("/no/such/file.csv"));
}

#[test]
fn bad_row_surfaces_the_validation_error() {
    let f = write_csv(&format!(
        "{HEADER}c1,basic,smb,2024-01-10,,10\nc2,basic,smb,2024-01-15,,-3\n"
    ));
    let err = ingest::load_csv_file(f.path()).unwrap_err();
    let ve = err
        .downcast_ref::<ValidationError>()
        .expect("validation error in chain");
    assert!(matches!(
        ve,
        ValidationError::NegativeRevenue { line: 3, .. }
    ));
}

#[test]
fn no_partial_dataset_on_failure() {
    // A single malformed row fails the whole pass; nothing is silently kept.
    let f = write_csv(&format!("{HEADER}c1,basic,smb,garbage,,10\n"));
    assert!(ingest::load_csv_file(f.path()).is_err());
}
