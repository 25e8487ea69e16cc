//! Integration tests for prism-export
//!
//! These exercise real files in temporary directories.

use chrono::Utc;
use prism_domain::{AnalysisKind, AnalysisRecord, ContentKind, RecordSink};
use prism_export::{
    append_record, column_count, encode_row, header_row, parse_csv, read_rows, record_row, CsvSink,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn rating_record(clarity: Option<u8>, verdict: &str) -> AnalysisRecord {
    let schema = AnalysisKind::Rating.schema();
    let mut scores: BTreeMap<String, Option<u8>> =
        schema.scored.iter().map(|f| (f.to_string(), None)).collect();
    scores.insert("Clarity".to_string(), clarity);

    let mut labels = BTreeMap::new();
    labels.insert("Verdict".to_string(), Some(verdict.to_string()));

    AnalysisRecord {
        timestamp: Utc::now(),
        content_kind: ContentKind::Text,
        analysis_kind: AnalysisKind::Rating,
        scores,
        labels,
        lists: BTreeMap::new(),
        response_text: format!("Clarity: {:?}/10\nVerdict: {}", clarity, verdict),
        original_input: "input, with \"quotes\"\nand a newline".to_string(),
    }
}

#[test]
fn test_header_written_once_for_many_appends() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path());

    let mut receipts = Vec::new();
    for i in 0..5 {
        receipts.push(sink.export(&rating_record(Some(i), "ok")).unwrap());
    }

    assert!(receipts[0].header_written);
    assert!(receipts[1..].iter().all(|r| !r.header_written));

    let rows = read_rows(sink.path_for(AnalysisKind::Rating)).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], header_row(AnalysisKind::Rating));
    assert_eq!(rows.iter().filter(|r| r[0] == "timestamp").count(), 1);
    assert!(rows.iter().all(|r| r.len() == column_count(AnalysisKind::Rating)));
}

#[test]
fn test_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("deep").join("exports");
    let sink = CsvSink::new(&nested);

    let receipt = sink.export(&rating_record(Some(7), "fine")).unwrap();

    assert!(nested.is_dir());
    assert_eq!(receipt.path, nested.join("rating.csv"));
    assert_eq!(fs::metadata(&receipt.path).unwrap().len() as usize, receipt.bytes_written);
}

#[test]
fn test_existing_content_is_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rating.csv");
    fs::write(&path, "\"legacy\"\n").unwrap();

    let receipt = append_record(&rating_record(None, "later"), &path).unwrap();

    assert!(!receipt.header_written);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\"legacy\"\n"));
    assert_eq!(parse_csv(&text).len(), 2);
}

#[test]
fn test_empty_file_gets_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rating.csv");
    fs::write(&path, "").unwrap();

    let receipt = append_record(&rating_record(Some(3), "meh"), &path).unwrap();

    assert!(receipt.header_written);
    assert_eq!(read_rows(&path).unwrap()[0][0], "timestamp");
}

#[test]
fn test_absent_fields_render_as_empty_cells() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path());
    sink.export(&rating_record(None, "no scores")).unwrap();

    let rows = read_rows(sink.path_for(AnalysisKind::Rating)).unwrap();
    let header = &rows[0];
    let row = &rows[1];
    let clarity = header.iter().position(|h| h == "Clarity").unwrap();
    let verdict = header.iter().position(|h| h == "Verdict").unwrap();
    assert_eq!(row[clarity], "");
    assert_eq!(row[verdict], "no scores");
    assert_eq!(row.last().unwrap(), "input, with \"quotes\"\nand a newline");
}

#[test]
fn test_unwritable_destination_is_an_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let sink = CsvSink::new(blocker.join("exports"));

    let err = sink.export(&rating_record(Some(1), "x")).unwrap_err();

    assert!(err.to_string().contains("not-a-dir"));
}

#[test]
fn test_concurrent_appends_do_not_interleave() {
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(CsvSink::new(dir.path()));
    let long_verdict = "x".repeat(64 * 1024);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let sink = Arc::clone(&sink);
            let verdict = format!("{}-{}", i, long_verdict);
            thread::spawn(move || {
                for _ in 0..5 {
                    sink.export(&rating_record(Some(5), &verdict)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let rows = read_rows(sink.path_for(AnalysisKind::Rating)).unwrap();
    assert_eq!(rows.len(), 41);
    let width = column_count(AnalysisKind::Rating);
    for row in &rows[1..] {
        assert_eq!(row.len(), width);
        assert!(row.iter().any(|cell| cell.ends_with(&long_verdict)));
    }
}

proptest! {
    #[test]
    fn prop_row_round_trip(cells in proptest::collection::vec("[a-z,\"\n\r ;]{0,12}", 1..8)) {
        let encoded = encode_row(&cells);
        let parsed = parse_csv(&encoded);
        prop_assert_eq!(parsed.len(), 1);
        prop_assert_eq!(&parsed[0], &cells);
    }

    #[test]
    fn prop_record_round_trip(verdict in "\\PC{0,40}", input in "(?s).{0,40}") {
        let mut record = rating_record(Some(9), &verdict);
        record.original_input = input.clone();
        let expected = record_row(&record);

        let parsed = parse_csv(&encode_row(&expected));
        prop_assert_eq!(parsed.len(), 1);
        prop_assert_eq!(&parsed[0], &expected);
    }
}
