use std::fs;
use std::path::PathBuf;

use star_desk::csv_table::CsvTable;

#[test]
fn splits_lines_then_commas() {
    let table = CsvTable::parse("a,b\n1,2");
    assert_eq!(
        table.rows,
        vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["1".to_string(), "2".to_string()],
        ]
    );
    assert_eq!(table.header(), Some(&["a".to_string(), "b".to_string()][..]));
    assert_eq!(table.body().len(), 1);
}

#[test]
fn tolerates_crlf_and_trailing_newline() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("stars_report.csv");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");

    let table = CsvTable::parse(&raw);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1][2], "3");
    assert_eq!(table.column_count(), 3);
}

#[test]
fn quoted_commas_are_not_special() {
    let table = CsvTable::parse("name\n\"Doe, Jane\"");
    assert_eq!(table.body()[0], vec!["\"Doe".to_string(), " Jane\"".to_string()]);
    assert_eq!(table.column_count(), 2);
}

#[test]
fn empty_text_has_no_header() {
    let table = CsvTable::parse("");
    assert!(table.is_empty());
    assert!(table.header().is_none());
    assert!(table.body().is_empty());
}
