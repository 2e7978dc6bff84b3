use super::*;
use tempfile::TempDir;

#[test]
fn test_header_only_table_is_empty() {
    let table = ValidationTable::from_reader("Rule ID,Compliance\n".as_bytes()).unwrap();

    assert!(table.is_empty());
    assert_eq!(table.headers(), ["Rule ID", "Compliance"]);
}

#[test]
fn test_markdown_rendering() {
    let csv = "Rule ID,Count\nAwsSolutions-S1,2\nAwsSolutions-S10,12\n";
    let table = ValidationTable::from_reader(csv.as_bytes()).unwrap();

    let expected = "\
|     | Rule ID          | Count |
|----:|:-----------------|------:|
|   0 | AwsSolutions-S1  |     2 |
|   1 | AwsSolutions-S10 |    12 |";

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.to_markdown(), expected);
}

#[test]
fn test_pipes_in_cells_are_escaped() {
    let csv = "Finding\n\"a|b\"\n";
    let table = ValidationTable::from_reader(csv.as_bytes()).unwrap();

    assert!(table.to_markdown().contains("a\\|b"));
}

#[test]
fn test_short_rows_render_empty_cells() {
    let csv = "A,B\nx,\n";
    let table = ValidationTable::from_reader(csv.as_bytes()).unwrap();

    let markdown = table.to_markdown();
    let last_line = markdown.lines().last().unwrap();
    assert_eq!(last_line, "|   0 | x   |     |");
}

#[test]
fn test_ragged_csv_is_an_error() {
    let csv = "A,B\n1,2,3\n";

    assert!(ValidationTable::from_reader(csv.as_bytes()).is_err());
}

#[test]
fn test_from_path_reports_file_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "A,B\n1,2,3\n").unwrap();

    let err = ValidationTable::from_path(&path).unwrap_err();

    assert!(err.to_string().contains("broken.csv"));
}
