//! End-to-end tests: file on disk → load → enrich → filter → aggregate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_basket::report::Report;
use rusty_basket::{
    aggregate, apply_filters, enrich, load_file, load_file_detailed, AnalysisConfig,
    AnalysisSession, Column, FilterDimension, FilterSelection, LoadError,
};
use tempfile::TempDir;

const HEADER: &str =
    "Customer_ID,Age,Gender,Income,Product_Category,Quantity,Price,Discount_Applied,Purchase_Date";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// The three-row basket used throughout: Clothing/Yes, Electronics/No,
/// Clothing/No.
fn basket_csv(dir: &TempDir) -> PathBuf {
    let body = [
        HEADER,
        "1,34,Male,72000,Clothing,2,1000,Yes,2023-01-05",
        "2,51,Female,41000,Electronics,1,5000,No,2023-02-11",
        "3,27,Female,58000,Clothing,1,500,No,2023-03-20",
    ]
    .join("\n");
    write_file(dir, "basket.csv", &body)
}

fn spends(path: &Path) -> Vec<f64> {
    let raw = load_file(path).unwrap();
    enrich(&raw).spend_values().collect()
}

#[test]
fn test_end_to_end_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = basket_csv(&dir);

    let raw = load_file(&path).unwrap();
    assert_eq!(raw.len(), 3);

    let enriched = enrich(&raw);
    assert_eq!(
        enriched.spend_values().collect::<Vec<_>>(),
        vec![2000.0, 5000.0, 500.0]
    );

    let clothing = FilterSelection::new(["Clothing"], ["Yes", "No"]);
    let agg = aggregate(&apply_filters(&enriched, &clothing), &AnalysisConfig::default());

    assert_eq!(agg.row_count, 2);
    assert_eq!(agg.total_revenue, 2500.0);
    assert_eq!(agg.revenue_by_category, vec![("Clothing".to_string(), 2500.0)]);
    assert_eq!(agg.discount_revenue, 2000.0);
    assert_eq!(agg.average_spend, Some(1250.0));
    // Only the 72000 earner clears the default threshold.
    assert_eq!(agg.high_income_revenue, 2000.0);
}

#[test]
fn test_missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let body = "Customer_ID,Age,Gender,Income,Product_Category,Quantity,Price,Discount_Applied\n\
                1,34,Male,72000,Clothing,2,1000,Yes\n";
    let path = write_file(&dir, "no_date.csv", body);

    match load_file(&path) {
        Err(LoadError::MissingColumn { column }) => assert_eq!(column, "Purchase_Date"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn test_unparseable_cells_become_missing_then_imputed() {
    let dir = TempDir::new().unwrap();
    let body = [
        HEADER,
        "1,30,Male,50000,Books,1,100,No,2023-01-01",
        "2,abc,Female,,Books,3,200,Yes,not-a-date",
        "3,50,,70000,Toys,2,300,NA,2023-01-01",
    ]
    .join("\n");
    let path = write_file(&dir, "messy.csv", &body);

    let (raw, issues) = load_file_detailed(&path).unwrap();
    let bad: Vec<_> = issues.iter().map(|i| (i.row, i.column)).collect();
    assert_eq!(bad, vec![(1, Column::Age), (1, Column::PurchaseDate)]);

    let enriched = enrich(&raw);
    let second = &enriched.records()[1];
    assert_eq!(second.age, Some(40.0));
    assert_eq!(second.income, Some(60000.0));
    assert_eq!(second.purchase_date, enriched.records()[0].purchase_date);

    let third = &enriched.records()[2];
    assert_eq!(third.gender.as_deref(), Some("Male"));
    assert_eq!(third.discount.as_deref(), Some("No"));
}

#[test]
fn test_enrichment_is_idempotent_through_files() {
    let dir = TempDir::new().unwrap();
    let path = basket_csv(&dir);

    let once = enrich(&load_file(&path).unwrap());
    let twice = enrich(once.as_dataset());
    assert_eq!(
        once.spend_values().collect::<Vec<_>>(),
        twice.spend_values().collect::<Vec<_>>()
    );
}

#[test]
fn test_empty_category_selection_yields_no_data() {
    let dir = TempDir::new().unwrap();
    let enriched = enrich(&load_file(&basket_csv(&dir)).unwrap());

    let selection = FilterSelection::new(Vec::<String>::new(), ["Yes", "No"]);
    let agg = aggregate(&apply_filters(&enriched, &selection), &AnalysisConfig::default());

    assert_eq!(agg.row_count, 0);
    assert_eq!(agg.total_revenue, 0.0);
    assert_eq!(agg.average_spend, None);
    assert!(agg.revenue_by_category.is_empty());
}

#[test]
fn test_json_and_csv_agree() {
    let dir = TempDir::new().unwrap();
    let json = r#"[
        {"Customer_ID": 1, "Age": 34, "Gender": "Male", "Income": 72000,
         "Product_Category": "Clothing", "Quantity": 2, "Price": 1000,
         "Discount_Applied": "Yes", "Purchase_Date": "2023-01-05"},
        {"Customer_ID": 2, "Age": 51, "Gender": "Female", "Income": 41000,
         "Product_Category": "Electronics", "Quantity": 1, "Price": 5000,
         "Discount_Applied": "No", "Purchase_Date": "2023-02-11"},
        {"Customer_ID": 3, "Age": 27, "Gender": "Female", "Income": 58000,
         "Product_Category": "Clothing", "Quantity": 1, "Price": 500,
         "Discount_Applied": "No", "Purchase_Date": "2023-03-20", "Total_Spend": 1}
    ]"#;
    let json_path = write_file(&dir, "basket.json", json);

    assert_eq!(spends(&json_path), spends(&basket_csv(&dir)));
}

fn basket_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("Customer_ID", DataType::Int64, false),
        Field::new("Age", DataType::Int64, true),
        Field::new("Gender", DataType::Utf8, true),
        Field::new("Income", DataType::Int64, true),
        Field::new("Product_Category", DataType::Utf8, true),
        Field::new("Quantity", DataType::Int64, true),
        Field::new("Price", DataType::Float64, true),
        Field::new("Discount_Applied", DataType::Utf8, true),
        Field::new("Purchase_Date", DataType::Utf8, true),
    ]))
}

fn write_parquet(path: &Path, columns: Vec<ArrayRef>) {
    let schema = basket_schema();
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(fs::File::create(path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

#[test]
fn test_parquet_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("basket.parquet");

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3])),
        Arc::new(Int64Array::from(vec![Some(34), Some(51), None])),
        Arc::new(StringArray::from(vec!["Male", "Female", "Female"])),
        Arc::new(Int64Array::from(vec![72000, 41000, 58000])),
        Arc::new(StringArray::from(vec!["Clothing", "Electronics", "Clothing"])),
        Arc::new(Int64Array::from(vec![2, 1, 1])),
        Arc::new(Float64Array::from(vec![Some(1000.0), Some(5000.0), None])),
        Arc::new(StringArray::from(vec!["Yes", "No", "No"])),
        Arc::new(StringArray::from(vec!["2023-01-05", "2023-02-11", "2023-03-20"])),
    ];
    write_parquet(&path, columns);

    let enriched = enrich(&load_file(&path).unwrap());
    let third = &enriched.records()[2];
    // Median of 34 and 51; median of 1000 and 5000.
    assert_eq!(third.age, Some(42.5));
    assert_eq!(third.price, Some(3000.0));
    assert_eq!(third.total_spend, Some(3000.0));
}

#[test]
fn test_zero_row_parquet_keeps_its_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.parquet");

    let schema = basket_schema();
    let writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
    writer.close().unwrap();

    let raw = load_file(&path).unwrap();
    assert!(raw.is_empty());
    let agg = aggregate(&enrich(&raw), &AnalysisConfig::default());
    assert_eq!(agg.row_count, 0);
    assert_eq!(agg.average_spend, None);
}

#[test]
fn test_negative_quantity_is_imputed_not_summed() {
    let dir = TempDir::new().unwrap();
    let body = [
        HEADER,
        "1,30,Male,50000,Books,-3,100,No,2023-01-01",
        "2,40,Female,50000,Books,2,100,No,2023-01-02",
    ]
    .join("\n");
    let path = write_file(&dir, "negative.csv", &body);

    let (raw, issues) = load_file_detailed(&path).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].column, Column::Quantity);

    let enriched = enrich(&raw);
    assert_eq!(enriched.records()[0].quantity, Some(2.0));
    let agg = aggregate(&enriched, &AnalysisConfig::default());
    assert_eq!(agg.total_revenue, 400.0);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "basket.xlsx", "");
    assert!(matches!(
        load_file(&path),
        Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
    ));
}

#[test]
fn test_session_replacement_recomputes_everything() {
    let dir = TempDir::new().unwrap();
    let mut session = AnalysisSession::default();
    session.set_dataset(&load_file(&basket_csv(&dir)).unwrap());
    session.toggle_filter_value(FilterDimension::Category, "Electronics");

    let before = session.results();
    assert_eq!(before.total_revenue, 2500.0);

    let body = [
        HEADER,
        "10,40,Male,90000,Groceries,4,25,Yes,2024-05-01",
        "11,22,Female,30000,Groceries,,50,No,2024-05-02",
    ]
    .join("\n");
    let replacement = write_file(&dir, "replacement.csv", &body);
    session.set_dataset(&load_file(&replacement).unwrap());

    let after = session.results();
    assert_eq!(session.options(FilterDimension::Category), vec!["Groceries"]);
    // Quantity imputed with the median (4) before spend is computed.
    assert_eq!(after.total_revenue, 100.0 + 200.0);
    assert_eq!(after.revenue_by_category, vec![("Groceries".to_string(), 300.0)]);
    assert_eq!(before.total_revenue, 2500.0);
}

#[test]
fn test_report_outputs() {
    let dir = TempDir::new().unwrap();
    let raw = load_file(&basket_csv(&dir)).unwrap();
    let report = Report::build(&raw, None, &AnalysisConfig::default());

    let out = dir.path().join("visuals");
    let written = report.write_chart_tables(&out).unwrap();
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.exists(), "{} not written", path.display());
    }

    let json_path = out.join("report.json");
    report.write_json(&json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["aggregations"]["total_revenue"], 7500.0);

    let matrix = &report.aggregations.correlation_matrix;
    assert_eq!(matrix.get(Column::Quantity, Column::Quantity), Some(1.0));
}
