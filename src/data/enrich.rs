//! Missing-value imputation and derived features.
//!
//! Numeric columns are filled with their median, categorical and date
//! columns with their mode (first-seen value wins a tie). A column with no
//! values at all is left missing. `Total_Spend` is always recomputed from
//! the cleaned quantity and price, whatever the input carried.

use chrono::NaiveDate;

use super::model::{Dataset, EnrichedDataset, Record};
use super::schema::{Column, SemanticType};
use super::stats;

/// Clean a raw dataset and compute its derived columns.
pub fn enrich(dataset: &Dataset) -> EnrichedDataset {
    let mut records = dataset.records.clone();

    for column in Column::REQUIRED {
        match column.semantic_type() {
            SemanticType::Integer | SemanticType::Numeric => impute_median(&mut records, column),
            SemanticType::Categorical => impute_mode(&mut records, column),
            SemanticType::Date => impute_date_mode(&mut records),
        }
    }

    for record in &mut records {
        record.total_spend = record.computed_spend();
    }

    EnrichedDataset::from_cleaned(records)
}

fn impute_median(records: &mut [Record], column: Column) {
    let present: Vec<f64> = records.iter().filter_map(|r| r.numeric(column)).collect();
    let Some(fill) = stats::median(&present) else {
        if !records.is_empty() {
            log::warn!("Column {column} has no values; leaving it missing");
        }
        return;
    };

    let mut filled = 0usize;
    for slot in records.iter_mut().filter_map(|r| r.numeric_slot(column)) {
        if slot.is_none() {
            *slot = Some(fill);
            filled += 1;
        }
    }
    if filled > 0 {
        log::debug!("Imputed {filled} missing {column} values with median {fill}");
    }
}

fn impute_mode(records: &mut [Record], column: Column) {
    let fill = stats::mode(records.iter().filter_map(|r| r.text(column)).map(str::to_string));
    let Some(fill) = fill else {
        if !records.is_empty() {
            log::warn!("Column {column} has no values; leaving it missing");
        }
        return;
    };

    let mut filled = 0usize;
    for slot in records.iter_mut().filter_map(|r| r.text_slot(column)) {
        if slot.is_none() {
            *slot = Some(fill.clone());
            filled += 1;
        }
    }
    if filled > 0 {
        log::debug!("Imputed {filled} missing {column} values with mode '{fill}'");
    }
}

fn impute_date_mode(records: &mut [Record]) {
    let fill: Option<NaiveDate> = stats::mode(records.iter().filter_map(|r| r.purchase_date));
    let Some(fill) = fill else {
        return;
    };
    for record in records.iter_mut().filter(|r| r.purchase_date.is_none()) {
        record.purchase_date = Some(fill);
    }
}
