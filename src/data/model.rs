use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use super::schema::{Column, SemanticType};

// ---------------------------------------------------------------------------
// CellValue – a single cell, read generically by column
// ---------------------------------------------------------------------------

/// A dynamically-typed view of one cell, used by table views and exports.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Number(v) => write!(f, "{v:.2}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One customer transaction.
///
/// Integer-typed attributes are stored as `f64` so that an imputed median
/// (which may fall between two integers) fits the same slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub customer_id: Option<f64>,
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub income: Option<f64>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub discount: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    /// Derived. Only trustworthy on rows of an [`EnrichedDataset`].
    pub total_spend: Option<f64>,
}

impl Record {
    /// Value of a numeric column, `None` when missing or not numeric.
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::CustomerId => self.customer_id,
            Column::Age => self.age,
            Column::Income => self.income,
            Column::Quantity => self.quantity,
            Column::Price => self.price,
            Column::TotalSpend => self.total_spend,
            _ => None,
        }
    }

    /// Mutable slot of a numeric column.
    pub fn numeric_slot(&mut self, column: Column) -> Option<&mut Option<f64>> {
        match column {
            Column::CustomerId => Some(&mut self.customer_id),
            Column::Age => Some(&mut self.age),
            Column::Income => Some(&mut self.income),
            Column::Quantity => Some(&mut self.quantity),
            Column::Price => Some(&mut self.price),
            Column::TotalSpend => Some(&mut self.total_spend),
            _ => None,
        }
    }

    /// Value of a categorical column.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Gender => self.gender.as_deref(),
            Column::Category => self.category.as_deref(),
            Column::Discount => self.discount.as_deref(),
            _ => None,
        }
    }

    /// Mutable slot of a categorical column.
    pub fn text_slot(&mut self, column: Column) -> Option<&mut Option<String>> {
        match column {
            Column::Gender => Some(&mut self.gender),
            Column::Category => Some(&mut self.category),
            Column::Discount => Some(&mut self.discount),
            _ => None,
        }
    }

    /// Generic read of any column.
    pub fn cell(&self, column: Column) -> CellValue {
        let value = match column.semantic_type() {
            SemanticType::Integer | SemanticType::Numeric => {
                self.numeric(column).map(CellValue::Number)
            }
            SemanticType::Categorical => self
                .text(column)
                .map(|s| CellValue::Text(s.to_string())),
            SemanticType::Date => self.purchase_date.map(CellValue::Date),
        };
        value.unwrap_or(CellValue::Missing)
    }

    /// Store a generically typed value into the matching slot. Values whose
    /// shape does not fit the column are ignored.
    pub fn set(&mut self, column: Column, value: CellValue) {
        match value {
            CellValue::Number(v) => {
                if let Some(slot) = self.numeric_slot(column) {
                    *slot = Some(v);
                }
            }
            CellValue::Text(s) => {
                if let Some(slot) = self.text_slot(column) {
                    *slot = Some(s);
                }
            }
            CellValue::Date(d) if column == Column::PurchaseDate => {
                self.purchase_date = Some(d);
            }
            CellValue::Date(_) | CellValue::Missing => {}
        }
    }

    /// `quantity × price`, missing when either factor is missing.
    pub fn computed_spend(&self) -> Option<f64> {
        Some(self.quantity? * self.price?)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the raw table as loaded
// ---------------------------------------------------------------------------

/// An ordered collection of records straight from a source, no cleaning
/// guarantees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-missing values of a categorical column in order of first
    /// appearance.
    pub fn distinct(&self, column: Column) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.text(column))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Number of missing cells per column, in display order.
    pub fn missing_counts(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .into_iter()
            .map(|col| {
                let n = self
                    .records
                    .iter()
                    .filter(|r| r.cell(col).is_missing())
                    .count();
                (col, n)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// EnrichedDataset – cleaned table with current total spend
// ---------------------------------------------------------------------------

/// A dataset that went through imputation and had its total spend
/// recomputed. Only `enrich` and `apply_filters` construct one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedDataset {
    inner: Dataset,
}

impl EnrichedDataset {
    pub(crate) fn from_cleaned(records: Vec<Record>) -> Self {
        EnrichedDataset {
            inner: Dataset { records },
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.inner.records
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrow as a plain dataset (e.g. to enrich again or export).
    pub fn as_dataset(&self) -> &Dataset {
        &self.inner
    }

    /// Product categories present, first appearance first.
    pub fn categories(&self) -> Vec<String> {
        self.inner.distinct(Column::Category)
    }

    /// Discount flag values present, first appearance first.
    pub fn discount_flags(&self) -> Vec<String> {
        self.inner.distinct(Column::Discount)
    }

    /// Non-missing total spend values in row order.
    pub fn spend_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.inner.records.iter().filter_map(|r| r.total_spend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, discount: &str) -> Record {
        Record {
            category: Some(category.to_string()),
            discount: Some(discount.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn distinct_keeps_first_appearance_order() {
        let ds = Dataset::from_records(vec![
            record("Groceries", "No"),
            record("Clothing", "Yes"),
            record("Groceries", "Yes"),
            Record::default(),
        ]);
        assert_eq!(ds.distinct(Column::Category), vec!["Groceries", "Clothing"]);
        assert_eq!(ds.distinct(Column::Discount), vec!["No", "Yes"]);
    }

    #[test]
    fn computed_spend_needs_both_factors() {
        let mut r = Record {
            quantity: Some(3.0),
            price: Some(250.0),
            ..Default::default()
        };
        assert_eq!(r.computed_spend(), Some(750.0));
        r.price = None;
        assert_eq!(r.computed_spend(), None);
    }

    #[test]
    fn cell_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.50");
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(CellValue::Date(d).to_string(), "2024-03-09");
        assert_eq!(CellValue::Missing.to_string(), "<missing>");
    }

    #[test]
    fn missing_counts_cover_every_column() {
        let ds = Dataset::from_records(vec![record("Clothing", "Yes"), Record::default()]);
        let counts = ds.missing_counts();
        assert_eq!(counts.len(), Column::ALL.len());
        let category = counts.iter().find(|(c, _)| *c == Column::Category).unwrap();
        assert_eq!(category.1, 1);
        let age = counts.iter().find(|(c, _)| *c == Column::Age).unwrap();
        assert_eq!(age.1, 2);
    }
}
