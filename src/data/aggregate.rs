//! The fixed set of KPIs and chart inputs computed from a filtered table.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::EnrichedDataset;
use super::schema::Column;
use super::stats;
use crate::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlations between the numeric columns.
///
/// `values[i][j]` is `None` when the pair has fewer than two complete
/// observations or one side is constant over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a.name())?;
        let j = self.columns.iter().position(|c| *c == b.name())?;
        self.values[i][j]
    }
}

/// Every named aggregation the KPIs and charts consume. Field names are the
/// result keys in serialized output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregations {
    /// Rows that went into the aggregation.
    pub row_count: usize,
    pub total_revenue: f64,
    /// `None` when there are no rows ("no data", not zero).
    pub average_spend: Option<f64>,
    pub high_income_revenue: f64,
    pub discount_revenue: f64,
    /// Revenue per category, highest first.
    pub revenue_by_category: Vec<(String, f64)>,
    pub age_spend_pairs: Vec<(f64, f64)>,
    pub income_spend_regression_input: Vec<(f64, f64)>,
    pub discount_spend_distribution: BTreeMap<String, Vec<f64>>,
    pub correlation_matrix: CorrelationMatrix,
}

impl Aggregations {
    /// Aggregations of an empty table.
    pub fn empty() -> Self {
        aggregate(&EnrichedDataset::default(), &AnalysisConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute the full aggregation set. Rows with a missing total spend are
/// left out of sums, means, pairs and distributions.
pub fn aggregate(dataset: &EnrichedDataset, config: &AnalysisConfig) -> Aggregations {
    let records = dataset.records();
    let spend: Vec<f64> = dataset.spend_values().collect();

    let high_income_revenue = records
        .iter()
        .filter(|r| r.income.is_some_and(|i| i > config.high_income_threshold))
        .filter_map(|r| r.total_spend)
        .sum();

    let discount_revenue = records
        .iter()
        .filter(|r| r.discount.as_deref() == Some(config.discount_flag_yes.as_str()))
        .filter_map(|r| r.total_spend)
        .sum();

    let mut discount_spend_distribution: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let (Some(flag), Some(s)) = (&r.discount, r.total_spend) {
            discount_spend_distribution
                .entry(flag.clone())
                .or_default()
                .push(s);
        }
    }

    Aggregations {
        row_count: records.len(),
        total_revenue: spend.iter().sum(),
        average_spend: stats::mean(&spend),
        high_income_revenue,
        discount_revenue,
        revenue_by_category: revenue_by_category(dataset),
        age_spend_pairs: pairs(dataset, Column::Age, Column::TotalSpend),
        income_spend_regression_input: pairs(dataset, Column::Income, Column::TotalSpend),
        discount_spend_distribution,
        correlation_matrix: correlation_matrix(dataset),
    }
}

/// Revenue per category, descending; equal revenue ordered by name.
pub fn revenue_by_category(dataset: &EnrichedDataset) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for r in dataset.records() {
        if let (Some(cat), Some(s)) = (r.category.as_deref(), r.total_spend) {
            *sums.entry(cat).or_insert(0.0) += s;
        }
    }
    let mut out: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(cat, total)| (cat.to_string(), total))
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Rows where both columns are present, as `(x, y)` pairs.
pub fn pairs(dataset: &EnrichedDataset, x: Column, y: Column) -> Vec<(f64, f64)> {
    dataset
        .records()
        .iter()
        .filter_map(|r| Some((r.numeric(x)?, r.numeric(y)?)))
        .collect()
}

/// Pearson correlation between every pair of numeric columns using
/// pairwise-complete observations.
pub fn correlation_matrix(dataset: &EnrichedDataset) -> CorrelationMatrix {
    let columns = Column::NUMERIC;
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        let present = dataset
            .records()
            .iter()
            .filter(|r| r.numeric(columns[i]).is_some())
            .count();
        if present >= 2 {
            values[i][i] = Some(1.0);
        }
        for j in (i + 1)..n {
            let r = stats::pearson(&pairs(dataset, columns[i], columns[j]));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|c| c.name()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::enrich::enrich;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::{Dataset, Record};

    fn record(category: &str, discount: &str, quantity: f64, price: f64, income: f64) -> Record {
        Record {
            customer_id: Some(1.0),
            age: Some(30.0),
            gender: Some("Male".into()),
            income: Some(income),
            category: Some(category.into()),
            quantity: Some(quantity),
            price: Some(price),
            discount: Some(discount.into()),
            purchase_date: None,
            total_spend: None,
        }
    }

    fn three_rows() -> EnrichedDataset {
        enrich(&Dataset::from_records(vec![
            record("Clothing", "Yes", 2.0, 1000.0, 70_000.0),
            record("Electronics", "No", 1.0, 5000.0, 40_000.0),
            record("Clothing", "No", 1.0, 500.0, 60_000.0),
        ]))
    }

    #[test]
    fn clothing_only_example() {
        let ds = three_rows();
        let sel = FilterSelection::new(["Clothing"], ["Yes", "No"]);
        let agg = aggregate(&apply_filters(&ds, &sel), &AnalysisConfig::default());
        assert_eq!(agg.total_revenue, 2500.0);
        assert_eq!(agg.revenue_by_category, vec![("Clothing".to_string(), 2500.0)]);
        assert_eq!(agg.discount_revenue, 2000.0);
        assert_eq!(agg.average_spend, Some(1250.0));
    }

    #[test]
    fn high_income_is_strictly_above_threshold() {
        let agg = aggregate(&three_rows(), &AnalysisConfig::default());
        // only the 70k row; the 60k row sits on the threshold
        assert_eq!(agg.high_income_revenue, 2000.0);

        let cfg = AnalysisConfig {
            high_income_threshold: 30_000.0,
            ..Default::default()
        };
        assert_eq!(aggregate(&three_rows(), &cfg).high_income_revenue, 7500.0);
    }

    #[test]
    fn category_revenue_is_descending_and_sums_to_total() {
        let agg = aggregate(&three_rows(), &AnalysisConfig::default());
        let names: Vec<&str> = agg.revenue_by_category.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Electronics", "Clothing"]);
        let sum: f64 = agg.revenue_by_category.iter().map(|(_, v)| v).sum();
        assert_eq!(sum, agg.total_revenue);
    }

    #[test]
    fn empty_selection_reports_no_data() {
        let ds = three_rows();
        let sel = FilterSelection::new(Vec::<String>::new(), ["Yes", "No"]);
        let agg = aggregate(&apply_filters(&ds, &sel), &AnalysisConfig::default());
        assert_eq!(agg.row_count, 0);
        assert_eq!(agg.total_revenue, 0.0);
        assert_eq!(agg.average_spend, None);
        assert!(agg.revenue_by_category.is_empty());
        assert!(agg.correlation_matrix.values.iter().flatten().all(Option::is_none));
        assert_eq!(Aggregations::empty(), agg);
    }

    #[test]
    fn distribution_groups_spend_by_flag() {
        let agg = aggregate(&three_rows(), &AnalysisConfig::default());
        assert_eq!(agg.discount_spend_distribution["Yes"], vec![2000.0]);
        assert_eq!(agg.discount_spend_distribution["No"], vec![5000.0, 500.0]);
        assert_eq!(agg.age_spend_pairs.len(), 3);
        assert_eq!(agg.income_spend_regression_input[1], (40_000.0, 5000.0));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let agg = aggregate(&three_rows(), &AnalysisConfig::default());
        let m = &agg.correlation_matrix;
        assert_eq!(m.columns.len(), Column::NUMERIC.len());
        for i in 0..m.columns.len() {
            assert_eq!(m.values[i][i], Some(1.0));
            for j in 0..m.columns.len() {
                match (m.values[i][j], m.values[j][i]) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-12),
                    (None, None) => {}
                    other => panic!("asymmetric cell {i},{j}: {other:?}"),
                }
            }
        }
        // age is constant across the three rows
        assert_eq!(m.get(Column::Age, Column::Income), None);
        let q_spend = m.get(Column::Quantity, Column::TotalSpend).unwrap();
        assert!((-1.0..=1.0).contains(&q_spend));
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let mut rows = vec![
            record("A", "No", 1.0, 10.0, 1.0),
            record("A", "No", 2.0, 20.0, 2.0),
            record("A", "No", 3.0, 30.0, 3.0),
        ];
        // an age column present on only two rows still correlates on those two
        rows[0].age = Some(10.0);
        rows[1].age = Some(20.0);
        rows[2].age = None;
        let raw = Dataset::from_records(rows);
        // skip imputation to keep the gap
        let ds = EnrichedDataset::from_cleaned(
            raw.records
                .into_iter()
                .map(|mut r| {
                    r.total_spend = r.computed_spend();
                    r
                })
                .collect(),
        );
        let m = correlation_matrix(&ds);
        assert_eq!(m.get(Column::Age, Column::Income), Some(1.0));
        assert_eq!(m.get(Column::Income, Column::Quantity), Some(1.0));
    }
}
