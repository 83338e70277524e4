use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::data::aggregate::{aggregate, Aggregations};
use crate::data::enrich::enrich;
use crate::data::filter::{apply_filters, FilterDimension, FilterSelection};
use crate::data::model::{Dataset, EnrichedDataset};

// ---------------------------------------------------------------------------
// Analysis session
// ---------------------------------------------------------------------------

/// One analyst's working state, independent of rendering.
///
/// Owned by the caller; sessions share nothing, so several can run side by
/// side.
pub struct AnalysisSession {
    config: AnalysisConfig,

    /// Cleaned table (None until a dataset is supplied).
    dataset: Option<EnrichedDataset>,

    /// Current category / discount selections.
    filters: FilterSelection,

    /// Aggregations of the filtered table. Replaced wholesale on every
    /// recompute.
    results: Arc<Aggregations>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            dataset: None,
            filters: FilterSelection::default(),
            results: Arc::new(Aggregations::empty()),
            status_message: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The full enriched table, unfiltered.
    pub fn dataset(&self) -> Option<&EnrichedDataset> {
        self.dataset.as_ref()
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    /// Snapshot of the current aggregations. Later recomputes never touch a
    /// snapshot already handed out.
    pub fn results(&self) -> Arc<Aggregations> {
        Arc::clone(&self.results)
    }

    /// Replace the dataset with a new raw table: re-clean it from scratch,
    /// select every category and flag, and recompute.
    pub fn set_dataset(&mut self, raw: &Dataset) {
        let enriched = enrich(raw);
        self.filters = FilterSelection::all(&enriched);
        log::info!(
            "Dataset replaced: {} rows, {} categories",
            enriched.len(),
            self.filters.categories.len()
        );
        self.dataset = Some(enriched);
        self.status_message = None;
        self.recompute();
    }

    /// Toggle a single value in one dimension.
    pub fn toggle_filter_value(&mut self, dimension: FilterDimension, value: &str) {
        let selected = self.filters.values_mut(dimension);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.recompute();
    }

    /// Select all values of a dimension present in the dataset.
    pub fn select_all(&mut self, dimension: FilterDimension) {
        if let Some(ds) = &self.dataset {
            let all = FilterSelection::all(ds);
            *self.filters.values_mut(dimension) = all.values(dimension).clone();
            self.recompute();
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dimension: FilterDimension) {
        self.filters.values_mut(dimension).clear();
        self.recompute();
    }

    /// Distinct values of a dimension in the loaded dataset.
    pub fn options(&self, dimension: FilterDimension) -> Vec<String> {
        match (&self.dataset, dimension) {
            (Some(ds), FilterDimension::Category) => ds.categories(),
            (Some(ds), FilterDimension::Discount) => ds.discount_flags(),
            (None, _) => Vec::new(),
        }
    }

    /// Re-run filtering and aggregation on the cached enriched table.
    pub fn recompute(&mut self) {
        let results = match &self.dataset {
            Some(ds) => aggregate(&apply_filters(ds, &self.filters), &self.config),
            None => Aggregations::empty(),
        };
        log::debug!("Recomputed aggregations over {} rows", results.row_count);
        self.results = Arc::new(results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn raw() -> Dataset {
        let rows = [
            ("Clothing", "Yes", 2.0, 1000.0),
            ("Electronics", "No", 1.0, 5000.0),
            ("Clothing", "No", 1.0, 500.0),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|&(c, d, q, p)| Record {
                    category: Some(c.into()),
                    discount: Some(d.into()),
                    quantity: Some(q),
                    price: Some(p),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn new_dataset_selects_everything() {
        let mut s = AnalysisSession::default();
        assert_eq!(s.results().row_count, 0);
        s.set_dataset(&raw());
        assert_eq!(s.results().row_count, 3);
        assert_eq!(s.results().total_revenue, 7500.0);
        assert_eq!(s.options(FilterDimension::Category), vec!["Clothing", "Electronics"]);
    }

    #[test]
    fn toggling_recomputes_without_touching_old_snapshot() {
        let mut s = AnalysisSession::default();
        s.set_dataset(&raw());
        let before = s.results();
        s.toggle_filter_value(FilterDimension::Category, "Electronics");
        assert_eq!(before.total_revenue, 7500.0);
        assert_eq!(s.results().total_revenue, 2500.0);
        s.toggle_filter_value(FilterDimension::Category, "Electronics");
        assert_eq!(s.results().total_revenue, 7500.0);
    }

    #[test]
    fn select_none_shows_nothing() {
        let mut s = AnalysisSession::default();
        s.set_dataset(&raw());
        s.select_none(FilterDimension::Discount);
        assert_eq!(s.results().row_count, 0);
        assert_eq!(s.results().average_spend, None);
        s.select_all(FilterDimension::Discount);
        assert_eq!(s.results().row_count, 3);
    }

    #[test]
    fn config_threshold_drives_high_income_revenue() {
        let config = AnalysisConfig {
            high_income_threshold: 45_000.0,
            ..AnalysisConfig::default()
        };
        let mut s = AnalysisSession::new(config);
        let mut data = raw();
        for (r, income) in data.records.iter_mut().zip([50_000.0, 45_000.0, 90_000.0]) {
            r.income = Some(income);
        }
        s.set_dataset(&data);
        assert_eq!(s.config().high_income_threshold, 45_000.0);
        assert_eq!(s.results().high_income_revenue, 2500.0);
    }

    #[test]
    fn replacement_without_total_spend_is_enriched() {
        let mut s = AnalysisSession::default();
        s.set_dataset(&raw());
        let mut replacement = raw();
        replacement.records.truncate(1);
        replacement.records[0].price = None;
        replacement.records.push(Record {
            category: Some("Groceries".into()),
            discount: None,
            quantity: Some(4.0),
            price: Some(50.0),
            ..Default::default()
        });
        s.set_dataset(&replacement);

        let ds = s.dataset().unwrap();
        assert!(ds.records().iter().all(|r| r.total_spend.is_some()));
        // price median of [50] fills the first row, discount mode fills the second
        assert_eq!(ds.records()[0].total_spend, Some(100.0));
        assert_eq!(ds.records()[1].discount.as_deref(), Some("Yes"));
        assert_eq!(s.results().total_revenue, 300.0);
        assert_eq!(s.options(FilterDimension::Category), vec!["Clothing", "Groceries"]);
    }
}
