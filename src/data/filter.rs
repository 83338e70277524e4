use std::collections::BTreeSet;

use super::model::EnrichedDataset;

// ---------------------------------------------------------------------------
// Filter selection: allowed values per filterable dimension
// ---------------------------------------------------------------------------

/// The two dimensions an analyst can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Category,
    Discount,
}

impl FilterDimension {
    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Category => "Product Category",
            FilterDimension::Discount => "Discount Applied",
        }
    }
}

/// Allowed product categories and allowed discount flags.
///
/// An empty set means nothing is allowed for that dimension, so every row is
/// excluded. It never means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub discounts: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<C, D>(categories: C, discounts: D) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        FilterSelection {
            categories: categories.into_iter().map(Into::into).collect(),
            discounts: discounts.into_iter().map(Into::into).collect(),
        }
    }

    /// Select every category and discount flag present in the dataset
    /// (i.e., show everything).
    pub fn all(dataset: &EnrichedDataset) -> Self {
        FilterSelection::new(dataset.categories(), dataset.discount_flags())
    }

    pub fn values(&self, dimension: FilterDimension) -> &BTreeSet<String> {
        match dimension {
            FilterDimension::Category => &self.categories,
            FilterDimension::Discount => &self.discounts,
        }
    }

    pub fn values_mut(&mut self, dimension: FilterDimension) -> &mut BTreeSet<String> {
        match dimension {
            FilterDimension::Category => &mut self.categories,
            FilterDimension::Discount => &mut self.discounts,
        }
    }

    /// Whether a row with these attribute values passes both dimensions.
    pub fn allows(&self, category: Option<&str>, discount: Option<&str>) -> bool {
        let category_ok = category.is_some_and(|c| self.categories.contains(c));
        let discount_ok = discount.is_some_and(|d| self.discounts.contains(d));
        category_ok && discount_ok
    }
}

/// Keep exactly the rows whose category AND discount flag are selected.
pub fn apply_filters(dataset: &EnrichedDataset, selection: &FilterSelection) -> EnrichedDataset {
    let records = dataset
        .records()
        .iter()
        .filter(|r| selection.allows(r.category.as_deref(), r.discount.as_deref()))
        .cloned()
        .collect();
    EnrichedDataset::from_cleaned(records)
}
