/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed, may contain gaps)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  enrich   │  median / mode imputation, Total_Spend → EnrichedDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category × discount selection → filtered EnrichedDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, grouped sums, pairs, correlation matrix
///   └───────────┘
/// ```

pub mod aggregate;
pub mod enrich;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
