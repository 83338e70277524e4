//! Rusty Basket: exploratory analysis of customer purchase behaviour.
//!
//! The library holds the pipeline shared by the dashboard and the batch
//! report: load a customer table, clean and enrich it, filter it by product
//! category and discount flag, and compute the KPIs and chart inputs.

pub mod config;
pub mod data;
pub mod report;
pub mod state;

pub use config::AnalysisConfig;
pub use data::aggregate::{aggregate, Aggregations, CorrelationMatrix};
pub use data::enrich::enrich;
pub use data::filter::{apply_filters, FilterDimension, FilterSelection};
pub use data::loader::{load_csv_reader, load_file, load_file_detailed, CellIssue, LoadError};
pub use data::model::{CellValue, Dataset, EnrichedDataset, Record};
pub use data::schema::{Column, SemanticType};
pub use state::AnalysisSession;
