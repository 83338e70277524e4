//! Analysis parameters, read from an optional JSON file.
//!
//! ```json
//! { "high_income_threshold": 75000, "default_dataset": "data/customers.parquet" }
//! ```
//!
//! Omitted keys fall back to their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows with income strictly above this count toward high-income revenue.
    pub high_income_threshold: f64,
    /// Discount flag value that marks a discounted purchase.
    pub discount_flag_yes: String,
    /// Table the dashboard opens on start, when it exists.
    pub default_dataset: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_income_threshold: 60_000.0,
            discount_flag_yes: "Yes".to_string(),
            default_dataset: PathBuf::from("data/customer_data.csv"),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
