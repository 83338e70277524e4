//! Batch report: the aggregation set of one filtered table rendered as
//! JSON, CSV chart tables and a plain-text summary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::aggregate::{aggregate, Aggregations};
use crate::data::enrich::enrich;
use crate::data::filter::{apply_filters, FilterSelection};
use crate::data::model::Dataset;
use crate::data::schema::Column;
use crate::data::stats::{self, BoxSummary, ColumnSummary, LinearFit};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rows: usize,
    pub filtered_rows: usize,
    /// Missing cells per input column. The derived total spend is left out.
    pub missing_before_cleaning: BTreeMap<&'static str, usize>,
    pub summary: Vec<ColumnSummary>,
    pub income_spend_fit: Option<LinearFit>,
    pub discount_spend_boxes: BTreeMap<String, BoxSummary>,
    pub aggregations: Aggregations,
}

impl Report {
    /// Clean `raw`, apply `selection` (everything when `None`) and aggregate.
    pub fn build(raw: &Dataset, selection: Option<&FilterSelection>, config: &AnalysisConfig) -> Self {
        let missing_before_cleaning = raw
            .missing_counts()
            .into_iter()
            .filter(|(col, _)| *col != Column::TotalSpend)
            .map(|(col, n)| (col.name(), n))
            .collect();

        let enriched = enrich(raw);
        let selection = selection
            .cloned()
            .unwrap_or_else(|| FilterSelection::all(&enriched));
        let filtered = apply_filters(&enriched, &selection);
        let aggregations = aggregate(&filtered, config);

        let discount_spend_boxes = aggregations
            .discount_spend_distribution
            .iter()
            .filter_map(|(flag, values)| Some((flag.clone(), stats::box_summary(values)?)))
            .collect();

        Report {
            rows: enriched.len(),
            filtered_rows: filtered.len(),
            missing_before_cleaning,
            summary: stats::describe(enriched.as_dataset()),
            income_spend_fit: stats::linear_fit(&aggregations.income_spend_regression_input),
            discount_spend_boxes,
            aggregations,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("writing {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))
    }

    /// Write one CSV per chart into `dir` and return their paths.
    pub fn write_chart_tables(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let agg = &self.aggregations;
        let mut written = Vec::new();

        let path = dir.join("category_revenue.csv");
        let mut w = csv::Writer::from_path(&path)?;
        w.write_record([Column::Category.name(), "Revenue"])?;
        for (cat, revenue) in &agg.revenue_by_category {
            w.write_record([cat.clone(), revenue.to_string()])?;
        }
        w.flush()?;
        written.push(path);

        for (name, x, pairs) in [
            ("age_vs_spend.csv", Column::Age, &agg.age_spend_pairs),
            ("income_vs_spend.csv", Column::Income, &agg.income_spend_regression_input),
        ] {
            let path = dir.join(name);
            let mut w = csv::Writer::from_path(&path)?;
            w.write_record([x.name(), Column::TotalSpend.name()])?;
            for (a, b) in pairs {
                w.write_record([a.to_string(), b.to_string()])?;
            }
            w.flush()?;
            written.push(path);
        }

        let path = dir.join("discount_impact.csv");
        let mut w = csv::Writer::from_path(&path)?;
        w.write_record([Column::Discount.name(), Column::TotalSpend.name()])?;
        for (flag, values) in &agg.discount_spend_distribution {
            for v in values {
                w.write_record([flag.clone(), v.to_string()])?;
            }
        }
        w.flush()?;
        written.push(path);

        let path = dir.join("correlation.csv");
        let mut w = csv::Writer::from_path(&path)?;
        let m = &agg.correlation_matrix;
        let mut header = vec![String::new()];
        header.extend(m.columns.iter().map(|c| c.to_string()));
        w.write_record(&header)?;
        for (name, row) in m.columns.iter().zip(&m.values) {
            let mut line = vec![name.to_string()];
            line.extend(row.iter().map(|v| v.map(|r| format!("{r:.4}")).unwrap_or_default()));
            w.write_record(&line)?;
        }
        w.flush()?;
        written.push(path);

        Ok(written)
    }

    /// Human-readable summary with the headline KPIs and insights.
    pub fn render_text(&self) -> String {
        let agg = &self.aggregations;
        let mut out = String::new();

        let _ = writeln!(out, "Customer Purchase Behaviour Report");
        let _ = writeln!(out, "==================================");
        let _ = writeln!(out, "Rows: {} ({} after filters)", self.rows, self.filtered_rows);

        let gaps: Vec<String> = self
            .missing_before_cleaning
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(col, n)| format!("{col}={n}"))
            .collect();
        if gaps.is_empty() {
            let _ = writeln!(out, "Missing values: none");
        } else {
            let _ = writeln!(out, "Missing values (imputed): {}", gaps.join(", "));
        }

        let _ = writeln!(out, "\nKPIs");
        let _ = writeln!(out, "  Total Revenue:       {}", format_amount(agg.total_revenue));
        let _ = writeln!(
            out,
            "  Average Spend:       {}",
            agg.average_spend.map(format_amount).unwrap_or_else(|| "no data".into())
        );
        let _ = writeln!(out, "  High Income Revenue: {}", format_amount(agg.high_income_revenue));
        let _ = writeln!(out, "  Discount Revenue:    {}", format_amount(agg.discount_revenue));

        let _ = writeln!(out, "\nRevenue by Product Category");
        for (cat, revenue) in &agg.revenue_by_category {
            let _ = writeln!(out, "  {cat:<14} {}", format_amount(*revenue));
        }

        let _ = writeln!(out, "\nInsights");
        if let Some(r) = agg.correlation_matrix.get(Column::Income, Column::TotalSpend) {
            let direction = if r >= 0.0 { "positively" } else { "negatively" };
            let _ = writeln!(out, "  Income {direction} correlates with spending (r = {r:.2}).");
        }
        if let Some(fit) = &self.income_spend_fit {
            let _ = writeln!(
                out,
                "  Each extra 10,000 of income adds about {} to spend.",
                format_amount(fit.slope * 10_000.0)
            );
        }
        if let (Some((top, top_rev)), Some((low, low_rev))) =
            (agg.revenue_by_category.first(), agg.revenue_by_category.last())
        {
            if top != low {
                let _ = writeln!(
                    out,
                    "  {top} leads revenue ({}) while {low} trails ({}).",
                    format_amount(*top_rev),
                    format_amount(*low_rev)
                );
            }
        }
        let medians: Vec<String> = self
            .discount_spend_boxes
            .iter()
            .map(|(flag, b)| format!("{flag}: {}", format_amount(b.median)))
            .collect();
        if !medians.is_empty() {
            let _ = writeln!(out, "  Median spend by discount flag: {}.", medians.join(", "));
        }

        out
    }
}

/// `1234567.8` → `"₹1,234,568"`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}
