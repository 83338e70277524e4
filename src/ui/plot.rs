use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};
use rusty_basket::data::stats::{box_summary, linear_fit};
use rusty_basket::report::format_amount;
use rusty_basket::{Aggregations, Column, CorrelationMatrix};

use crate::color::{diverging, ColorMap};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Chart builders: aggregation result → plot item, no UI access
// ---------------------------------------------------------------------------

pub fn scatter_points(pairs: &[(f64, f64)], name: String) -> Points {
    let points: PlotPoints = pairs.iter().map(|&(x, y)| [x, y]).collect();
    Points::new(points)
        .name(name)
        .radius(2.5)
        .color(Color32::LIGHT_BLUE)
}

/// Least-squares trend line spanning the observed x range.
pub fn regression_line(pairs: &[(f64, f64)]) -> Option<Line> {
    let fit = linear_fit(pairs)?;
    let min = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let points: PlotPoints = vec![[min, fit.predict(min)], [max, fit.predict(max)]].into();
    Some(
        Line::new(points)
            .name(format!("trend (slope {:.4})", fit.slope))
            .color(Color32::from_rgb(230, 120, 40))
            .width(2.0),
    )
}

pub fn category_bars(agg: &Aggregations, colors: Option<&ColorMap>) -> BarChart {
    let bars = agg
        .revenue_by_category
        .iter()
        .enumerate()
        .map(|(i, (cat, revenue))| {
            let fill = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(cat));
            Bar::new(i as f64, *revenue).name(cat).fill(fill).width(0.6)
        })
        .collect();
    BarChart::new(bars).name("Revenue")
}

pub fn discount_boxes(agg: &Aggregations) -> BoxPlot {
    let boxes = agg
        .discount_spend_distribution
        .iter()
        .enumerate()
        .filter_map(|(i, (flag, values))| {
            let b = box_summary(values)?;
            let spread = BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker);
            Some(BoxElem::new(i as f64, spread).name(flag).box_width(0.5))
        })
        .collect();
    BoxPlot::new(boxes).name("Total spend")
}

// ---------------------------------------------------------------------------
// Dashboard tab
// ---------------------------------------------------------------------------

/// KPI row plus the five charts for the current aggregation snapshot.
pub fn dashboard(
    ui: &mut Ui,
    agg: &Aggregations,
    colors: Option<&ColorMap>,
    high_income_threshold: f64,
) {
    ui.heading("Executive Summary");
    ui.label("Analyze customer behavior across income, age, category, and discount factors.");
    ui.add_space(6.0);

    let average = agg
        .average_spend
        .map(format_amount)
        .unwrap_or_else(|| "no data".to_string());
    let high_income_label = format!(
        "High Income Revenue (> {})",
        format_amount(high_income_threshold)
    );
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Total Revenue", &format_amount(agg.total_revenue));
        metric(&mut cols[1], "Average Spend", &average);
        metric(&mut cols[2], &high_income_label, &format_amount(agg.high_income_revenue));
        metric(&mut cols[3], "Discount Revenue", &format_amount(agg.discount_revenue));
    });
    ui.separator();

    if agg.row_count == 0 {
        ui.label(RichText::new("No rows match the current filters.").italics());
        return;
    }

    ui.strong("Age vs Total Spend");
    Plot::new("age_vs_spend")
        .height(CHART_HEIGHT)
        .x_axis_label(Column::Age.name())
        .y_axis_label(Column::TotalSpend.name())
        .show(ui, |plot_ui| {
            plot_ui.points(scatter_points(&agg.age_spend_pairs, "customers".into()));
        });

    ui.strong("Income vs Total Spend");
    Plot::new("income_vs_spend")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(Column::Income.name())
        .y_axis_label(Column::TotalSpend.name())
        .show(ui, |plot_ui| {
            plot_ui.points(scatter_points(&agg.income_spend_regression_input, "customers".into()));
            if let Some(line) = regression_line(&agg.income_spend_regression_input) {
                plot_ui.line(line);
            }
        });

    ui.strong("Revenue by Product Category");
    let names: Vec<String> = agg.revenue_by_category.iter().map(|(c, _)| c.clone()).collect();
    Plot::new("category_revenue")
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark, _range| label_at(&names, mark.value))
        .y_axis_label("Revenue")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(category_bars(agg, colors));
        });

    ui.strong("Discount Impact on Spending");
    let flags: Vec<String> = agg.discount_spend_distribution.keys().cloned().collect();
    Plot::new("discount_impact")
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark, _range| label_at(&flags, mark.value))
        .y_axis_label(Column::TotalSpend.name())
        .show(ui, |plot_ui| {
            plot_ui.box_plot(discount_boxes(agg));
        });

    ui.strong("Correlation Heatmap");
    heatmap(ui, &agg.correlation_matrix);
}

/// Axis label for integer ticks that index into `labels`.
fn label_at(labels: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading().strong());
    });
}

fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui| {
            ui.label("");
            for name in &matrix.columns {
                ui.label(RichText::new(*name).small());
            }
            ui.end_row();

            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.label(RichText::new(*name).small());
                for cell in row {
                    let text = match cell {
                        Some(r) => RichText::new(format!("{r:>6.2}"))
                            .background_color(diverging(*r)),
                        None => RichText::new("   n/a").background_color(Color32::DARK_GRAY),
                    };
                    ui.label(text.monospace().color(Color32::BLACK));
                }
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_whole_ticks() {
        let labels = vec!["Electronics".to_string(), "Clothing".to_string()];
        assert_eq!(label_at(&labels, 0.0), "Electronics");
        assert_eq!(label_at(&labels, 1.0), "Clothing");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }
}
