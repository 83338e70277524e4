use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use rusty_basket::data::stats::{describe, ColumnSummary};
use rusty_basket::{Column, EnrichedDataset};

// ---------------------------------------------------------------------------
// Dataset view: the full enriched table plus summary statistics
// ---------------------------------------------------------------------------

pub fn dataset_view(ui: &mut Ui, dataset: Option<&EnrichedDataset>) {
    let Some(dataset) = dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dataset  (File → Open…)");
        });
        return;
    };

    ui.heading("Full Dataset View");
    let records = dataset.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(420.0)
        .columns(TableColumn::auto().at_least(70.0), Column::ALL.len())
        .header(20.0, |mut header| {
            for col in Column::ALL {
                header.col(|ui| {
                    ui.strong(col.name());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let record = &records[row.index()];
                for col in Column::ALL {
                    row.col(|ui| {
                        ui.label(record.cell(col).to_string());
                    });
                }
            });
        });

    ui.add_space(12.0);
    ui.heading("Dataset Summary Statistics");
    summary_grid(ui, &describe(dataset.as_dataset()));
}

fn summary_grid(ui: &mut Ui, summaries: &[ColumnSummary]) {
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "–".into());

    egui::Grid::new("summary_stats")
        .striped(true)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            ui.label("");
            for s in summaries {
                ui.strong(s.column);
            }
            ui.end_row();

            ui.label(RichText::new("count").italics());
            for s in summaries {
                ui.label(s.count.to_string());
            }
            ui.end_row();

            let rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 7] = [
                ("mean", |s| s.mean),
                ("std", |s| s.std),
                ("min", |s| s.min),
                ("25%", |s| s.q25),
                ("50%", |s| s.q50),
                ("75%", |s| s.q75),
                ("max", |s| s.max),
            ];
            for (label, get) in rows {
                ui.label(RichText::new(label).italics());
                for s in summaries {
                    ui.label(fmt(get(s)));
                }
                ui.end_row();
            }
        });
}
