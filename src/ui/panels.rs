use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_basket::FilterDimension;

use crate::app::{RustyBasketApp, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, app: &mut RustyBasketApp) {
    ui.heading("Filters");
    ui.separator();

    if app.session.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dimension in [FilterDimension::Category, FilterDimension::Discount] {
                dimension_filter(ui, app, dimension);
            }
        });
}

fn dimension_filter(ui: &mut Ui, app: &mut RustyBasketApp, dimension: FilterDimension) {
    let options = app.session.options(dimension);
    let n_selected = app.session.filters().values(dimension).len();
    let header_text = format!("{}  ({n_selected}/{})", dimension.label(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dimension.label())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    app.session.select_all(dimension);
                }
                if ui.small_button("None").clicked() {
                    app.session.select_none(dimension);
                }
            });

            for value in &options {
                let mut checked = app.session.filters().values(dimension).contains(value);

                let mut text = RichText::new(value);
                if dimension == FilterDimension::Category {
                    if let Some(colors) = &app.colors {
                        text = text.color(colors.color_for(value));
                    }
                }

                if ui.checkbox(&mut checked, text).changed() {
                    app.session.toggle_filter_value(dimension, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut RustyBasketApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
        });

        ui.separator();

        for (tab, label) in [
            (Tab::Dashboard, "Dashboard"),
            (Tab::Upload, "Data Upload"),
            (Tab::DatasetView, "Dataset View"),
        ] {
            ui.selectable_value(&mut app.tab, tab, label);
        }

        ui.separator();

        if let Some(ds) = app.session.dataset() {
            ui.label(format!(
                "{} rows loaded, {} after filters",
                ds.len(),
                app.session.results().row_count
            ));
        }

        if let Some(msg) = &app.session.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Upload tab
// ---------------------------------------------------------------------------

pub fn upload_tab(ui: &mut Ui, app: &mut RustyBasketApp) {
    ui.heading("Upload New Dataset");
    ui.label(
        "Drop a .csv, .json or .parquet file onto the window, or pick one below. \
         Missing values are imputed and Total_Spend is recomputed for every upload.",
    );
    ui.add_space(8.0);
    if ui.button("Choose file…").clicked() {
        open_file_dialog(app);
    }
    if let Some(name) = &app.last_upload {
        ui.add_space(8.0);
        ui.label(RichText::new(format!("Loaded {name}")).color(Color32::GREEN));
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut RustyBasketApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        app.load_path(&path);
    }
}
