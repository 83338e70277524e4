use std::io::Cursor;
use std::path::Path;

use eframe::egui;
use rusty_basket::{load_csv_reader, load_file, AnalysisConfig, AnalysisSession, Dataset};

use crate::color::ColorMap;
use crate::ui::{panels, plot, table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Upload,
    DatasetView,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyBasketApp {
    pub session: AnalysisSession,
    /// Category colours, rebuilt whenever the dataset is replaced.
    pub colors: Option<ColorMap>,
    pub tab: Tab,
    pub last_upload: Option<String>,
}

impl RustyBasketApp {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            session: AnalysisSession::new(config),
            colors: None,
            tab: Tab::Dashboard,
            last_upload: None,
        }
    }

    /// Load a file from disk, keeping the current dataset if loading fails.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(raw) => {
                self.replace_dataset(&raw);
                self.last_upload = Some(path.display().to_string());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.session.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn replace_dataset(&mut self, raw: &Dataset) {
        self.session.set_dataset(raw);
        self.colors = self
            .session
            .dataset()
            .map(|ds| ColorMap::new(&ds.categories()));
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // One dataset at a time; the last drop wins.
        let Some(file) = dropped.into_iter().last() else {
            return;
        };

        if let Some(path) = &file.path {
            self.load_path(path);
        } else if let Some(bytes) = &file.bytes {
            // Web drops carry no path; only CSV can be sniffed from raw bytes.
            match load_csv_reader(Cursor::new(bytes.to_vec())) {
                Ok(raw) => {
                    self.replace_dataset(&raw);
                    self.last_upload = Some(file.name.clone());
                }
                Err(e) => {
                    log::error!("Failed to load dropped file {}: {e}", file.name);
                    self.session.status_message = Some(format!("Error: {e}"));
                }
            }
        }
    }
}

impl eframe::App for RustyBasketApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Dashboard => {
                if self.session.dataset().is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Open a file to get started  (File → Open…)");
                    });
                    return;
                }
                let results = self.session.results();
                let threshold = self.session.config().high_income_threshold;
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        plot::dashboard(ui, &results, self.colors.as_ref(), threshold);
                    });
            }
            Tab::Upload => panels::upload_tab(ui, self),
            Tab::DatasetView => table::dataset_view(ui, self.session.dataset()),
        });
    }
}
