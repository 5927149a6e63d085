use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::data::loader::{self, TraceTable};
use crate::error::{MarginalError, Result};
use crate::processing::export;
use crate::render::snapshot::crop_screenshot;
use crate::state::app_state::{AppState, VERSION};
use crate::state::marginal_series::color_for_index;
use crate::state::theme::Theme;
use crate::ui::figure_panel::{self, FigureAction};
use crate::ui::parameter_dialog::{
    show_parameter_dialog, DialogResult, ParameterSelection, ParameterSelectionState, PlotTarget,
};
use crate::ui::settings_dialog::{show_settings_dialog, SettingsDialogState};

/// What to do when a screenshot arrives.
enum PendingScreenshot {
    SaveFile { figure_id: u64 },
    Clipboard { figure_id: u64 },
}

/// Trace being parsed on a worker thread.
struct PendingLoad {
    figure_id: Option<u64>,
    receiver: Receiver<Result<TraceTable>>,
}

impl PendingLoad {
    /// The load result once the worker is done. A worker that exits without
    /// sending (e.g. it panicked) counts as a failed load.
    fn poll(&self) -> Option<Result<TraceTable>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(MarginalError::LoadInterrupted)),
        }
    }
}

/// The main MarginalPlot application.
pub struct MarginalPlotApp {
    pub state: AppState,
    /// Active parameter selection dialog (shown after a trace is loaded).
    pub parameter_dialog: Option<ParameterSelectionState>,
    /// Active settings dialog for a particular figure.
    pub settings_dialog: Option<SettingsDialogState>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    pub show_about: bool,
    pending_load: Option<PendingLoad>,
    pending_screenshot: Option<PendingScreenshot>,
}

impl MarginalPlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, error_message: Option<String>) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();

        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));

        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(themed_visuals(state.theme));

        Self {
            state,
            parameter_dialog: None,
            settings_dialog: None,
            error_message,
            show_about: false,
            pending_load: None,
            pending_screenshot: None,
        }
    }

    /// Open a native file dialog and load the chosen trace for `figure_id`.
    fn open_file_dialog(&mut self, figure_id: Option<u64>) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Trace Files", &loader::SUPPORTED_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(figure_id, &path);
        }
    }

    /// Parse a trace file on a worker thread so the UI stays responsive.
    fn load_file(&mut self, figure_id: Option<u64>, path: &Path) {
        let path_buf = path.to_path_buf();
        let (sender, receiver) = mpsc::channel();

        std::thread::spawn(move || {
            // The receiver is gone only if the app is shutting down.
            let _ = sender.send(loader::load_file(&path_buf));
        });

        self.pending_load = Some(PendingLoad { figure_id, receiver });
    }

    fn export_histogram_csv(&mut self, figure_id: u64) {
        let bins = self.state.settings.bins;
        let Some(figure) = self.state.figure_by_id_mut(figure_id) else {
            return;
        };
        if figure.series_count() == 0 {
            return;
        }
        let filename = format!("{}.csv", figure.title.replace(' ', "_"));
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&filename)
            .add_filter("CSV Files", &["csv"])
            .save_file()
        else {
            return;
        };

        let written: Result<()> = (|| {
            let mut text = String::new();
            for (i, series) in figure.series_mut().enumerate() {
                let csv = export::histogram_csv(series.marginal(bins)?)?;
                // Header once, then data rows of every marginal.
                let skip = usize::from(i > 0);
                for line in csv.lines().skip(skip) {
                    text.push_str(line);
                    text.push('\n');
                }
            }
            std::fs::write(&path, text)?;
            Ok(())
        })();

        match written {
            Ok(()) => tracing::info!("exported histograms to {}", path.display()),
            Err(e) => self.error_message = Some(format!("Failed to export histograms: {e}")),
        }
    }

    fn save_project(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("marginals.mplot")
            .add_filter("MarginalPlot Project", &["mplot", "json"])
            .save_file()
        else {
            return;
        };
        let saved = self
            .state
            .to_json()
            .and_then(|json| Ok(std::fs::write(&path, json)?));
        match saved {
            Ok(()) => tracing::info!("project saved to {}", path.display()),
            Err(e) => {
                tracing::error!("failed to save project: {e}");
                self.error_message = Some(format!("Failed to save project: {e}"));
            }
        }
    }

    fn load_project(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("MarginalPlot Project", &["mplot", "json"])
            .pick_file()
        else {
            return;
        };
        let loaded = std::fs::read_to_string(&path)
            .map_err(Into::into)
            .and_then(|json| AppState::from_json(&json));
        match loaded {
            Ok(state) => {
                self.state = state;
                self.settings_dialog = None;
                tracing::info!("project loaded from {}", path.display());
            }
            Err(e) => self.error_message = Some(format!("Failed to load project: {e}")),
        }
    }

    /// Called when the user presses Plot in the parameter dialog.
    fn process_parameter_selection(&mut self, selection: ParameterSelection) {
        let ParameterSelection {
            figure_id,
            params,
            target,
            ncols,
        } = selection;

        let outcome = match target {
            PlotTarget::Grid => self.state.plot_marginal_grid(params, Some(ncols), None).map(|_| ()),
            PlotTarget::SeparateFigures => params
                .into_iter()
                .try_for_each(|(name, values)| self.state.plot_marginal(values, &name, true, None).map(|_| ())),
            PlotTarget::Overlay => {
                // Overlay onto the figure the dialog came from by moving it last.
                if let Some(pos) = figure_id.and_then(|id| self.state.figures.iter().position(|f| f.id == id)) {
                    let figure = self.state.figures.remove(pos);
                    self.state.figures.push(figure);
                }
                let existing = self
                    .state
                    .figures
                    .last()
                    .and_then(|f| f.panels.last())
                    .map_or(0, |p| p.series.len());
                params.into_iter().enumerate().try_for_each(|(i, (name, values))| {
                    let color = color_for_index(existing + i);
                    self.state.plot_marginal(values, &name, false, Some(color)).map(|_| ())
                })
            }
        };

        if let Err(e) = outcome {
            tracing::error!("failed to plot marginals: {e}");
            self.error_message = Some(e.to_string());
        }
    }

    fn handle_screenshot(&mut self, ctx: &egui::Context) {
        let Some(color_image) = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        }) else {
            return;
        };
        let Some(action) = self.pending_screenshot.take() else {
            return;
        };
        let figure_id = match &action {
            PendingScreenshot::SaveFile { figure_id } | PendingScreenshot::Clipboard { figure_id } => *figure_id,
        };
        let rect = self.state.figure_by_id(figure_id).and_then(|f| f.last_frame_rect);
        let snapshot = crop_screenshot(&color_image, rect, ctx.pixels_per_point());

        match action {
            PendingScreenshot::SaveFile { .. } => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_file_name("marginals.png")
                    .add_filter("PNG Image", &["png"])
                    .save_file()
                {
                    if let Err(e) = snapshot.save_png(&path) {
                        self.error_message = Some(format!("Failed to save image: {e}"));
                    }
                }
            }
            PendingScreenshot::Clipboard { .. } => {
                if let Err(e) = snapshot.copy_to_clipboard() {
                    self.error_message = Some(e);
                }
            }
        }
    }
}

fn themed_visuals(theme: Theme) -> egui::Visuals {
    let mut vis = theme.visuals();
    vis.window_corner_radius = egui::CornerRadius::same(8);
    vis.widgets.noninteractive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.active.corner_radius = egui::CornerRadius::same(6);
    vis
}

impl eframe::App for MarginalPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(themed_visuals(self.state.theme));

        // ------------------------------------------------------------------
        // 0. Screenshot requested last frame
        // ------------------------------------------------------------------
        if self.pending_screenshot.is_some() {
            self.handle_screenshot(ctx);
        }

        // ------------------------------------------------------------------
        // 1. Dropped trace files open a new figure
        // ------------------------------------------------------------------
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .filter(|p| loader::is_supported(p))
                .collect()
        });
        if let Some(path) = dropped.first() {
            self.load_file(None, path);
        }

        // ------------------------------------------------------------------
        // 2. Header, footer and figures
        // ------------------------------------------------------------------
        let mut save_project = false;
        let mut load_project = false;
        let mut open_trace = false;
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let heading = ui.heading("MarginalPlot");
                    heading.context_menu(|ui| {
                        if ui.button("About MarginalPlot").clicked() {
                            self.show_about = true;
                            ui.close_menu();
                        }
                        if ui.button("Close All Figures").clicked() {
                            self.state.figures.clear();
                            ui.close_menu();
                        }
                    });

                    ui.separator();

                    if ui.button("Open Trace").clicked() {
                        open_trace = true;
                    }
                    if ui.button("Save Project").clicked() {
                        save_project = true;
                    }
                    if ui.button("Load Project").clicked() {
                        load_project = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.state.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.state.theme = self.state.theme.toggle();
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        if open_trace {
            self.open_file_dialog(None);
        }
        if save_project {
            self.save_project();
        }
        if load_project {
            self.load_project();
        }

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let count = self.state.figures.len();
                    let label = if count == 1 { "1 figure".to_string() } else { format!("{count} figures") };
                    ui.label(egui::RichText::new(label).weak());

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        let mut actions: Vec<(u64, FigureAction)> = Vec::new();
        let mut panel_errors: Vec<String> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.state.figures.is_empty() {
                    ui.add_space(80.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Welcome to MarginalPlot");
                        ui.add_space(12.0);
                        ui.label(
                            egui::RichText::new(
                                "Click \"Open Trace\" or drag-and-drop a CSV / Excel trace to plot its marginals.",
                            )
                            .weak(),
                        );
                    });
                }

                let theme = self.state.theme;
                let settings = self.state.settings.clone();
                for figure in &mut self.state.figures {
                    let id = figure.id;
                    ui.push_id(id, |ui| {
                        let (action, errors) = figure_panel::show_figure_panel(figure, ui, &settings, &theme);
                        panel_errors.extend(errors);
                        if !matches!(action, FigureAction::None) {
                            actions.push((id, action));
                        }
                    });
                    ui.add_space(10.0);
                }
            });
        });
        if let Some(first) = panel_errors.into_iter().next() {
            self.error_message.get_or_insert(first);
        }

        // ------------------------------------------------------------------
        // 3. Figure actions
        // ------------------------------------------------------------------
        for (id, action) in actions {
            match action {
                FigureAction::Close => self.state.remove_figure(id),
                FigureAction::AddParameters => self.open_file_dialog(Some(id)),
                FigureAction::OpenSettings => self.settings_dialog = Some(SettingsDialogState::new(id)),
                FigureAction::ExportHistogramCsv => self.export_histogram_csv(id),
                FigureAction::ExportImageSave => {
                    self.pending_screenshot = Some(PendingScreenshot::SaveFile { figure_id: id });
                    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                }
                FigureAction::ExportImageClipboard => {
                    self.pending_screenshot = Some(PendingScreenshot::Clipboard { figure_id: id });
                    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                }
                FigureAction::None => {}
            }
        }

        // ------------------------------------------------------------------
        // 4. Poll async trace load
        // ------------------------------------------------------------------
        let finished = self
            .pending_load
            .as_ref()
            .and_then(|pending| pending.poll().map(|r| (pending.figure_id, r)));
        if let Some((figure_id, result)) = finished {
            self.pending_load = None;
            match result {
                Ok(table) => {
                    self.parameter_dialog =
                        Some(ParameterSelectionState::new(table, figure_id, self.state.settings.ncols));
                }
                Err(e) => {
                    tracing::error!("failed to load trace: {e}");
                    self.error_message = Some(format!("Failed to load trace: {e}"));
                }
            }
        }

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading trace...");
                    });
                });
            ctx.request_repaint();
        }

        // ------------------------------------------------------------------
        // 5. Dialogs
        // ------------------------------------------------------------------
        let mut selection_to_process = None;
        if let Some(dialog) = &mut self.parameter_dialog {
            match show_parameter_dialog(ctx, dialog) {
                Some(DialogResult::Ok(selection)) => selection_to_process = Some(selection),
                Some(DialogResult::Cancel) => self.parameter_dialog = None,
                None => {}
            }
        }
        if let Some(selection) = selection_to_process {
            self.parameter_dialog = None;
            self.process_parameter_selection(selection);
        }

        let mut close_settings = false;
        if let Some(sd) = &mut self.settings_dialog {
            let settings = &mut self.state.settings;
            match self.state.figures.iter_mut().find(|f| f.id == sd.figure_id) {
                Some(figure) => close_settings = !show_settings_dialog(ctx, sd, figure, settings),
                None => close_settings = true,
            }
        }
        if close_settings {
            self.settings_dialog = None;
        }

        if self.show_about {
            egui::Window::new("About MarginalPlot")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("MarginalPlot");
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label("Posterior marginals with shaded credible intervals.");
                    ui.add_space(10.0);
                    ui.label("  \u{2022} 1σ (68%) and 2σ (95%) bands");
                    ui.label("  \u{2022} Single, overlaid and grid figures");
                    ui.label("  \u{2022} CSV, TSV and Excel traces");
                    ui.label("  \u{2022} Histogram CSV and PNG export");
                });
        }
    }
}
