use crate::config::PlotSettings;
use crate::processing::statistics::MarginalSummary;
use crate::state::figure_state::{FigureKind, FigureState};
use crate::state::marginal_series::COLOR_CYCLE;

/// Persistent state for the settings dialog, created when the user opens
/// settings for a particular figure.
pub struct SettingsDialogState {
    pub figure_id: u64,
    /// Cached statistics report. Recomputed when the series list changes.
    pub stats_cache: Option<(Vec<u64>, String)>,
}

impl SettingsDialogState {
    pub fn new(figure_id: u64) -> Self {
        Self {
            figure_id,
            stats_cache: None,
        }
    }
}

/// Show the settings dialog window. Returns `true` while it should stay open,
/// `false` when the user closes it.
pub fn show_settings_dialog(
    ctx: &egui::Context,
    state: &mut SettingsDialogState,
    figure: &mut FigureState,
    settings: &mut PlotSettings,
) -> bool {
    let mut open = true;

    egui::Window::new("Figure Settings")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(520.0)
        .default_height(460.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                // ============================================================
                // SECTION 1: Histogram options (shared by all figures)
                // ============================================================
                ui.label(egui::RichText::new("Histogram").strong().size(15.0));
                ui.add_space(4.0);

                egui::Grid::new("histogram_settings")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Bins");
                        ui.add(egui::DragValue::new(&mut settings.bins).range(1..=1000));
                        ui.end_row();

                        if let FigureKind::Grid { ncols, nrows } = &mut figure.kind {
                            ui.label("Columns per row");
                            ui.add(egui::DragValue::new(ncols).range(1..=8));
                            ui.end_row();

                            if let Some(nrows) = nrows {
                                ui.label("Rows");
                                ui.add(egui::DragValue::new(nrows).range(1..=16));
                                ui.end_row();
                            }
                        }

                        ui.label("Panel size");
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut settings.panel_size[0]).range(200.0..=1200.0).suffix(" w"));
                            ui.add(egui::DragValue::new(&mut settings.panel_size[1]).range(150.0..=900.0).suffix(" h"));
                        });
                        ui.end_row();

                        ui.label("Default colour");
                        ui.horizontal(|ui| {
                            for (i, c) in COLOR_CYCLE.iter().enumerate() {
                                let swatch = egui::Color32::from_rgb(c[0], c[1], c[2]);
                                let text = egui::RichText::new(format!("C{i}")).color(swatch);
                                if ui.selectable_label(settings.color == *c, text).clicked() {
                                    settings.color = *c;
                                }
                            }
                        });
                        ui.end_row();

                        ui.label("");
                        ui.checkbox(&mut settings.cycle_colors, "Cycle colours across grid panels");
                        ui.end_row();

                        ui.label("");
                        ui.checkbox(&mut settings.show_legend, "Show legend");
                        ui.end_row();
                    });

                ui.add_space(12.0);

                // ============================================================
                // SECTION 2: Series list
                // ============================================================
                ui.label(egui::RichText::new("Marginals").strong().size(15.0));
                ui.add_space(4.0);

                let mut remove: Option<u64> = None;
                egui::Frame::group(ui.style())
                    .inner_margin(egui::Margin::same(8))
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_salt("series_scroll")
                            .max_height(240.0)
                            .show(ui, |ui| {
                                for panel in &mut figure.panels {
                                    ui.label(egui::RichText::new(&panel.title).weak());
                                    for series in &mut panel.series {
                                        ui.horizontal(|ui| {
                                            ui.color_edit_button_srgba_unmultiplied(&mut series.color);
                                            ui.checkbox(&mut series.visible, "")
                                                .on_hover_text("Show/hide marginal");
                                            ui.add(
                                                egui::TextEdit::singleline(&mut series.label)
                                                    .desired_width(200.0),
                                            );
                                            ui.label(
                                                egui::RichText::new(format!("{} draws", series.sample_count()))
                                                    .weak(),
                                            );
                                            if ui.small_button("Remove").clicked() {
                                                remove = Some(series.id);
                                            }
                                        });
                                    }
                                }
                            });
                    });
                if let Some(id) = remove {
                    figure.remove_series_by_id(id);
                }

                ui.add_space(12.0);

                egui::CollapsingHeader::new("Statistics")
                    .id_salt("stats_section")
                    .default_open(false)
                    .show(ui, |ui| {
                        show_stats_panel(ui, state, figure);
                    });
            });
        });

    open
}

fn show_stats_panel(ui: &mut egui::Ui, state: &mut SettingsDialogState, figure: &FigureState) {
    let ids: Vec<u64> = figure.series().map(|s| s.id).collect();
    if ids.is_empty() {
        ui.label(egui::RichText::new("No marginals in this figure.").weak());
        state.stats_cache = None;
        return;
    }

    let report = match &state.stats_cache {
        Some((cached_ids, report)) if *cached_ids == ids => report.clone(),
        _ => {
            let mut report = String::new();
            for series in figure.series() {
                match MarginalSummary::compute(&series.label, &series.values) {
                    Some(summary) => report.push_str(&summary.report()),
                    None => report.push_str(&format!("{}:\n  No valid numeric data.\n", series.label)),
                }
                report.push('\n');
            }
            state.stats_cache = Some((ids, report.clone()));
            report
        }
    };

    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.monospace(report);
        });
}
