use crate::config::PlotSettings;
use crate::render::marginal_plot::show_marginal_panel;
use crate::state::figure_state::{FigureKind, FigureState};
use crate::state::theme::Theme;
use crate::ui::summary_table::show_summary_table;

/// Actions that the figure panel can request from the parent.
pub enum FigureAction {
    None,
    Close,
    AddParameters,
    OpenSettings,
    ExportHistogramCsv,
    ExportImageSave,
    ExportImageClipboard,
}

/// Helper to create a toolbar button with consistent min size.
fn toolbar_btn(ui: &mut egui::Ui, label: &str) -> egui::Response {
    ui.add(egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
}

/// Helper to create a selected/toggled toolbar button.
fn toolbar_toggle_btn(ui: &mut egui::Ui, label: &str, active: bool) -> egui::Response {
    let btn = if active {
        egui::Button::new(egui::RichText::new(label).strong())
            .fill(ui.visuals().selection.bg_fill)
            .min_size(egui::vec2(0.0, 26.0))
    } else {
        egui::Button::new(label).min_size(egui::vec2(0.0, 26.0))
    };
    ui.add(btn)
}

/// Render one figure. Returns an action if the user clicked a button, plus
/// any per-series errors hit while binning.
pub fn show_figure_panel(
    figure: &mut FigureState,
    ui: &mut egui::Ui,
    settings: &PlotSettings,
    theme: &Theme,
) -> (FigureAction, Vec<String>) {
    let mut action = FigureAction::None;
    let mut errors = Vec::new();

    let frame_resp = egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .corner_radius(egui::CornerRadius::same(8))
        .show(ui, |ui| {
            // --- Title row ---
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut figure.title)
                        .font(egui::TextStyle::Heading)
                        .desired_width(ui.available_width() - 90.0),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let close_btn = egui::Button::new(
                        egui::RichText::new("Close").color(egui::Color32::from_rgb(220, 60, 60)),
                    )
                    .min_size(egui::vec2(0.0, 26.0));
                    if ui.add(close_btn).on_hover_text("Remove this figure").clicked() {
                        action = FigureAction::Close;
                    }
                });
            });

            ui.add_space(2.0);

            // --- Toolbar row ---
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                if toolbar_btn(ui, "Settings").on_hover_text("Bins, colours and statistics").clicked() {
                    action = FigureAction::OpenSettings;
                }
                let add_hint = match figure.kind {
                    FigureKind::Single => "Overlay more marginals from a trace file",
                    FigureKind::Grid { .. } => "Load another trace file",
                };
                if toolbar_btn(ui, "Add Parameters").on_hover_text(add_hint).clicked() {
                    action = FigureAction::AddParameters;
                }

                ui.separator();

                let summary = figure.show_summary;
                if toolbar_toggle_btn(ui, if summary { "Plot View" } else { "Summary" }, summary)
                    .on_hover_text("Toggle between histograms and the credible interval table")
                    .clicked()
                {
                    figure.show_summary = !figure.show_summary;
                }

                ui.separator();

                let export_popup_id = ui.make_persistent_id(format!("export_popup_{}", figure.id));
                let export_btn_resp = toolbar_btn(ui, "Export").on_hover_text("Export histogram data or image");
                if export_btn_resp.clicked() {
                    ui.memory_mut(|m| m.toggle_popup(export_popup_id));
                }
                egui::popup_below_widget(
                    ui,
                    export_popup_id,
                    &export_btn_resp,
                    egui::PopupCloseBehavior::CloseOnClickOutside,
                    |ui| {
                        ui.set_min_width(180.0);
                        if ui.button("Save Histograms as CSV").clicked() {
                            action = FigureAction::ExportHistogramCsv;
                            ui.memory_mut(|m| m.toggle_popup(export_popup_id));
                        }
                        if ui.button("Save as Image").clicked() {
                            action = FigureAction::ExportImageSave;
                            ui.memory_mut(|m| m.toggle_popup(export_popup_id));
                        }
                        if ui.button("Copy Image").clicked() {
                            action = FigureAction::ExportImageClipboard;
                            ui.memory_mut(|m| m.toggle_popup(export_popup_id));
                        }
                    },
                );

                ui.separator();
                ui.label(
                    egui::RichText::new(format!(
                        "{} · {} bins",
                        figure.kind.label(),
                        settings.bins
                    ))
                    .weak(),
                );
            });

            ui.add_space(4.0);

            if figure.show_summary {
                show_summary_table(ui, &figure.summaries());
                return;
            }

            let layout = match figure.layout() {
                Ok(layout) => layout,
                Err(e) => {
                    ui.label(egui::RichText::new(e.to_string()).weak());
                    return;
                }
            };

            let size = egui::vec2(settings.panel_size[0], settings.panel_size[1]);
            egui::ScrollArea::horizontal()
                .id_salt(("figure_scroll", figure.id))
                .show(ui, |ui| {
                    for row in layout.rows() {
                        ui.horizontal(|ui| {
                            for idx in row {
                                let plot_id = egui::Id::new(("marginal", figure.id, idx));
                                if let Some(panel) = figure.panels.get_mut(idx) {
                                    errors.extend(show_marginal_panel(
                                        ui, panel, plot_id, settings, theme, size,
                                    ));
                                }
                            }
                        });
                    }
                });
        });
    figure.last_frame_rect = Some(frame_resp.response.rect);

    (action, errors)
}
