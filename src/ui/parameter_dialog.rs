use crate::data::loader::TraceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotTarget {
    /// One figure per parameter.
    SeparateFigures,
    /// Overlay onto the figure the data was added from.
    Overlay,
    /// One grid figure with a panel per parameter.
    Grid,
}

impl PlotTarget {
    pub fn label(&self) -> &'static str {
        match self {
            PlotTarget::SeparateFigures => "Separate figures",
            PlotTarget::Overlay => "Overlay on current figure",
            PlotTarget::Grid => "Grid of marginals",
        }
    }
}

/// State for the parameter selection dialog, created when the user loads a
/// trace file and needs to choose which parameters to plot.
pub struct ParameterSelectionState {
    pub table: TraceTable,
    /// Figure the dialog was opened from, if any.
    pub target_figure_id: Option<u64>,
    pub selected: Vec<bool>,
    pub target: PlotTarget,
    pub ncols: usize,
}

impl ParameterSelectionState {
    pub fn new(table: TraceTable, target_figure_id: Option<u64>, ncols: usize) -> Self {
        let count = table.numeric.len();
        let target = if target_figure_id.is_some() {
            PlotTarget::Overlay
        } else if count > 1 {
            PlotTarget::Grid
        } else {
            PlotTarget::SeparateFigures
        };
        Self {
            table,
            target_figure_id,
            // Everything is selected up front; traces are usually plotted whole.
            selected: vec![true; count],
            target,
            ncols,
        }
    }

    pub fn chosen_columns(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(i, _)| self.table.numeric[i])
            .collect()
    }
}

/// The parameters the user selected from the dialog.
pub struct ParameterSelection {
    pub figure_id: Option<u64>,
    pub params: Vec<(String, Vec<f64>)>,
    pub target: PlotTarget,
    pub ncols: usize,
}

/// Result of the parameter dialog interaction each frame.
pub enum DialogResult {
    Ok(ParameterSelection),
    Cancel,
}

/// Show the parameter dialog as an egui window.
///
/// Returns `Some(DialogResult)` when the user presses OK or Cancel,
/// or `None` while the dialog is still open.
pub fn show_parameter_dialog(
    ctx: &egui::Context,
    state: &mut ParameterSelectionState,
) -> Option<DialogResult> {
    let mut result = None;

    egui::Window::new("Select Parameters")
        .collapsible(false)
        .resizable(true)
        .default_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Trace has {} numeric columns and {} draws.",
                    state.table.numeric.len(),
                    state.table.row_count,
                ))
                .weak(),
            );

            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Parameters").strong());
                if ui.small_button("All").clicked() {
                    state.selected.iter_mut().for_each(|s| *s = true);
                }
                if ui.small_button("None").clicked() {
                    state.selected.iter_mut().for_each(|s| *s = false);
                }
            });
            ui.add_space(2.0);

            egui::Frame::group(ui.style())
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                        for (i, &col_idx) in state.table.numeric.iter().enumerate() {
                            ui.checkbox(&mut state.selected[i], &state.table.columns[col_idx]);
                        }
                    });
                });

            ui.add_space(12.0);

            ui.label(egui::RichText::new("Plot as").strong());
            let targets: &[PlotTarget] = if state.target_figure_id.is_some() {
                &[PlotTarget::Overlay, PlotTarget::SeparateFigures, PlotTarget::Grid]
            } else {
                &[PlotTarget::SeparateFigures, PlotTarget::Grid]
            };
            for &t in targets {
                ui.radio_value(&mut state.target, t, t.label());
            }
            if state.target == PlotTarget::Grid {
                ui.horizontal(|ui| {
                    ui.label("Columns per row");
                    ui.add(egui::DragValue::new(&mut state.ncols).range(1..=8));
                });
            }

            ui.add_space(16.0);

            let chosen = state.chosen_columns();
            ui.horizontal(|ui| {
                let ok_btn = ui.add_enabled(
                    !chosen.is_empty(),
                    egui::Button::new(egui::RichText::new("Plot").strong())
                        .min_size(egui::vec2(100.0, 32.0)),
                );
                if ok_btn.clicked() {
                    let params = chosen
                        .iter()
                        .map(|&i| (state.table.columns[i].clone(), state.table.values[i].clone()))
                        .collect();
                    result = Some(DialogResult::Ok(ParameterSelection {
                        figure_id: state.target_figure_id,
                        params,
                        target: state.target,
                        ncols: state.ncols,
                    }));
                }

                if ui.add(egui::Button::new("Cancel").min_size(egui::vec2(100.0, 32.0))).clicked() {
                    result = Some(DialogResult::Cancel);
                }

                if chosen.is_empty() {
                    ui.label(egui::RichText::new("Select at least one parameter").weak());
                }
            });
        });

    result
}
