use egui_extras::{Column, TableBuilder};

use crate::processing::credible::SigmaLevel;
use crate::processing::statistics::MarginalSummary;

const HEADERS: [&str; 6] = ["Parameter", "Samples", "Mean", "Median", "Std Dev", "Range"];

/// Credible intervals and moments, one row per marginal.
pub fn show_summary_table(ui: &mut egui::Ui, summaries: &[MarginalSummary]) {
    if summaries.is_empty() {
        ui.label("No data loaded.");
        return;
    }

    let table = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(90.0), HEADERS.len() + 2)
        .min_scrolled_height(200.0);

    table
        .header(20.0, |mut header| {
            for title in HEADERS
                .iter()
                .copied()
                .chain([SigmaLevel::One.label(), SigmaLevel::Two.label()])
            {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, summaries.len(), |mut row| {
                let s = &summaries[row.index()];
                row.col(|ui| {
                    ui.label(&s.name);
                });
                row.col(|ui| {
                    ui.label(s.count.to_string());
                });
                for v in [s.mean, s.median, s.std_dev] {
                    row.col(|ui| {
                        ui.monospace(format!("{v:.4}"));
                    });
                }
                for (lo, hi) in [
                    (s.min, s.max),
                    (s.sigma_1.low, s.sigma_1.high),
                    (s.sigma_2.low, s.sigma_2.high),
                ] {
                    row.col(|ui| {
                        ui.monospace(format!("[{lo:.4}, {hi:.4}]"));
                    });
                }
            });
        });
}
