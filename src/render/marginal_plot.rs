use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Corner, Legend, Line, Plot, PlotPoints};

use crate::config::PlotSettings;
use crate::processing::marginal::HistogramLayer;
use crate::state::figure_state::PanelState;
use crate::state::theme::Theme;

/// Width of the step outline around each layer, in points.
const OUTLINE_WIDTH: f32 = 0.5;
const TITLE_HEIGHT: f32 = 22.0;

/// Filled bars for one layer; the fill alpha encodes the band.
pub fn layer_chart(layer: &HistogramLayer, color: Color32, name: Option<String>) -> BarChart {
    let fill = color.gamma_multiply(layer.alpha);
    let width = layer.bin_width();
    let bars: Vec<Bar> = layer
        .bars()
        .map(|(center, height)| {
            Bar::new(center, height)
                .width(width)
                .fill(fill)
                .stroke(Stroke::new(0.0, fill))
        })
        .collect();

    let chart = BarChart::new(bars).color(fill);
    match name {
        Some(name) => chart.name(name),
        None => chart,
    }
}

pub fn layer_outline(layer: &HistogramLayer, outline: Color32) -> Line {
    Line::new(PlotPoints::from(layer.outline()))
        .color(outline)
        .width(OUTLINE_WIDTH)
}

/// Legend entry for a band; overlaid marginals are prefixed with their label.
fn legend_name(layer: &HistogramLayer, series_label: &str, overlaid: bool) -> Option<String> {
    let band = layer.label?;
    Some(if overlaid {
        format!("{series_label}: {band}")
    } else {
        band.to_string()
    })
}

type SeriesLayers = (Color32, String, Vec<HistogramLayer>);

/// Layers of every visible series. A series that cannot be binned is
/// reported once and then skipped until its bins or label change.
fn panel_layers(panel: &mut PanelState, bins: usize) -> (Vec<SeriesLayers>, Vec<String>) {
    let mut drawn = Vec::new();
    let mut errors = Vec::new();
    for series in panel.series.iter_mut().filter(|s| s.visible) {
        if series.has_failed(bins) {
            continue;
        }
        let color = series.color32();
        let label = series.label.clone();
        match series.marginal(bins) {
            Ok(marginal) => drawn.push((color, label, marginal.layers())),
            Err(e) => errors.push(e.to_string()),
        }
    }
    (drawn, errors)
}

/// Draw one marginal panel: title, shaded layers, outlines and legend.
///
/// Series whose marginal cannot be computed are skipped; their errors are
/// returned for display.
pub fn show_marginal_panel(
    ui: &mut egui::Ui,
    panel: &mut PanelState,
    plot_id: egui::Id,
    settings: &PlotSettings,
    theme: &Theme,
    size: egui::Vec2,
) -> Vec<String> {
    let overlaid = panel.series.iter().filter(|s| s.visible).count() > 1;
    let (drawn, errors) = panel_layers(panel, settings.bins);

    let outline = theme.outline();
    ui.vertical(|ui| {
        ui.set_width(size.x);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&panel.title).strong());
        });

        let mut plot = Plot::new(plot_id)
            .width(size.x)
            .height((size.y - TITLE_HEIGHT).max(80.0))
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_grid(false)
            .include_y(0.0)
            .include_y(1.05);
        if settings.show_legend {
            plot = plot.legend(Legend::default().position(Corner::RightTop));
        }

        plot.show(ui, |plot_ui| {
            for (color, label, layers) in &drawn {
                for layer in layers {
                    plot_ui.bar_chart(layer_chart(layer, *color, legend_name(layer, label, overlaid)));
                    plot_ui.line(layer_outline(layer, outline));
                }
            }
        });
    });

    errors
}
