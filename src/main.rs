use std::process::ExitCode;

use clap::Parser;
use eframe::egui;
use marginalplot::app::MarginalPlotApp;
use marginalplot::config::{Cli, PlotSettings};
use marginalplot::data::loader;
use marginalplot::processing::{export, statistics::MarginalSummary};
use marginalplot::{logging, AppState, MarginalError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = PlotSettings::from_cli(&cli)?;
    if cli.summary {
        return print_summary(&cli);
    }

    let (state, startup_error) = startup_state(&cli, settings);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MarginalPlot")
            .with_inner_size([1300.0, 860.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "MarginalPlot",
        options,
        Box::new(|cc| Ok(Box::new(MarginalPlotApp::new(cc, state, startup_error)))),
    )
    .map_err(|e| MarginalError::Window(e.to_string()))
}

/// Headless mode: credible intervals of the selected parameters on stdout.
fn print_summary(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.file else {
        return Ok(());
    };
    let table = loader::load_file(path)?;
    let summaries: Vec<MarginalSummary> = table
        .select(&cli.columns)?
        .iter()
        .filter_map(|(name, values)| {
            let summary = MarginalSummary::compute(name, values);
            if summary.is_none() {
                tracing::warn!(parameter = %name, "no finite samples, skipped");
            }
            summary
        })
        .collect();

    let out = if cli.json {
        export::summary_json(&summaries)?
    } else {
        export::summary_csv(&summaries)?
    };
    println!("{}", out.trim_end());
    Ok(())
}

/// Plot the trace given on the command line before the window opens. Load
/// errors are shown in the footer rather than aborting.
fn startup_state(cli: &Cli, settings: PlotSettings) -> (AppState, Option<String>) {
    let mut state = AppState::new(settings);
    let Some(path) = &cli.file else {
        return (state, None);
    };

    let plotted = loader::load_file(path)
        .and_then(|table| table.select(&cli.columns))
        .and_then(|params| {
            if cli.grid {
                state.plot_marginal_grid(params, None, None).map(|_| ())
            } else {
                params
                    .into_iter()
                    .try_for_each(|(name, values)| state.plot_marginal(values, &name, true, None).map(|_| ()))
            }
        });

    match plotted {
        Ok(()) => (state, None),
        Err(e) => {
            tracing::error!(path = %path.display(), "failed to plot trace: {e}");
            (state, Some(format!("Failed to plot {}: {e}", path.display())))
        }
    }
}
