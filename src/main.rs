mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;

use app::Co2DashboardApp;
use config::DashboardConfig;
use state::AppState;

#[derive(Parser)]
#[command(name = "co2-dashboard")]
#[command(version)]
#[command(about = "Global CO2 emissions dashboard with a linear trend forecast")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true, default_value = "co2-dashboard.json")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and print a text summary instead of opening a window
    Report {
        /// First year of the range (defaults to the configured range)
        #[arg(long)]
        from: Option<i64>,

        /// Last year of the range (defaults to the configured range)
        #[arg(long)]
        to: Option<i64>,

        /// Restrict to a single country
        #[arg(long)]
        country: Option<String>,

        /// Country to include in the comparison (repeatable)
        #[arg(long)]
        compare: Vec<String>,

        /// Number of years to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Read the emissions data from a local file instead of Kaggle
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let mut state = AppState::new(config);

    match cli.command {
        Some(Command::Report {
            from,
            to,
            country,
            compare,
            horizon,
            input,
        }) => {
            match input {
                Some(path) => {
                    state.open_local(path);
                    state.load_country_data();
                }
                None => state.load_all(),
            }

            let years = state.filters.years;
            state.set_year_range(from.unwrap_or(years.lo), to.unwrap_or(years.hi));
            state.select_country(country);
            state.set_comparison(compare);
            if let Some(h) = horizon {
                state.set_horizon(h);
            }

            print!("{}", report::render(&state));
            Ok(())
        }
        None => {
            state.load_all();

            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([1280.0, 900.0])
                    .with_min_inner_size([720.0, 480.0]),
                ..Default::default()
            };

            eframe::run_native(
                "Global CO2 Emissions Dashboard",
                options,
                Box::new(|_cc| Ok(Box::new(Co2DashboardApp::new(state)))),
            )
            .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
        }
    }
}
