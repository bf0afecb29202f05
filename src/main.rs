//! # nyc-accidents - Main Entry Point
//!
//! Headless front end of the accident dashboard: each subcommand runs one
//! interaction pass (filter, count, build a view) and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use nyc_accidents::charts::{legend_options, time_axis_options};
use nyc_accidents::cli::{Cli, Command};
use nyc_accidents::dashboard::{Dashboard, DashboardView, Selection, NO_DATA_MESSAGE};
use nyc_accidents::data::DatasetCache;
use nyc_accidents::export::{export_preview, save_workbook};
use nyc_accidents::schema::{DayOfWeek, Field, Severity};
use nyc_accidents::DashboardConfig;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = cli.data.clone() {
        config.data_path = data;
    }

    let cache = DatasetCache::from_csv(&config.data_path, config.malformed_rows);
    let dashboard = Dashboard::from_cache(&cache)
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    let criteria = cli.filters.criteria(&config);
    let selection = dashboard.select(&criteria)?;
    print_summary(&selection);

    if let Command::Options = cli.command {
        print_options(&dashboard, &selection);
        return Ok(());
    }
    if let Command::Summary = cli.command {
        return Ok(());
    }

    let settings = cli.command.chart_settings(&config);
    let panels = match dashboard.render(&selection, &settings)? {
        DashboardView::NoData { .. } => {
            println!("{NO_DATA_MESSAGE}");
            return Ok(());
        }
        DashboardView::Ready { panels, .. } => panels,
    };

    match cli.command {
        Command::Timeseries { .. } => println!("{}", panels.timeseries.frame),
        Command::Factors { .. } => {
            println!("Top factors: {}", panels.top_factors.factors.join(", "));
            println!("{}", panels.top_factors.frame);
        }
        Command::Map => {
            match panels.geo.midpoint {
                Some(p) => println!(
                    "Centre: {:.5}, {:.5} (zoom {})",
                    p.latitude, p.longitude, panels.geo.zoom
                ),
                None => println!("No located collisions"),
            }
            println!("{}", panels.geo.frame);
        }
        Command::Export { out, preview } => {
            println!("{}", export_preview(&selection.table, &Field::EXPORT, preview)?);
            let (name, bytes) = dashboard.export(&selection, &config)?;
            let path = out.unwrap_or_else(|| name.into());
            save_workbook(&bytes, &path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Workbook sheet: {}", config.sheet_name);
            println!("Saved {}", path.display());
        }
        Command::Summary | Command::Options => {}
    }
    Ok(())
}

fn print_summary(selection: &Selection) {
    for line in selection.criteria.describe() {
        println!("{line}");
    }
    let s = selection.summary;
    println!(
        "Total Accidents: {}  Injurious: {}  Fatal: {}",
        s.total, s.injurious, s.fatal
    );
}

fn print_options(dashboard: &Dashboard, selection: &Selection) {
    let base = dashboard.base();
    println!("Areas: {}", base.distinct_values(Field::Borough).join(", "));
    println!("Severities: {}", Severity::ALL.map(Severity::label).join(", "));
    println!("Weekdays: {}", DayOfWeek::ALL.map(DayOfWeek::label).join(", "));

    let axes: Vec<String> = time_axis_options(&selection.criteria, &selection.table)
        .iter()
        .map(|axis| axis.field().label().to_string())
        .collect();
    println!("Time axes: {}", axes.join(", "));

    let legends: Vec<String> = legend_options(&selection.criteria)
        .iter()
        .map(|legend| legend.map_or_else(|| "No Legend".to_string(), |l| l.to_string()))
        .collect();
    println!("Legends: {}", legends.join(", "));
}
