//! CLI argument definitions

use crate::charts::{FactorField, Legend, Measure, TimeAxis};
use crate::config::DashboardConfig;
use crate::dashboard::{ChartSettings, FactorSettings, TimeSeriesSettings};
use crate::data::{FilterCriteria, HourRange};
use crate::schema::{DayOfWeek, Severity};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nyc-accidents",
    about = "Explore NYC vehicular accidents: filter, chart data and Excel export",
    after_help = "\
EXAMPLES:
    nyc-accidents summary --area MANHATTAN --from 2020-03-01 --to 2020-03-31
    nyc-accidents timeseries --x day-of-week --legend severity
    nyc-accidents factors --vehicle vehicle2 --y injured --top-n 5
    nyc-accidents export --severity fatal --out fatal.xlsx"
)]
pub struct Cli {
    /// JSON settings file (data path, export names, cleaning policy)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Accident CSV, overriding the configured data path
    #[arg(short, long, value_name = "CSV", global = true)]
    pub data: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Sidebar selections. Omitted selections keep every row.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// First crash date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// Last crash date, inclusive (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Borough to keep; repeat for several
    #[arg(long = "area", value_name = "BOROUGH", global = true)]
    pub areas: Vec<String>,

    /// Severity to keep; repeat for several
    #[arg(long = "severity", value_enum, global = true)]
    pub severities: Vec<Severity>,

    /// Day of week to keep; repeat for several
    #[arg(long = "weekday", value_enum, global = true)]
    pub weekdays: Vec<DayOfWeek>,

    /// Hour-of-day window, inclusive (e.g. 7-19)
    #[arg(long, value_name = "START-END", global = true)]
    pub hours: Option<HourRange>,
}

impl FilterArgs {
    pub fn criteria(&self, config: &DashboardConfig) -> FilterCriteria {
        FilterCriteria {
            date_range: config.date_range(self.from, self.to),
            areas: self.areas.iter().map(|a| a.trim().to_uppercase()).collect(),
            severities: self.severities.iter().copied().collect(),
            weekdays: self.weekdays.iter().copied().collect(),
            hour_range: self.hours.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Headline counts and the active selection
    Summary,
    /// Selectable values for every filter and chart option
    Options,
    /// Measure grouped over a time axis
    Timeseries {
        #[arg(long, value_enum, default_value = "crash-date")]
        x: TimeAxis,
        #[arg(long, value_enum, default_value = "accidents")]
        y: Measure,
        /// Colour split; omit for a single series
        #[arg(long, value_enum)]
        legend: Option<Legend>,
    },
    /// Leading contributing factors broken down by a legend
    Factors {
        #[arg(long, value_enum, default_value = "vehicle1")]
        vehicle: FactorField,
        #[arg(long, value_enum, default_value = "accidents")]
        y: Measure,
        #[arg(long, value_enum, default_value = "area")]
        legend: Legend,
        /// Factors to keep; defaults to the configured `top_n`
        #[arg(long)]
        top_n: Option<usize>,
        /// Rank the "Unspecified" factor too
        #[arg(long)]
        include_unspecified: bool,
    },
    /// Located collisions and the map centre
    Map,
    /// Write the selection as an Excel workbook
    Export {
        /// Output path; defaults to `<dataset_name>.xlsx`
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Rows to print as a preview
        #[arg(long, default_value = "5")]
        preview: usize,
    },
}

impl Command {
    /// Chart widget state implied by the command, with unset flags taken from `config`.
    pub fn chart_settings(&self, config: &DashboardConfig) -> ChartSettings {
        let mut settings = ChartSettings::default();
        match *self {
            Command::Timeseries { x, y, legend } => {
                settings.timeseries = TimeSeriesSettings { x, y, legend };
            }
            Command::Factors {
                vehicle,
                y,
                legend,
                top_n,
                include_unspecified,
            } => {
                settings.factors = FactorSettings {
                    factor: vehicle,
                    y,
                    legend,
                    top_n: top_n.unwrap_or(config.top_n),
                    exclude_unspecified: !include_unspecified,
                };
            }
            _ => {}
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn filters_parse_into_criteria() {
        let cli = Cli::try_parse_from([
            "nyc-accidents",
            "summary",
            "--area",
            "manhattan",
            "--area",
            "Queens",
            "--severity",
            "fatal",
            "--weekday",
            "friday",
            "--hours",
            "7-19",
            "--from",
            "2020-03-01",
            "--to",
            "2020-03-31",
        ])
        .unwrap();
        let criteria = cli.filters.criteria(&DashboardConfig::default());
        assert_eq!(
            criteria.areas,
            BTreeSet::from(["MANHATTAN".to_string(), "QUEENS".to_string()])
        );
        assert_eq!(criteria.severities, BTreeSet::from([Severity::Fatal]));
        assert_eq!(criteria.weekdays, BTreeSet::from([DayOfWeek::Friday]));
        assert_eq!(criteria.hour_range, HourRange::new(7, 19).unwrap());
        assert_eq!(criteria.describe()[0], "Date Range: 01Mar20 - 31Mar20");
    }

    #[test]
    fn no_filters_select_everything() {
        let cli = Cli::try_parse_from(["nyc-accidents", "map"]).unwrap();
        assert_eq!(
            cli.filters.criteria(&DashboardConfig::default()),
            FilterCriteria::default()
        );
    }

    #[test]
    fn bad_hour_window_is_rejected() {
        assert!(Cli::try_parse_from(["nyc-accidents", "summary", "--hours", "20-3"]).is_err());
    }

    #[test]
    fn factor_command_sets_chart_settings() {
        let cli = Cli::try_parse_from([
            "nyc-accidents",
            "factors",
            "--vehicle",
            "vehicle2",
            "--y",
            "killed",
            "--top-n",
            "3",
            "--include-unspecified",
        ])
        .unwrap();
        let settings = cli.command.chart_settings(&DashboardConfig::default()).factors;
        assert_eq!(settings.factor, FactorField::Vehicle2);
        assert_eq!(settings.y, Measure::Killed);
        assert_eq!(settings.top_n, 3);
        assert!(!settings.exclude_unspecified);
    }

    #[test]
    fn top_n_falls_back_to_config() {
        let config = DashboardConfig::from_json(r#"{"top_n": 3}"#).unwrap();
        let cli = Cli::try_parse_from(["nyc-accidents", "factors"]).unwrap();
        assert_eq!(cli.command.chart_settings(&config).factors.top_n, 3);

        let cli = Cli::try_parse_from(["nyc-accidents", "factors", "--top-n", "7"]).unwrap();
        assert_eq!(cli.command.chart_settings(&config).factors.top_n, 7);
    }

    #[test]
    fn single_date_flag_selects_full_span() {
        let config = DashboardConfig::default();
        let cli = Cli::try_parse_from(["nyc-accidents", "summary", "--from", "2020-05-01"]).unwrap();
        assert_eq!(cli.filters.criteria(&config).date_range, config.full_range());

        let cli = Cli::try_parse_from([
            "nyc-accidents",
            "summary",
            "--from",
            "2020-06-01",
            "--to",
            "2020-05-01",
        ])
        .unwrap();
        assert_eq!(cli.filters.criteria(&config).date_range, config.full_range());
    }
}
