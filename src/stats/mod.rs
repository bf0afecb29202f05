//! Statistics module - headline counts and medians

mod calculator;

pub use calculator::{StatsCalculator, Summary};
