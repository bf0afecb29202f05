//! Column Schema Module
//! Names of the raw and derived accident columns and the fixed orderings used by every view.

use chrono::{NaiveDate, Weekday};
use clap::ValueEnum;
use polars::prelude::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Contributing-factor value the police use when no cause was recorded.
pub const UNSPECIFIED: &str = "Unspecified";

/// First day covered by the published dataset.
pub fn dataset_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last day covered by the published dataset.
pub fn dataset_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 8, 29).unwrap_or(NaiveDate::MAX)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown column: {0}")]
    UnknownField(String),
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),
    #[error("Unknown day of week: {0}")]
    UnknownWeekday(String),
}

/// Every column the cleaned accident table can carry.
///
/// Labels are the title-cased forms of the source headers; derived columns
/// use the names shown on chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    CrashDate,
    CrashTime,
    Latitude,
    Longitude,
    ZipCode,
    Borough,
    OnStreet,
    CrossStreet,
    OffStreet,
    PersonsInjured,
    PersonsKilled,
    Vehicle1Factor,
    Vehicle2Factor,
    Vehicle1Type,
    Vehicle2Type,
    CollisionId,
    // Derived at load time
    NumAccidents,
    Datetime,
    DayOfWeek,
    HourOfDay,
    Month,
    Fatal,
    Injurious,
    Severity,
}

impl Field {
    /// Raw columns kept from the source file, in table order.
    pub const RAW: [Field; 16] = [
        Field::CrashDate,
        Field::CrashTime,
        Field::Latitude,
        Field::Longitude,
        Field::ZipCode,
        Field::Borough,
        Field::OnStreet,
        Field::CrossStreet,
        Field::OffStreet,
        Field::PersonsInjured,
        Field::PersonsKilled,
        Field::Vehicle1Factor,
        Field::Vehicle2Factor,
        Field::Vehicle1Type,
        Field::Vehicle2Type,
        Field::CollisionId,
    ];

    /// Columns appended by the cleaning pass, in table order.
    pub const DERIVED: [Field; 8] = [
        Field::NumAccidents,
        Field::Datetime,
        Field::DayOfWeek,
        Field::HourOfDay,
        Field::Month,
        Field::Fatal,
        Field::Injurious,
        Field::Severity,
    ];

    /// Column manifest of the spreadsheet export.
    pub const EXPORT: [Field; 21] = [
        Field::CrashDate,
        Field::CrashTime,
        Field::Month,
        Field::DayOfWeek,
        Field::HourOfDay,
        Field::Latitude,
        Field::Longitude,
        Field::Severity,
        Field::NumAccidents,
        Field::PersonsInjured,
        Field::PersonsKilled,
        Field::Borough,
        Field::ZipCode,
        Field::OnStreet,
        Field::CrossStreet,
        Field::OffStreet,
        Field::Vehicle1Factor,
        Field::Vehicle2Factor,
        Field::Vehicle1Type,
        Field::Vehicle2Type,
        Field::CollisionId,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Field::CrashDate => "Crash Date",
            Field::CrashTime => "Crash Time",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::ZipCode => "Zip Code",
            Field::Borough => "Borough",
            Field::OnStreet => "On Street Name",
            Field::CrossStreet => "Cross Street Name",
            Field::OffStreet => "Off Street Name",
            Field::PersonsInjured => "Number Of Persons Injured",
            Field::PersonsKilled => "Number Of Persons Killed",
            Field::Vehicle1Factor => "Contributing Factor Vehicle 1",
            Field::Vehicle2Factor => "Contributing Factor Vehicle 2",
            Field::Vehicle1Type => "Vehicle Type Code 1",
            Field::Vehicle2Type => "Vehicle Type Code 2",
            Field::CollisionId => "Collision_Id",
            Field::NumAccidents => "Number of Accidents",
            Field::Datetime => "Crash_Datetime",
            Field::DayOfWeek => "Day Of Week",
            Field::HourOfDay => "Crash Time (Hour Of Day)",
            Field::Month => "Month",
            Field::Fatal => "Fatal",
            Field::Injurious => "Injurious",
            Field::Severity => "Severity",
        }
    }

    /// Type of the column in the cleaned table.
    pub fn dtype(self) -> DataType {
        match self {
            Field::Latitude | Field::Longitude => DataType::Float64,
            Field::PersonsInjured | Field::PersonsKilled | Field::NumAccidents => DataType::Int64,
            Field::Datetime => DataType::Datetime(TimeUnit::Milliseconds, None),
            Field::HourOfDay | Field::Month => DataType::Int32,
            Field::Fatal | Field::Injurious => DataType::Boolean,
            _ => DataType::String,
        }
    }

    pub fn from_label(label: &str) -> Option<Field> {
        Self::RAW
            .iter()
            .chain(Self::DERIVED.iter())
            .copied()
            .find(|f| f.label() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_label(s).ok_or_else(|| SchemaError::UnknownField(s.to_string()))
    }
}

/// Convert a header to the title-case label form.
///
/// Matches the usual "title" rule: a letter is upper-cased when it follows a
/// non-letter, every other letter is lower-cased. `COLLISION_ID` becomes
/// `Collision_Id`.
pub fn title_case(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut prev_is_letter = false;
    for ch in header.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Worst outcome of an accident. Ordered from most to least severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum Severity {
    Fatal,
    Injurious,
    Safe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Fatal, Severity::Injurious, Severity::Safe];

    /// Fatal takes precedence over Injurious, which takes precedence over Safe.
    pub fn classify(injured: i64, killed: i64) -> Severity {
        if killed > 0 {
            Severity::Fatal
        } else if injured > 0 {
            Severity::Injurious
        } else {
            Severity::Safe
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal",
            Severity::Injurious => "Injurious",
            Severity::Safe => "Safe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemaError::UnknownSeverity(s.to_string()))
    }
}

/// Day of the week, ordered Monday first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Position in the week, Monday = 0 .. Sunday = 6.
    pub const fn sort_key(self) -> u32 {
        self as u32
    }

    /// Sort key for a weekday name as stored in the table.
    pub fn sort_key_of(name: &str) -> Option<u32> {
        name.parse::<DayOfWeek>().ok().map(DayOfWeek::sort_key)
    }

    pub fn from_chrono(day: Weekday) -> DayOfWeek {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayOfWeek {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemaError::UnknownWeekday(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_source_headers() {
        assert_eq!(title_case("CRASH DATE"), "Crash Date");
        assert_eq!(title_case("NUMBER OF PERSONS INJURED"), "Number Of Persons Injured");
        assert_eq!(title_case("COLLISION_ID"), "Collision_Id");
        assert_eq!(title_case("VEHICLE TYPE CODE 1"), "Vehicle Type Code 1");
        assert_eq!(title_case("crash time"), "Crash Time");
    }

    #[test]
    fn every_raw_label_round_trips_through_title_case() {
        for field in Field::RAW {
            let shouted = field.label().to_uppercase();
            assert_eq!(title_case(&shouted), field.label(), "{field:?}");
        }
    }

    #[test]
    fn severity_precedence() {
        assert_eq!(Severity::classify(0, 1), Severity::Fatal);
        assert_eq!(Severity::classify(3, 2), Severity::Fatal);
        assert_eq!(Severity::classify(2, 0), Severity::Injurious);
        assert_eq!(Severity::classify(0, 0), Severity::Safe);
    }

    #[test]
    fn weekday_keys_start_on_monday() {
        assert_eq!(DayOfWeek::sort_key_of("Monday"), Some(0));
        assert_eq!(DayOfWeek::sort_key_of("Sunday"), Some(6));
        assert_eq!(DayOfWeek::sort_key_of("Funday"), None);
        assert_eq!(DayOfWeek::from_chrono(Weekday::Wed), DayOfWeek::Wednesday);
    }

    #[test]
    fn export_manifest_only_names_known_columns() {
        for field in Field::EXPORT {
            assert_eq!(Field::from_label(field.label()), Some(field));
        }
        assert!(!Field::EXPORT.contains(&Field::Datetime));
        assert_eq!("Severity".parse::<Field>(), Ok(Field::Severity));
        assert!("Nope".parse::<Field>().is_err());
    }
}
