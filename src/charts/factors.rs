//! Top Contributing Factors Chart Data
//! Ranks contributing factors by a measure and splits the leaders by a legend field.

use super::axes::{FactorField, Legend, Measure};
use super::ChartError;
use crate::data::{any_of, AccidentTable};
use crate::schema::UNSPECIFIED;
use log::debug;
use polars::prelude::*;

/// Number of factors shown by default.
pub const DEFAULT_TOP_N: usize = 10;

/// Input of the stacked bar chart.
///
/// Columns: `[factor, legend, y]`, sorted by `y` descending.
#[derive(Debug, Clone)]
pub struct TopFactors {
    pub factor: FactorField,
    pub y: Measure,
    pub legend: Legend,
    /// The leading factors, highest total first.
    pub factors: Vec<String>,
    pub frame: DataFrame,
}

impl TopFactors {
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Rank factors by total `y` and break the top `top_n` down by `legend`.
///
/// Rows without a recorded factor never count. Equal totals are ranked by
/// factor name so the selection is stable. The breakdown drops rows whose
/// legend value is null.
pub fn build_top_factors(
    table: &AccidentTable,
    factor: FactorField,
    y: Measure,
    legend: Legend,
    top_n: usize,
    exclude_unspecified: bool,
) -> Result<TopFactors, ChartError> {
    let factor_name = factor.field().label();
    let y_name = y.field().label();
    let legend_name = legend.field().label();

    let mut has_factor = col(factor_name).is_not_null();
    if exclude_unspecified {
        has_factor = has_factor.and(col(factor_name).neq(lit(UNSPECIFIED)));
    }
    let matching = table.lazy().filter(has_factor);

    let limit = IdxSize::try_from(top_n).unwrap_or(IdxSize::MAX);
    let totals = matching
        .clone()
        .group_by([col(factor_name)])
        .agg([col(y_name).sum()])
        .sort_by_exprs(
            [col(y_name), col(factor_name)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(limit)
        .collect()?;

    let factors: Vec<String> = totals
        .column(factor_name)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    // No leading factors still yields the breakdown columns
    let in_top = any_of(factor.field(), factors.iter().map(String::as_str)).unwrap_or(lit(false));

    let frame = matching
        .filter(in_top.and(col(legend_name).is_not_null()))
        .group_by([col(factor_name), col(legend_name)])
        .agg([col(y_name).sum()])
        .sort_by_exprs(
            [col(y_name), col(factor_name), col(legend_name)],
            SortMultipleOptions::default().with_order_descending_multi([true, false, false]),
        )
        .collect()?;

    debug!(
        "Top {} factors by {:?}: {} bars",
        factors.len(),
        y,
        frame.height()
    );
    Ok(TopFactors {
        factor,
        y,
        legend,
        factors,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{row, table};
    use crate::schema::Field;
    use std::collections::BTreeMap;

    fn totals(top: &TopFactors) -> BTreeMap<String, i64> {
        let df = &top.frame;
        let factors = df.column(top.factor.field().label()).unwrap().str().unwrap().clone();
        let values = df.column(top.y.field().label()).unwrap().i64().unwrap().clone();
        let mut out = BTreeMap::new();
        for (f, v) in factors.into_iter().zip(values.into_iter()) {
            *out.entry(f.unwrap().to_string()).or_insert(0) += v.unwrap();
        }
        out
    }

    fn abc_table() -> AccidentTable {
        table(&[
            row().factor1(Some("A")),
            row().factor1(Some("A")),
            row().factor1(Some("B")),
            row().factor1(Some("Unspecified")),
            row().factor1(Some("C")),
        ])
    }

    #[test]
    fn keeps_top_n_and_breaks_ties_by_name() {
        let top = build_top_factors(
            &abc_table(),
            FactorField::Vehicle1,
            Measure::Accidents,
            Legend::Area,
            2,
            true,
        )
        .unwrap();
        assert_eq!(top.factors, vec!["A", "B"]);
        assert_eq!(
            totals(&top),
            BTreeMap::from([("A".to_string(), 2), ("B".to_string(), 1)])
        );
    }

    #[test]
    fn unspecified_can_be_kept() {
        let top = build_top_factors(
            &abc_table(),
            FactorField::Vehicle1,
            Measure::Accidents,
            Legend::Area,
            DEFAULT_TOP_N,
            false,
        )
        .unwrap();
        assert_eq!(top.factors, vec!["A", "B", "C", "Unspecified"]);
    }

    #[test]
    fn breakdown_is_split_by_legend_and_sorted_descending() {
        let t = table(&[
            row().factor2(Some("Speeding")).borough(Some("QUEENS")).injured("3"),
            row().factor2(Some("Speeding")).borough(Some("BRONX")).injured("1"),
            row().factor2(Some("Glare")).borough(Some("BRONX")).injured("2"),
            row().factor2(Some("Glare")).borough(None).injured("5"),
            row().factor2(None).borough(Some("BRONX")).injured("9"),
        ]);
        let top = build_top_factors(
            &t,
            FactorField::Vehicle2,
            Measure::Injured,
            Legend::Area,
            DEFAULT_TOP_N,
            true,
        )
        .unwrap();

        // Glare ranks first on totals, null borough included
        assert_eq!(top.factors, vec!["Glare", "Speeding"]);
        let injured: Vec<i64> = top
            .frame
            .column(Measure::Injured.field().label())
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(injured, vec![3, 2, 1]);
    }

    #[test]
    fn never_returns_more_than_top_n_factors() {
        let t = table(&[
            row().factor1(Some("A")),
            row().factor1(Some("B")),
            row().factor1(Some("C")),
            row().factor1(Some("D")),
        ]);
        for n in 0..6 {
            let top = build_top_factors(
                &t,
                FactorField::Vehicle1,
                Measure::Accidents,
                Legend::Severity,
                n,
                true,
            )
            .unwrap();
            assert!(top.factors.len() <= n);
            assert!(totals(&top).len() <= n);
            for f in &top.factors {
                assert!(["A", "B", "C", "D"].contains(&f.as_str()));
            }
        }
    }

    #[test]
    fn empty_input_gives_empty_view() {
        let top = build_top_factors(
            &AccidentTable::default(),
            FactorField::Vehicle1,
            Measure::Killed,
            Legend::Severity,
            DEFAULT_TOP_N,
            true,
        )
        .unwrap();
        assert!(top.is_empty());
        assert!(top.factors.is_empty());
        let names: Vec<&str> = top.frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                Field::Vehicle1Factor.label(),
                Field::Severity.label(),
                Field::PersonsKilled.label()
            ]
        );
    }

    #[test]
    fn zero_top_n_keeps_breakdown_columns() {
        let top = build_top_factors(
            &abc_table(),
            FactorField::Vehicle1,
            Measure::Accidents,
            Legend::Area,
            0,
            true,
        )
        .unwrap();
        assert!(top.factors.is_empty());
        assert!(top.is_empty());
        assert_eq!(top.frame.width(), 3);
        assert!(top.frame.column(Field::Borough.label()).is_ok());
    }
}
