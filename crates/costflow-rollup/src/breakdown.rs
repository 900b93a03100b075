//! Breakdown series for dashboard charts
//!
//! Pure aggregations over an already filtered record set: per-level totals,
//! top-N rankings, a two-level pivot, the cumulative cost curve and
//! per-group cost distributions.

use costflow_record::{Level, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A label with its summed cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCost {
    /// Group label
    pub label: String,
    /// Summed cost
    pub cost: f64,
}

impl LabelCost {
    fn new(label: impl Into<String>, cost: f64) -> Self {
        Self {
            label: label.into(),
            cost,
        }
    }
}

/// Dense cost matrix with labelled rows and columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostMatrix {
    /// Row labels
    pub rows: Vec<String>,
    /// Column labels
    pub columns: Vec<String>,
    /// `values[row][column]`, 0.0 where no record contributes
    pub values: Vec<Vec<f64>>,
}

impl CostMatrix {
    /// Value for a labelled cell
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(self.values[r][c])
    }

    fn from_cells(rows: Vec<String>, columns: Vec<String>, cells: &BTreeMap<(&str, &str), f64>) -> Self {
        let values = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        cells
                            .get(&(row.as_str(), col.as_str()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();
        Self {
            rows,
            columns,
            values,
        }
    }
}

/// One step of the cumulative cost curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// 1-based rank after sorting by cost descending
    pub rank: usize,
    /// Cost of the record at this rank
    pub cost: f64,
    /// Running total up to and including this rank
    pub cumulative: f64,
    /// Running total as a percentage of the overall total
    pub percent: f64,
}

/// Cost distribution of one group (box plot input)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Group label
    pub label: String,
    /// Number of records
    pub count: usize,
    /// Smallest cost
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median cost
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest cost
    pub max: f64,
    /// Mean cost
    pub mean: f64,
    /// Sample standard deviation (0.0 for a single record)
    pub std_dev: f64,
}

fn descending(a: &LabelCost, b: &LabelCost) -> Ordering {
    b.cost.total_cmp(&a.cost).then_with(|| a.label.cmp(&b.label))
}

fn group_costs<'a>(records: &[&'a Record], level: Level) -> BTreeMap<&'a str, f64> {
    let mut groups = BTreeMap::new();
    for record in records {
        *groups.entry(record.level(level)).or_insert(0.0) += record.cost();
    }
    groups
}

/// Summed cost per value of a level, largest first (ties by label)
#[must_use]
pub fn level_totals(records: &[&Record], level: Level) -> Vec<LabelCost> {
    let mut totals: Vec<LabelCost> = group_costs(records, level)
        .into_iter()
        .map(|(label, cost)| LabelCost::new(label, cost))
        .collect();
    totals.sort_by(descending);
    totals
}

/// The `n` most expensive values of a level
#[must_use]
pub fn top_n(records: &[&Record], level: Level, n: usize) -> Vec<LabelCost> {
    let mut totals = level_totals(records, level);
    totals.truncate(n);
    totals
}

/// The `n` most expensive values plus one bucket holding the rest
///
/// The bucket is only added when the remainder is positive.
#[must_use]
pub fn top_n_with_other(
    records: &[&Record],
    level: Level,
    n: usize,
    other_label: &str,
) -> Vec<LabelCost> {
    let mut totals = level_totals(records, level);
    if totals.len() <= n {
        return totals;
    }
    let rest: f64 = totals.split_off(n).iter().map(|t| t.cost).sum();
    if rest > 0.0 {
        totals.push(LabelCost::new(other_label, rest));
    }
    totals
}

/// Summed cost for every `(row_level, col_level)` combination
///
/// Rows and columns are sorted labels; missing combinations are 0.0.
#[must_use]
pub fn pivot(records: &[&Record], row_level: Level, col_level: Level) -> CostMatrix {
    let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for record in records {
        *cells
            .entry((record.level(row_level), record.level(col_level)))
            .or_insert(0.0) += record.cost();
    }

    let rows: Vec<String> = group_costs(records, row_level)
        .into_keys()
        .map(str::to_string)
        .collect();
    let columns: Vec<String> = group_costs(records, col_level)
        .into_keys()
        .map(str::to_string)
        .collect();

    CostMatrix::from_cells(rows, columns, &cells)
}

/// Cost of the top `n` series groups across the top `n` axis groups
///
/// Rows are `series_level` values and columns `axis_level` values, both in
/// descending total-cost order.
#[must_use]
pub fn radar(records: &[&Record], axis_level: Level, series_level: Level, n: usize) -> CostMatrix {
    let rows: Vec<String> = top_n(records, series_level, n)
        .into_iter()
        .map(|t| t.label)
        .collect();
    let columns: Vec<String> = top_n(records, axis_level, n)
        .into_iter()
        .map(|t| t.label)
        .collect();

    let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for record in records {
        *cells
            .entry((record.level(series_level), record.level(axis_level)))
            .or_insert(0.0) += record.cost();
    }

    CostMatrix::from_cells(rows, columns, &cells)
}

/// Cumulative cost curve over records sorted by cost descending
#[must_use]
pub fn cumulative(records: &[&Record]) -> Vec<CumulativePoint> {
    let mut costs: Vec<f64> = records.iter().map(|r| r.cost()).collect();
    costs.sort_by(|a, b| b.total_cmp(a));
    let total: f64 = costs.iter().sum();

    let mut running = 0.0;
    costs
        .into_iter()
        .enumerate()
        .map(|(i, cost)| {
            running += cost;
            CumulativePoint {
                rank: i + 1,
                cost,
                cumulative: running,
                percent: if total == 0.0 { 0.0 } else { running / total * 100.0 },
            }
        })
        .collect()
}

/// Cost distribution per value of a level, sorted by label
#[must_use]
pub fn distribution_by(records: &[&Record], level: Level) -> Vec<Distribution> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups.entry(record.level(level)).or_default().push(record.cost());
    }

    groups
        .into_iter()
        .map(|(label, mut costs)| {
            costs.sort_by(f64::total_cmp);
            describe(label, &costs)
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn describe(label: &str, sorted: &[f64]) -> Distribution {
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std_dev = if count > 1 {
        let var = sorted.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };

    Distribution {
        label: label.to_string(),
        count,
        min: sorted[0],
        q1: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q3: quantile(sorted, 0.75),
        max: sorted[count - 1],
        mean,
        std_dev,
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
