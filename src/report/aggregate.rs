//! Ranks model results across both variants and pairs them into improvement
//! records. Pure functions of their input; no randomness.

use crate::evaluation::harness::ModelResult;
use crate::types::model_kind::ModelKind;
use crate::types::variant::Variant;
use log::warn;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// Percentage change of one metric, or `Undefined` when the baseline is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Improvement {
    Percent(f64),
    Undefined,
}

impl Improvement {
    /// `(numerator · 100) / base`, scaled before dividing so that exact decimal
    /// inputs give exact percentages.
    fn ratio(scaled_numerator: f64, base: f64) -> Self {
        if base == 0.0 || !base.is_finite() {
            return Improvement::Undefined;
        }
        let value = scaled_numerator / base;
        if value.is_finite() {
            Improvement::Percent(value)
        } else {
            Improvement::Undefined
        }
    }

    /// Reduction of RMSE relative to the baseline, in percent.
    ///
    /// ```
    /// use climalag::Improvement;
    ///
    /// assert_eq!(Improvement::rmse(2.0, 1.5), Improvement::Percent(25.0));
    /// assert_eq!(Improvement::rmse(0.0, 1.5), Improvement::Undefined);
    /// ```
    pub fn rmse(baseline: f64, lagged: f64) -> Self {
        Self::ratio(baseline * 100.0 - lagged * 100.0, baseline)
    }

    /// Gain of R² relative to the baseline, in percent.
    ///
    /// ```
    /// use climalag::Improvement;
    ///
    /// assert_eq!(Improvement::r2(0.5, 0.6), Improvement::Percent(20.0));
    /// ```
    pub fn r2(baseline: f64, lagged: f64) -> Self {
        Self::ratio(lagged * 100.0 - baseline * 100.0, baseline)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Improvement::Percent(v) => Some(*v),
            Improvement::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.value().is_some()
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Improvement::Percent(v) => write!(f, "{:+.2}%", v),
            Improvement::Undefined => f.write_str("undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementRecord {
    pub kind: ModelKind,
    pub rmse: Improvement,
    pub r2: Improvement,
}

impl ImprovementRecord {
    pub fn model_name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// All results of a study, scored rows ranked by descending R², ascending
/// RMSE, then model name. Failed rows follow in name order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonTable {
    rows: Vec<ModelResult>,
}

impl ComparisonTable {
    pub fn rank(results: &[ModelResult]) -> Self {
        let (mut scored, mut failed): (Vec<ModelResult>, Vec<ModelResult>) =
            results.iter().cloned().partition(ModelResult::is_scored);

        scored.sort_by_cached_key(|r| {
            let (r2, rmse) = r.metrics().map_or((f64::NAN, f64::NAN), |m| (m.r2, m.rmse));
            (Reverse(OrderedFloat(r2)), OrderedFloat(rmse), r.model_name())
        });
        failed.sort_by_cached_key(ModelResult::model_name);

        scored.extend(failed);
        Self { rows: scored }
    }

    pub fn rows(&self) -> &[ModelResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Top-ranked scored result.
    pub fn best(&self) -> Option<&ModelResult> {
        self.rows.first().filter(|r| r.is_scored())
    }

    pub fn scored(&self) -> impl Iterator<Item = &ModelResult> {
        self.rows.iter().filter(|r| r.is_scored())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ModelResult> {
        self.rows.iter().filter(|r| !r.is_scored())
    }
}

/// One record per model kind scored in both variants, in roster order.
pub fn improvements(results: &[ModelResult]) -> Vec<ImprovementRecord> {
    let mut paired: BTreeMap<ModelKind, (Option<&ModelResult>, Option<&ModelResult>)> =
        BTreeMap::new();
    for result in results.iter().filter(|r| r.is_scored()) {
        let entry = paired.entry(result.kind).or_default();
        match result.variant {
            Variant::Baseline => entry.0 = Some(result),
            Variant::LagAugmented => entry.1 = Some(result),
        }
    }

    paired
        .into_iter()
        .filter_map(|(kind, pair)| match pair {
            (Some(base), Some(lag)) => {
                let (base, lag) = (base.metrics()?, lag.metrics()?);
                let record = ImprovementRecord {
                    kind,
                    rmse: Improvement::rmse(base.rmse, lag.rmse),
                    r2: Improvement::r2(base.r2, lag.r2),
                };
                if !record.rmse.is_defined() || !record.r2.is_defined() {
                    warn!(
                        "{}: improvement undefined (baseline RMSE {}, R2 {})",
                        kind, base.rmse, base.r2
                    );
                }
                Some(record)
            }
            _ => None,
        })
        .collect()
}
