//! Dated numeric series with missing observations.

use crate::domain::error::SigtraderError;
use chrono::NaiveDate;

/// Ordered `(date, value)` pairs on a strictly increasing index.
///
/// A `None` value is a missing observation for that period. Statistics that
/// compute means or variances skip missing values rather than zero-filling them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    pub fn new(index: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self, SigtraderError> {
        if index.len() != values.len() {
            return Err(SigtraderError::Data {
                reason: format!(
                    "series index has {} dates but {} values",
                    index.len(),
                    values.len()
                ),
            });
        }
        validate_index(&index)?;
        Ok(Self { index, values })
    }

    /// Build from raw observations, treating non-finite values as missing.
    pub fn from_observations(
        index: Vec<NaiveDate>,
        observations: Vec<f64>,
    ) -> Result<Self, SigtraderError> {
        let values = observations
            .into_iter()
            .map(|v| if v.is_finite() { Some(v) } else { None })
            .collect();
        Self::new(index, values)
    }

    /// Index already validated by a `Frame`.
    pub(crate) fn from_validated(index: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self { index, values }
    }

    /// Same index, new values. The caller guarantees the lengths match.
    pub(crate) fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(self.index.len(), values.len());
        Self {
            index: self.index.clone(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    pub fn date(&self, i: usize) -> Option<NaiveDate> {
        self.index.get(i).copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.index.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.index.last().copied()
    }

    /// Value observed on `date`, if the date is on the index and not missing.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.index
            .binary_search(&date)
            .ok()
            .and_then(|i| self.values[i])
    }

    /// Number of non-missing observations.
    pub fn usable_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// The last non-missing value.
    pub fn last_value(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Apply `f` to every present value; missing stays missing.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_values(self.values.iter().map(|v| v.map(&f)).collect())
    }

    /// Realign onto `index`, leaving dates absent from this series missing.
    pub fn reindex(&self, index: &[NaiveDate]) -> Self {
        let values = index.iter().map(|&d| self.value_on(d)).collect();
        Self {
            index: index.to_vec(),
            values,
        }
    }

    /// Pointwise `self - other` over the shared index; missing if either is.
    pub fn sub(&self, other: &TimeSeries) -> Result<Self, SigtraderError> {
        if self.index != other.index {
            return Err(SigtraderError::Data {
                reason: "cannot combine series with different indexes".into(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(a - b),
                _ => None,
            })
            .collect();
        Ok(self.with_values(values))
    }
}

pub(crate) fn validate_index(index: &[NaiveDate]) -> Result<(), SigtraderError> {
    if let Some(w) = index.windows(2).find(|w| w[0] >= w[1]) {
        return Err(SigtraderError::Data {
            reason: format!("index is not strictly increasing at {} -> {}", w[0], w[1]),
        });
    }
    Ok(())
}
