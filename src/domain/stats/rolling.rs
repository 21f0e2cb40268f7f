//! Trailing-window statistics.
//!
//! Windows are positional and include the current point, so the first
//! `window - 1` outputs are undefined. Inside a window, missing values are
//! skipped: a mean needs one observation, a sample std needs two.

use super::{mean_of, sample_std_of};
use crate::domain::timeseries::TimeSeries;

fn rolling(
    series: &TimeSeries,
    window: usize,
    stat: impl Fn(&[Option<f64>]) -> Option<f64>,
) -> TimeSeries {
    let values = series.values();
    let warmup = window.saturating_sub(1);
    let out = (0..values.len())
        .map(|i| {
            if window == 0 || i < warmup {
                None
            } else {
                stat(&values[i + 1 - window..=i])
            }
        })
        .collect();
    series.with_values(out)
}

pub fn rolling_mean(series: &TimeSeries, window: usize) -> TimeSeries {
    rolling(series, window, mean_of)
}

/// Sample (N-1) standard deviation over each trailing window.
pub fn rolling_std(series: &TimeSeries, window: usize) -> TimeSeries {
    rolling(series, window, sample_std_of)
}

/// Running maximum. Missing inputs stay missing but do not reset the peak.
pub fn rolling_max(series: &TimeSeries) -> TimeSeries {
    let mut peak: Option<f64> = None;
    let out = series
        .values()
        .iter()
        .map(|v| {
            let v = (*v)?;
            let p = peak.map_or(v, |p| p.max(v));
            peak = Some(p);
            Some(p)
        })
        .collect();
    series.with_values(out)
}
