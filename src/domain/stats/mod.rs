//! Time-series statistics over return and price series.
//!
//! Every function is pure. Missing observations are skipped by means and
//! variances, count as "no change" when compounding, and propagate as missing
//! through rolling windows that lack enough observations. Degenerate results
//! (zero volatility, too few points) are `None` rather than errors.

pub mod drawdown;
pub mod regression;
pub mod rolling;

pub use drawdown::{
    max_drawdown, max_drawdown_duration, rolling_drawdown, rolling_drawdown_duration,
    sort_drawdowns, DrawdownEpisode,
};
pub use regression::{half_life, ols_alpha_beta, rolling_ols, RollingOls};
pub use rolling::{rolling_max, rolling_mean, rolling_std};

use crate::domain::error::SigtraderError;
use crate::domain::frequency::Frequency;
use crate::domain::timeseries::TimeSeries;
use chrono::{Datelike, NaiveDate};

pub(crate) fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Sample standard deviation (divides by N-1); needs two observations.
///
/// A deviation within rounding error of the mean's magnitude is reported as
/// exactly zero, so constant series stay degenerate.
pub(crate) fn sample_std_of(values: &[Option<f64>]) -> Option<f64> {
    let n = values.iter().flatten().count();
    if n < 2 {
        return None;
    }
    let mean = mean_of(values)?;
    let ss: f64 = values.iter().flatten().map(|v| (v - mean).powi(2)).sum();
    let sd = (ss / (n - 1) as f64).sqrt();
    if sd <= STD_TOLERANCE * mean.abs().max(1.0) {
        Some(0.0)
    } else {
        Some(sd)
    }
}

pub(crate) const STD_TOLERANCE: f64 = 1e-12;

pub fn mean(series: &TimeSeries) -> Option<f64> {
    mean_of(series.values())
}

pub fn sample_std(series: &TimeSeries) -> Option<f64> {
    sample_std_of(series.values())
}

/// Running `Π(1+r) - 1`. A missing return compounds as a factor of 1, so the
/// result is defined at every timestamp and starts at 0 when the first return
/// is undefined.
pub fn cumulate(returns: &TimeSeries) -> TimeSeries {
    let mut growth = 1.0;
    let values = returns
        .values()
        .iter()
        .map(|r| {
            if let Some(r) = r {
                growth *= 1.0 + r;
            }
            Some(growth - 1.0)
        })
        .collect();
    returns.with_values(values)
}

/// Final value of [`cumulate`].
pub fn total_return(returns: &TimeSeries) -> Option<f64> {
    cumulate(returns).last_value()
}

pub fn annualised_return(returns: &TimeSeries, frequency: Frequency) -> Option<f64> {
    mean(returns).map(|m| frequency.periods_per_year() * m)
}

pub fn annualised_volatility(returns: &TimeSeries, frequency: Frequency) -> Option<f64> {
    sample_std(returns).map(|s| frequency.periods_per_year().sqrt() * s)
}

/// `(annualised_return - rfrate) / annualised_volatility`; `None` when the
/// volatility is undefined or zero.
pub fn sharpe_ratio(returns: &TimeSeries, frequency: Frequency, rfrate: f64) -> Option<f64> {
    let mu = annualised_return(returns, frequency)?;
    let sigma = annualised_volatility(returns, frequency)?;
    ratio(mu - rfrate, sigma)
}

/// Sharpe ratio of `returns - benchmark_returns` with a zero hurdle.
pub fn information_ratio(
    returns: &TimeSeries,
    benchmark_returns: &TimeSeries,
    frequency: Frequency,
) -> Result<Option<f64>, SigtraderError> {
    let active = returns.sub(benchmark_returns)?;
    Ok(sharpe_ratio(&active, frequency, 0.0))
}

/// Sharpe ratio over a trailing window of `window` periods.
pub fn rolling_sharpe(
    returns: &TimeSeries,
    frequency: Frequency,
    rfrate: f64,
    window: usize,
) -> TimeSeries {
    let n = frequency.periods_per_year();
    let mu = rolling_mean(returns, window);
    let sigma = rolling_std(returns, window);
    let values = mu
        .values()
        .iter()
        .zip(sigma.values())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => ratio(n * m - rfrate, n.sqrt() * s),
            _ => None,
        })
        .collect();
    returns.with_values(values)
}

/// Compound returns within calendar buckets of `period` (weeks, months or
/// years). Each bucket is stamped with its last date; buckets with no usable
/// return are missing. Daily and hourly buckets return the input unchanged.
pub fn aggregate_returns(returns: &TimeSeries, period: Frequency) -> TimeSeries {
    if matches!(period, Frequency::Daily | Frequency::Hourly) {
        return returns.clone();
    }
    let bucket = |d: NaiveDate| -> (i32, u32) {
        match period {
            Frequency::Weekly => {
                let w = d.iso_week();
                (w.year(), w.week())
            }
            Frequency::Monthly => (d.year(), d.month()),
            _ => (d.year(), 0),
        }
    };

    let mut index = Vec::new();
    let mut values: Vec<Option<f64>> = Vec::new();
    let mut current: Option<(i32, u32)> = None;
    for (date, r) in returns.iter() {
        let key = bucket(date);
        if current != Some(key) {
            index.push(date);
            values.push(None);
            current = Some(key);
        }
        if let Some(last) = index.last_mut() {
            *last = date;
        }
        if let (Some(r), Some(acc)) = (r, values.last_mut()) {
            *acc = Some((1.0 + acc.unwrap_or(0.0)) * (1.0 + r) - 1.0);
        }
    }
    TimeSeries::from_validated(index, values)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        Some(numerator / denominator)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::timeseries::TimeSeries;
    use chrono::NaiveDate;

    pub fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    pub fn ts(values: &[Option<f64>]) -> TimeSeries {
        TimeSeries::new((0..values.len()).map(day).collect(), values.to_vec()).unwrap()
    }

    pub fn ts_full(values: &[f64]) -> TimeSeries {
        ts(&values.iter().map(|&v| Some(v)).collect::<Vec<_>>())
    }
}
