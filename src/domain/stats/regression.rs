//! Ordinary least squares for `y = alpha + beta * x`.

use super::STD_TOLERANCE;
use crate::domain::error::SigtraderError;
use crate::domain::timeseries::TimeSeries;

/// Intercept and slope per trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingOls {
    pub alpha: TimeSeries,
    pub beta: TimeSeries,
}

fn fit(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (sxx, sxy) = pairs.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        (sxx + (x - mx).powi(2), sxy + (x - mx) * (y - my))
    });
    // a constant regressor has no slope, even when its mean is inexact
    if (sxx / n).sqrt() <= STD_TOLERANCE * mx.abs().max(1.0) {
        return None;
    }
    let beta = sxy / sxx;
    Some((my - beta * mx, beta))
}

fn complete_pairs(y: &[Option<f64>], x: &[Option<f64>]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect()
}

fn check_aligned(y: &TimeSeries, x: &TimeSeries) -> Result<(), SigtraderError> {
    if y.index() != x.index() {
        return Err(SigtraderError::Data {
            reason: "regression inputs must share one index".into(),
        });
    }
    Ok(())
}

/// Full-sample fit over timestamps where both series are present.
///
/// Returns `(alpha, beta)`, or `None` with fewer than two complete points or
/// a constant `x`.
pub fn ols_alpha_beta(
    y: &TimeSeries,
    x: &TimeSeries,
) -> Result<Option<(f64, f64)>, SigtraderError> {
    check_aligned(y, x)?;
    Ok(fit(&complete_pairs(y.values(), x.values())))
}

/// Refit over each trailing window of `window` timestamps (current point
/// included). The first `window - 1` fits are undefined.
pub fn rolling_ols(
    y: &TimeSeries,
    x: &TimeSeries,
    window: usize,
) -> Result<RollingOls, SigtraderError> {
    check_aligned(y, x)?;
    let (ys, xs) = (y.values(), x.values());
    let mut alpha = Vec::with_capacity(ys.len());
    let mut beta = Vec::with_capacity(ys.len());
    for i in 0..ys.len() {
        let coef = if window == 0 || i + 1 < window {
            None
        } else {
            let start = i + 1 - window;
            fit(&complete_pairs(&ys[start..=i], &xs[start..=i]))
        };
        alpha.push(coef.map(|(a, _)| a));
        beta.push(coef.map(|(_, b)| b));
    }
    Ok(RollingOls {
        alpha: y.with_values(alpha),
        beta: y.with_values(beta),
    })
}

/// Mean-reversion half-life in periods: regress the change of the spread on
/// its previous level and return `-ln 2 / slope`. Undefined unless the slope
/// is negative.
pub fn half_life(spread: &TimeSeries) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = spread
        .values()
        .windows(2)
        .filter_map(|w| {
            let (prev, curr) = (w[0]?, w[1]?);
            Some((prev, curr - prev))
        })
        .collect();
    let (_, slope) = fit(&pairs)?;
    if slope < 0.0 {
        Some(-std::f64::consts::LN_2 / slope)
    } else {
        None
    }
}
