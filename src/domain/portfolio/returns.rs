//! Realised returns with a strict one-period lag.
//!
//! ```text
//! asset_return[t]     = price[t] / price[t-1] - 1
//! portfolio_return[t] = sum over symbols of weight[t-1] * asset_return[t] * signal[t-1]
//! ```
//!
//! A symbol contributes at `t` only when all three terms are defined. With
//! no contributing symbol the portfolio return is missing, and `t = 0` is
//! always missing.

use super::forward_fill;
use crate::domain::error::SigtraderError;
use crate::domain::frame::{Frame, PriceMatrix, SignalMatrix, WeightMatrix};
use crate::domain::timeseries::TimeSeries;

/// Simple period returns per symbol. Missing where either price is missing
/// or the previous price is zero.
pub fn asset_returns(prices: &PriceMatrix) -> Frame<f64> {
    let mut out = Frame::empty_like(prices);
    for col in 0..prices.n_symbols() {
        for t in 1..prices.len() {
            let r = match (prices.get(t - 1, col), prices.get(t, col)) {
                (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                _ => None,
            };
            out.set(t, col, r);
        }
    }
    out
}

pub fn backtest_portfolio(
    prices: &PriceMatrix,
    weights: &WeightMatrix,
    signals: &SignalMatrix,
) -> Result<TimeSeries, SigtraderError> {
    if !weights.is_aligned_with(prices) || !signals.is_aligned_with(prices) {
        return Err(SigtraderError::Data {
            reason: "prices, weights and signals must share index and symbols".into(),
        });
    }
    let returns = asset_returns(prices);
    let signals = forward_fill(signals);

    let mut values = Vec::with_capacity(prices.len());
    if !prices.is_empty() {
        values.push(None);
    }
    for t in 1..prices.len() {
        let mut total = None;
        for col in 0..prices.n_symbols() {
            let (Some(w), Some(r), Some(s)) = (
                weights.get(t - 1, col),
                returns.get(t, col),
                signals.get(t - 1, col),
            ) else {
                continue;
            };
            *total.get_or_insert(0.0) += w * r * s.direction();
        }
        values.push(total);
    }

    TimeSeries::new(prices.index().to_vec(), values)
}
