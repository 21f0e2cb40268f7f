//! Capital weights for a two-leg hedged spread.
//!
//! One share of `y` is hedged by `beta` shares of `x`, so the capital split
//! at each timestamp is
//!
//! ```text
//! w_x = beta * x / (beta * x + y)
//! w_y =        y / (beta * x + y)
//! ```
//!
//! using the same `beta` series the strategy built its spread from. Weights
//! sum to one whatever the magnitude of `beta`.

use super::Portfolio;
use crate::domain::error::SigtraderError;
use crate::domain::frame::{PriceMatrix, WeightMatrix};
use crate::domain::strategy::Signals;

#[derive(Debug, Clone, Copy, Default)]
pub struct HedgeRatioWeights;

impl Portfolio for HedgeRatioWeights {
    fn name(&self) -> &str {
        "hedge_ratio_weights"
    }

    fn weights(
        &self,
        signals: &Signals,
        prices: &PriceMatrix,
    ) -> Result<WeightMatrix, SigtraderError> {
        if prices.n_symbols() != 2 {
            return Err(SigtraderError::configuration(format!(
                "hedge_ratio_weights needs exactly two symbols, got {}",
                prices.n_symbols()
            )));
        }
        let Some(beta) = signals.hedge_ratio.as_ref() else {
            return Err(SigtraderError::configuration(
                "hedge_ratio_weights needs a strategy that estimates a hedge ratio",
            ));
        };
        if beta.index() != prices.index() {
            return Err(SigtraderError::Data {
                reason: "hedge ratio is not aligned with prices".into(),
            });
        }

        let mut weights = WeightMatrix::empty_like(prices);
        for t in 0..prices.len() {
            let (Some(b), Some(x), Some(y)) = (beta.get(t), prices.get(t, 0), prices.get(t, 1))
            else {
                continue;
            };
            let capital = b * x + y;
            if capital == 0.0 || !capital.is_finite() {
                continue;
            }
            weights.set_row(t, &[Some(b * x / capital), Some(y / capital)]);
        }
        Ok(weights)
    }
}
