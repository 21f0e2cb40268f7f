use super::Portfolio;
use crate::domain::error::SigtraderError;
use crate::domain::frame::{PriceMatrix, WeightMatrix};
use crate::domain::strategy::Signals;

/// `1/N` of capital on each of the N symbols at every timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeights;

impl Portfolio for EqualWeights {
    fn name(&self) -> &str {
        "equal_weights"
    }

    fn weights(
        &self,
        _signals: &Signals,
        prices: &PriceMatrix,
    ) -> Result<WeightMatrix, SigtraderError> {
        if prices.n_symbols() == 0 {
            return Err(SigtraderError::configuration(
                "equal_weights needs at least one symbol",
            ));
        }
        let w = 1.0 / prices.n_symbols() as f64;
        Ok(WeightMatrix::filled(prices.index(), prices.symbols(), Some(w)))
    }
}
