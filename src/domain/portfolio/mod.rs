//! Portfolio engine: signals to weights, and weights to realised returns.
//!
//! Both stages work on their own copies; prices and signals passed in are
//! never modified.

pub mod equal_weights;
pub mod hedge_ratio_weights;
pub mod returns;

pub use equal_weights::EqualWeights;
pub use hedge_ratio_weights::HedgeRatioWeights;
pub use returns::{asset_returns, backtest_portfolio};

use crate::domain::error::SigtraderError;
use crate::domain::frame::{PriceMatrix, SignalMatrix, WeightMatrix};
use crate::domain::strategy::Signals;
use std::fmt;
use std::str::FromStr;

/// Forward-filled signals together with the weights derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Positions {
    pub signals: SignalMatrix,
    pub weights: WeightMatrix,
}

/// Carry each symbol's last known signal across unset cells. Cells before a
/// symbol's first signal stay unset.
pub fn forward_fill(signals: &SignalMatrix) -> SignalMatrix {
    let mut filled = signals.clone();
    for col in 0..signals.n_symbols() {
        let mut last = None;
        for t in 0..signals.len() {
            match signals.get(t, col) {
                Some(s) => last = Some(s),
                None => filled.set(t, col, last),
            }
        }
    }
    filled
}

pub trait Portfolio {
    fn name(&self) -> &str;

    /// Capital fraction per symbol and timestamp, aligned to `prices`.
    fn weights(&self, signals: &Signals, prices: &PriceMatrix)
        -> Result<WeightMatrix, SigtraderError>;

    fn generate_positions(
        &self,
        signals: &Signals,
        prices: &PriceMatrix,
    ) -> Result<Positions, SigtraderError> {
        if !signals.matrix.is_aligned_with(prices) {
            return Err(SigtraderError::Data {
                reason: "signal matrix is not aligned with prices".into(),
            });
        }
        let filled = forward_fill(&signals.matrix);
        let weights = self.weights(signals, prices)?;
        Ok(Positions {
            signals: filled,
            weights,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortfolioKind {
    #[default]
    EqualWeights,
    HedgeRatioWeights,
}

impl PortfolioKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PortfolioKind::EqualWeights => "equal_weights",
            PortfolioKind::HedgeRatioWeights => "hedge_ratio_weights",
        }
    }

    pub fn build(self) -> Box<dyn Portfolio> {
        match self {
            PortfolioKind::EqualWeights => Box::new(EqualWeights),
            PortfolioKind::HedgeRatioWeights => Box::new(HedgeRatioWeights),
        }
    }
}

impl FromStr for PortfolioKind {
    type Err = SigtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal_weights" => Ok(PortfolioKind::EqualWeights),
            "hedge_ratio_weights" => Ok(PortfolioKind::HedgeRatioWeights),
            other => Err(SigtraderError::configuration(format!(
                "unknown portfolio kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PortfolioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
