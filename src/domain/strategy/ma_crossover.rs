//! Moving average crossover.
//!
//! Long while the short rolling mean is above the long one, short while it
//! is below. Unset during warmup and wherever the two means are equal.

use super::{Signals, Strategy};
use crate::domain::error::SigtraderError;
use crate::domain::frame::{Frame, PriceMatrix};
use crate::domain::signal::Signal;
use crate::domain::stats::rolling_mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossover {
    pub fn new(
        short_window: Option<usize>,
        long_window: Option<usize>,
    ) -> Result<Self, SigtraderError> {
        let (Some(short_window), Some(long_window)) = (short_window, long_window) else {
            return Err(SigtraderError::configuration(
                "ma_crossover needs both short_window and long_window",
            ));
        };
        if short_window == 0 || long_window == 0 {
            return Err(SigtraderError::configuration(
                "moving average windows must be at least 1",
            ));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn generate_signals(&self, prices: &PriceMatrix) -> Result<Signals, SigtraderError> {
        tracing::debug!(
            short = self.short_window,
            long = self.long_window,
            "computing moving average crossover"
        );
        let warmup = self.long_window.max(self.short_window) - 1;
        let mut matrix = Frame::empty_like(prices);

        for col in 0..prices.n_symbols() {
            let series = prices.series(col);
            let short = rolling_mean(&series, self.short_window);
            let long = rolling_mean(&series, self.long_window);

            for t in warmup..prices.len() {
                let signal = match (short.get(t), long.get(t)) {
                    (Some(s), Some(l)) if s > l => Some(Signal::Long),
                    (Some(s), Some(l)) if l > s => Some(Signal::Short),
                    _ => None,
                };
                matrix.set(t, col, signal);
            }
        }

        Ok(Signals::new(matrix))
    }
}
