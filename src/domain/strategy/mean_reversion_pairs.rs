//! Two-leg mean reversion on an OLS spread.
//!
//! The second symbol is regressed on the first, `spread = y - beta * x`, and
//! the spread's z-score drives the signals. Columns are `[x, y]`, matching
//! the order of the price matrix.

use super::{HedgeWindow, Signals, Strategy};
use crate::domain::error::SigtraderError;
use crate::domain::frame::{Frame, PriceMatrix};
use crate::domain::signal::Signal;
use crate::domain::stats::{
    half_life, mean, ols_alpha_beta, rolling_mean, rolling_ols, rolling_std, sample_std,
};
use crate::domain::timeseries::TimeSeries;

const LONG_SPREAD: [Signal; 2] = [Signal::Short, Signal::Long];
const SHORT_SPREAD: [Signal; 2] = [Signal::Long, Signal::Short];
const EXIT: [Signal; 2] = [Signal::Flat, Signal::Flat];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversionPairs {
    window: HedgeWindow,
    z_entry: f64,
    z_exit: f64,
}

impl MeanReversionPairs {
    pub fn new(
        window: Option<HedgeWindow>,
        z_entry: Option<f64>,
        z_exit: Option<f64>,
    ) -> Result<Self, SigtraderError> {
        let (Some(window), Some(z_entry), Some(z_exit)) = (window, z_entry, z_exit) else {
            return Err(SigtraderError::configuration(
                "mean_reversion_pairs needs window, z_entry and z_exit",
            ));
        };
        if let HedgeWindow::Rolling(n) = window {
            if n < 2 {
                return Err(SigtraderError::configuration(format!(
                    "pairs window must be at least 2, got {}",
                    n
                )));
            }
        }
        for (key, z) in [("z_entry", z_entry), ("z_exit", z_exit)] {
            if !z.is_finite() || z < 0.0 {
                return Err(SigtraderError::configuration(format!(
                    "{} must be a non-negative number, got {}",
                    key, z
                )));
            }
        }
        Ok(Self {
            window,
            z_entry,
            z_exit,
        })
    }

    pub fn window(&self) -> HedgeWindow {
        self.window
    }

    /// Hedge ratio per timestamp. Full-sample mode repeats one estimate.
    fn hedge_ratio(&self, y: &TimeSeries, x: &TimeSeries) -> Result<TimeSeries, SigtraderError> {
        match self.window {
            HedgeWindow::Full => {
                tracing::warn!(
                    "full-sample hedge ratio uses future prices; results have lookahead bias"
                );
                let beta = ols_alpha_beta(y, x)?.map(|(_, beta)| beta);
                Ok(y.with_values(vec![beta; y.len()]))
            }
            HedgeWindow::Rolling(n) => Ok(rolling_ols(y, x, n)?.beta),
        }
    }

    fn zscore(&self, spread: &TimeSeries) -> TimeSeries {
        let (mu, sigma) = match self.window {
            HedgeWindow::Full => {
                let mu = spread.with_values(vec![mean(spread); spread.len()]);
                let sigma = spread.with_values(vec![sample_std(spread); spread.len()]);
                (mu, sigma)
            }
            HedgeWindow::Rolling(n) => (rolling_mean(spread, n), rolling_std(spread, n)),
        };
        let values = spread
            .values()
            .iter()
            .zip(mu.values().iter().zip(sigma.values()))
            .map(|(s, (m, sd))| {
                let (s, m, sd) = ((*s)?, (*m)?, (*sd)?);
                (sd > 0.0).then(|| (s - m) / sd)
            })
            .collect();
        spread.with_values(values)
    }

    fn signal_for(&self, z: f64) -> Option<[Signal; 2]> {
        // exit band wins when the thresholds overlap
        if z.abs() < self.z_exit {
            Some(EXIT)
        } else if z < -self.z_entry {
            Some(LONG_SPREAD)
        } else if z > self.z_entry {
            Some(SHORT_SPREAD)
        } else {
            None
        }
    }
}

impl Strategy for MeanReversionPairs {
    fn name(&self) -> &str {
        "mean_reversion_pairs"
    }

    fn check_universe(&self, prices: &PriceMatrix) -> Result<(), SigtraderError> {
        if prices.n_symbols() != 2 {
            return Err(SigtraderError::configuration(format!(
                "mean_reversion_pairs trades exactly two symbols, got {}",
                prices.n_symbols()
            )));
        }
        Ok(())
    }

    fn generate_signals(&self, prices: &PriceMatrix) -> Result<Signals, SigtraderError> {
        self.check_universe(prices)?;
        let x = prices.series(0);
        let y = prices.series(1);

        let beta = self.hedge_ratio(&y, &x)?;
        let spread_values = (0..y.len())
            .map(|t| Some(y.get(t)? - beta.get(t)? * x.get(t)?))
            .collect();
        let spread = y.with_values(spread_values);

        match half_life(&spread) {
            Some(hl) => tracing::debug!(half_life = hl, window = %self.window, "spread half-life"),
            None => tracing::debug!(window = %self.window, "spread shows no mean reversion"),
        }

        let z = self.zscore(&spread);
        let mut matrix = Frame::empty_like(prices);
        for t in 0..z.len() {
            if let Some(pair) = z.get(t).and_then(|z| self.signal_for(z)) {
                matrix.set_row(t, &pair.map(Some));
            }
        }

        Ok(Signals {
            matrix,
            hedge_ratio: Some(beta),
        })
    }
}
