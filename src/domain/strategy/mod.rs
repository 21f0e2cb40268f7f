//! Strategies turn a price matrix into a signal matrix.
//!
//! A strategy only assigns signals where it has enough information; every
//! other cell stays unset (`None`). Carrying a signal forward across unset
//! cells is the portfolio engine's job, never the strategy's.

pub mod buy_and_hold;
pub mod ma_crossover;
pub mod mean_reversion_pairs;

pub use buy_and_hold::BuyAndHold;
pub use ma_crossover::MovingAverageCrossover;
pub use mean_reversion_pairs::MeanReversionPairs;

use crate::domain::error::SigtraderError;
use crate::domain::frame::{PriceMatrix, SignalMatrix};
use crate::domain::timeseries::TimeSeries;
use std::fmt;
use std::str::FromStr;

/// Strategy output: signals aligned to the input prices, plus the hedge
/// ratio used to build them when the strategy estimates one.
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub matrix: SignalMatrix,
    pub hedge_ratio: Option<TimeSeries>,
}

impl Signals {
    pub fn new(matrix: SignalMatrix) -> Self {
        Self {
            matrix,
            hedge_ratio: None,
        }
    }
}

pub trait Strategy {
    fn name(&self) -> &str;

    /// Reject a universe the strategy cannot trade. Runs before any signal
    /// computation.
    fn check_universe(&self, _prices: &PriceMatrix) -> Result<(), SigtraderError> {
        Ok(())
    }

    /// Signals aligned to `prices`' index and columns.
    fn generate_signals(&self, prices: &PriceMatrix) -> Result<Signals, SigtraderError>;
}

/// Sample over which the pairs hedge ratio and spread statistics are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeWindow {
    /// Whole sample at once. Uses future prices, so results carry lookahead bias.
    Full,
    /// Trailing window of this many timestamps.
    Rolling(usize),
}

impl FromStr for HedgeWindow {
    type Err = SigtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("full") {
            return Ok(HedgeWindow::Full);
        }
        s.parse::<usize>()
            .map(HedgeWindow::Rolling)
            .map_err(|_| {
                SigtraderError::configuration(format!(
                    "window must be a positive integer or 'full', got '{}'",
                    s
                ))
            })
    }
}

impl fmt::Display for HedgeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeWindow::Full => write!(f, "full"),
            HedgeWindow::Rolling(n) => write!(f, "{}", n),
        }
    }
}

/// Strategy selection as read from configuration. Required parameters may
/// be absent here; `build` reports them as configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    BuyAndHold,
    MovingAverageCrossover {
        short_window: Option<usize>,
        long_window: Option<usize>,
    },
    MeanReversionPairs {
        window: Option<HedgeWindow>,
        z_entry: Option<f64>,
        z_exit: Option<f64>,
    },
}

impl StrategyConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyConfig::BuyAndHold => "buy_and_hold",
            StrategyConfig::MovingAverageCrossover { .. } => "ma_crossover",
            StrategyConfig::MeanReversionPairs { .. } => "mean_reversion_pairs",
        }
    }

    /// Number of symbols the strategy trades, when it is fixed.
    pub fn required_symbols(&self) -> Option<usize> {
        match self {
            StrategyConfig::MeanReversionPairs { .. } => Some(2),
            _ => None,
        }
    }

    /// Whether the strategy's signals carry a hedge ratio series.
    pub fn estimates_hedge_ratio(&self) -> bool {
        matches!(self, StrategyConfig::MeanReversionPairs { .. })
    }

    /// Reject a symbol list the strategy can never trade, before any data is read.
    pub fn check_symbols(&self, symbols: &[String]) -> Result<(), SigtraderError> {
        match self.required_symbols() {
            Some(n) if symbols.len() != n => Err(SigtraderError::configuration(format!(
                "{} trades exactly {} symbols, got {}",
                self.kind(),
                n,
                symbols.len()
            ))),
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Strategy>, SigtraderError> {
        Ok(match *self {
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold),
            StrategyConfig::MovingAverageCrossover {
                short_window,
                long_window,
            } => Box::new(MovingAverageCrossover::new(short_window, long_window)?),
            StrategyConfig::MeanReversionPairs {
                window,
                z_entry,
                z_exit,
            } => Box::new(MeanReversionPairs::new(window, z_entry, z_exit)?),
        })
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "unset".to_string(), |v| v.to_string())
        }
        match self {
            StrategyConfig::BuyAndHold => write!(f, "buy_and_hold"),
            StrategyConfig::MovingAverageCrossover {
                short_window,
                long_window,
            } => write!(
                f,
                "ma_crossover(short={}, long={})",
                opt(short_window),
                opt(long_window)
            ),
            StrategyConfig::MeanReversionPairs {
                window,
                z_entry,
                z_exit,
            } => write!(
                f,
                "mean_reversion_pairs(window={}, z_entry={}, z_exit={})",
                opt(window),
                opt(z_entry),
                opt(z_exit)
            ),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hedge_window_parse() {
        assert_eq!("full".parse::<HedgeWindow>().unwrap(), HedgeWindow::Full);
        assert_eq!("FULL".parse::<HedgeWindow>().unwrap(), HedgeWindow::Full);
        assert_eq!(
            " 250 ".parse::<HedgeWindow>().unwrap(),
            HedgeWindow::Rolling(250)
        );
        let err = "-1".parse::<HedgeWindow>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn build_reports_missing_parameters() {
        let cfg = StrategyConfig::MovingAverageCrossover {
            short_window: Some(9),
            long_window: None,
        };
        assert!(matches!(cfg.build(), Err(e) if e.is_configuration()));

        let cfg = StrategyConfig::MeanReversionPairs {
            window: Some(HedgeWindow::Rolling(20)),
            z_entry: None,
            z_exit: Some(0.5),
        };
        assert!(matches!(cfg.build(), Err(e) if e.is_configuration()));
    }

    #[test]
    fn pairs_need_exactly_two_symbols() {
        let cfg = StrategyConfig::MeanReversionPairs {
            window: Some(HedgeWindow::Full),
            z_entry: Some(1.0),
            z_exit: Some(0.5),
        };
        let symbols = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(cfg.check_symbols(&symbols(&["X", "Y"])).is_ok());
        let err = cfg.check_symbols(&symbols(&["A", "B", "C"])).unwrap_err();
        assert!(err.is_configuration());
        assert!(StrategyConfig::BuyAndHold
            .check_symbols(&symbols(&["A", "B", "C"]))
            .is_ok());
        assert!(cfg.estimates_hedge_ratio());
        assert!(!StrategyConfig::BuyAndHold.estimates_hedge_ratio());
    }

    #[test]
    fn build_names() {
        let s = StrategyConfig::BuyAndHold.build().unwrap();
        assert_eq!(s.name(), "buy_and_hold");
        let s = StrategyConfig::MovingAverageCrossover {
            short_window: Some(9),
            long_window: Some(200),
        }
        .build()
        .unwrap();
        assert_eq!(s.name(), "ma_crossover");
    }

    #[test]
    fn config_display() {
        let cfg = StrategyConfig::MeanReversionPairs {
            window: Some(HedgeWindow::Full),
            z_entry: Some(1.0),
            z_exit: None,
        };
        assert_eq!(
            cfg.to_string(),
            "mean_reversion_pairs(window=full, z_entry=1, z_exit=unset)"
        );
    }
}
