//! Immutable run context.
//!
//! Built once from configuration and passed by reference to each stage.
//! Stages read only the fields they need.

use crate::domain::frequency::Frequency;
use crate::domain::portfolio::PortfolioKind;
use crate::domain::strategy::StrategyConfig;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;

/// Side-channel output settings. None of them change computed values.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    pub save: bool,
    pub verbose: bool,
    pub top_drawdowns: usize,
    pub rolling_window: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            save: false,
            verbose: false,
            top_drawdowns: crate::domain::analyser::DEFAULT_TOP_DRAWDOWNS,
            rolling_window: crate::domain::analyser::DEFAULT_ROLLING_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub symbols: Vec<String>,
    pub benchmark: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: Frequency,
    pub risk_free_rate: f64,
    pub data_dir: PathBuf,
    pub strategy: StrategyConfig,
    pub portfolio: PortfolioKind,
    pub output: OutputOptions,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "symbols:        {}", self.symbols.join(", "))?;
        writeln!(f, "benchmark:      {}", self.benchmark)?;
        writeln!(f, "period:         {} to {}", self.start_date, self.end_date)?;
        writeln!(f, "frequency:      {}", self.frequency)?;
        writeln!(f, "risk free rate: {}", self.risk_free_rate)?;
        writeln!(f, "data dir:       {}", self.data_dir.display())?;
        writeln!(f, "strategy:       {}", self.strategy)?;
        writeln!(f, "portfolio:      {}", self.portfolio)?;
        write!(
            f,
            "output:         {} (save={}, verbose={})",
            self.output.output_dir.display(),
            self.output.save,
            self.output.verbose
        )
    }
}
