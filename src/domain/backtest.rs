//! Backtest pipeline: strategy, portfolio engine, performance analyser.
//!
//! Each stage receives only what it needs from the [`Context`] and owns its
//! output until the next stage borrows it.

use crate::domain::analyser::PerformanceAnalyser;
use crate::domain::config_validation::check_compatibility;
use crate::domain::context::Context;
use crate::domain::error::SigtraderError;
use crate::domain::frame::PriceMatrix;
use crate::domain::portfolio::{backtest_portfolio, Positions};
use crate::domain::report::PerformanceReport;
use crate::domain::strategy::Signals;
use crate::domain::timeseries::TimeSeries;

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub signals: Signals,
    pub positions: Positions,
    pub returns: TimeSeries,
    pub report: PerformanceReport,
}

fn check_prices(prices: &PriceMatrix) -> Result<(), SigtraderError> {
    if prices.is_empty() || prices.n_symbols() == 0 {
        return Err(SigtraderError::missing_data("price matrix"));
    }
    for (col, symbol) in prices.symbols().iter().enumerate() {
        if prices.column(col).iter().all(Option::is_none) {
            return Err(SigtraderError::missing_data(format!("prices for {}", symbol)));
        }
    }
    Ok(())
}

pub fn run_backtest(
    ctx: &Context,
    prices: &PriceMatrix,
    benchmark_prices: &TimeSeries,
) -> Result<BacktestResult, SigtraderError> {
    tracing::info!(
        strategy = ctx.strategy.kind(),
        portfolio = %ctx.portfolio,
        symbols = prices.n_symbols(),
        periods = prices.len(),
        "running backtest"
    );

    check_compatibility(ctx)?;
    let strategy = ctx.strategy.build()?;
    strategy.check_universe(prices)?;
    check_prices(prices)?;

    let signals = strategy.generate_signals(prices)?;
    tracing::debug!(strategy = strategy.name(), "signals generated");

    let portfolio = ctx.portfolio.build();
    let positions = portfolio.generate_positions(&signals, prices)?;
    tracing::debug!(portfolio = portfolio.name(), "positions generated");

    let returns = backtest_portfolio(prices, &positions.weights, &positions.signals)?;
    tracing::info!(
        usable = returns.usable_count(),
        total = returns.len(),
        "portfolio returns computed"
    );

    let mut analyser = PerformanceAnalyser::new(ctx.frequency, ctx.risk_free_rate)
        .with_rolling_window(ctx.output.rolling_window)
        .with_top_drawdowns(ctx.output.top_drawdowns);
    let report = analyser.generate_analysis(&returns, benchmark_prices, &ctx.symbols)?;

    Ok(BacktestResult {
        signals,
        positions,
        returns,
        report,
    })
}
