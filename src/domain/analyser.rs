//! Performance analyser.
//!
//! Runs the report through a fixed sequence of states:
//!
//! ```text
//! Created -> ReturnsIngested -> BenchmarkIngested -> MetricsComputed -> ReportFinalized
//! ```
//!
//! `generate_analysis` drives every transition in order. A finalized
//! analyser cannot be reused.

use crate::domain::error::SigtraderError;
use crate::domain::frequency::Frequency;
use crate::domain::report::{MetricValue, PerformanceReport, ReportRecord, ReportSeries};
use crate::domain::stats::{
    aggregate_returns, annualised_return, annualised_volatility, cumulate, information_ratio,
    max_drawdown, max_drawdown_duration, ols_alpha_beta, rolling_drawdown,
    rolling_drawdown_duration, rolling_sharpe, sharpe_ratio, sort_drawdowns, total_return,
};
use crate::domain::timeseries::TimeSeries;

pub const DEFAULT_ROLLING_WINDOW: usize = 126;
pub const DEFAULT_TOP_DRAWDOWNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Created,
    ReturnsIngested,
    BenchmarkIngested,
    MetricsComputed,
    ReportFinalized,
}

impl AnalysisState {
    fn next(self) -> Option<Self> {
        match self {
            AnalysisState::Created => Some(AnalysisState::ReturnsIngested),
            AnalysisState::ReturnsIngested => Some(AnalysisState::BenchmarkIngested),
            AnalysisState::BenchmarkIngested => Some(AnalysisState::MetricsComputed),
            AnalysisState::MetricsComputed => Some(AnalysisState::ReportFinalized),
            AnalysisState::ReportFinalized => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceAnalyser {
    frequency: Frequency,
    risk_free_rate: f64,
    rolling_window: usize,
    top_drawdowns: usize,
    state: AnalysisState,
    returns: Option<TimeSeries>,
    cumulative: Option<TimeSeries>,
    benchmark_returns: Option<TimeSeries>,
    benchmark_cumulative: Option<TimeSeries>,
    record: ReportRecord,
}

impl PerformanceAnalyser {
    pub fn new(frequency: Frequency, risk_free_rate: f64) -> Self {
        Self {
            frequency,
            risk_free_rate,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            top_drawdowns: DEFAULT_TOP_DRAWDOWNS,
            state: AnalysisState::Created,
            returns: None,
            cumulative: None,
            benchmark_returns: None,
            benchmark_cumulative: None,
            record: ReportRecord::new(),
        }
    }

    /// Window, in periods, of the rolling Sharpe series.
    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window;
        self
    }

    /// Number of drawdown episodes kept in each ranked list.
    pub fn with_top_drawdowns(mut self, n: usize) -> Self {
        self.top_drawdowns = n;
        self
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn generate_analysis(
        &mut self,
        returns: &TimeSeries,
        benchmark_prices: &TimeSeries,
        symbols: &[String],
    ) -> Result<PerformanceReport, SigtraderError> {
        self.ingest_returns(returns)?;
        self.ingest_benchmark(benchmark_prices)?;
        self.compute_metrics()?;
        self.finalize(symbols)
    }

    fn advance(&mut self, to: AnalysisState) -> Result<(), SigtraderError> {
        if self.state.next() != Some(to) {
            return Err(SigtraderError::Data {
                reason: format!("analysis cannot move from {:?} to {:?}", self.state, to),
            });
        }
        tracing::debug!(from = ?self.state, to = ?to, "analysis transition");
        self.state = to;
        Ok(())
    }

    fn ingest_returns(&mut self, returns: &TimeSeries) -> Result<(), SigtraderError> {
        if returns.usable_count() == 0 {
            return Err(SigtraderError::missing_data("portfolio returns"));
        }
        self.advance(AnalysisState::ReturnsIngested)?;

        let cumulative = cumulate(returns);
        self.record.push(
            "Annualised return",
            MetricValue::percent(annualised_return(returns, self.frequency)),
        );
        self.record.push(
            "Annualised vol",
            MetricValue::percent(annualised_volatility(returns, self.frequency)),
        );
        self.record
            .push("Total return", MetricValue::percent(total_return(returns)));

        self.returns = Some(returns.clone());
        self.cumulative = Some(cumulative);
        Ok(())
    }

    fn ingest_benchmark(&mut self, prices: &TimeSeries) -> Result<(), SigtraderError> {
        let Some(returns) = self.returns.as_ref() else {
            return Err(SigtraderError::missing_data("portfolio returns"));
        };
        if prices.usable_count() == 0 {
            return Err(SigtraderError::missing_data("benchmark prices"));
        }
        let aligned = prices.reindex(returns.index());
        let bm_returns = pct_change(&aligned);
        let bm_cumulative = cumulate(&bm_returns);

        self.advance(AnalysisState::BenchmarkIngested)?;
        self.record.push(
            "Total return bmark",
            MetricValue::percent(total_return(&bm_returns)),
        );
        self.benchmark_returns = Some(bm_returns);
        self.benchmark_cumulative = Some(bm_cumulative);
        Ok(())
    }

    fn compute_metrics(&mut self) -> Result<(), SigtraderError> {
        let (Some(returns), Some(bm_returns), Some(cumulative)) = (
            self.returns.as_ref(),
            self.benchmark_returns.as_ref(),
            self.cumulative.as_ref(),
        ) else {
            return Err(SigtraderError::missing_data("benchmark returns"));
        };

        let period_rf = self.risk_free_rate / self.frequency.periods_per_year();
        let excess = returns.map(|r| r - period_rf);
        let bm_excess = bm_returns.map(|r| r - period_rf);
        let fit = ols_alpha_beta(&excess, &bm_excess)?;

        let sharpe = sharpe_ratio(returns, self.frequency, self.risk_free_rate);
        let info = information_ratio(returns, bm_returns, self.frequency)?;
        let max_dd = max_drawdown(cumulative);
        let max_ddd = max_drawdown_duration(cumulative);

        self.advance(AnalysisState::MetricsComputed)?;
        self.record
            .push("Alpha", MetricValue::coefficient(fit.map(|(a, _)| a)));
        self.record
            .push("Beta", MetricValue::ratio(fit.map(|(_, b)| b)));
        self.record.push("Sharpe ratio", MetricValue::ratio(sharpe));
        self.record
            .push("Information ratio", MetricValue::ratio(info));
        self.record.push("Max drawdown", MetricValue::percent(max_dd));
        self.record
            .push("Max drawdown dur", MetricValue::periods(max_ddd));
        Ok(())
    }

    fn finalize(&mut self, symbols: &[String]) -> Result<PerformanceReport, SigtraderError> {
        let (Some(returns), Some(cumulative), Some(bm_cumulative)) = (
            self.returns.as_ref(),
            self.cumulative.as_ref(),
            self.benchmark_cumulative.as_ref(),
        ) else {
            return Err(SigtraderError::missing_data("portfolio returns"));
        };
        let (Some(start_date), Some(end_date)) = (returns.first_date(), returns.last_date())
        else {
            return Err(SigtraderError::missing_data("portfolio returns"));
        };

        let (mut by_magnitude, mut by_duration) = sort_drawdowns(cumulative);
        by_magnitude.truncate(self.top_drawdowns);
        by_duration.truncate(self.top_drawdowns);

        let series = ReportSeries {
            cumulative_returns: cumulative.clone(),
            benchmark_cumulative_returns: bm_cumulative.clone(),
            rolling_sharpe: rolling_sharpe(
                returns,
                self.frequency,
                self.risk_free_rate,
                self.rolling_window,
            ),
            rolling_drawdown: rolling_drawdown(cumulative),
            rolling_drawdown_duration: rolling_drawdown_duration(cumulative),
            monthly_returns: aggregate_returns(returns, Frequency::Monthly),
            drawdowns_by_magnitude: by_magnitude,
            drawdowns_by_duration: by_duration,
        };

        self.advance(AnalysisState::ReportFinalized)?;
        tracing::info!(
            metrics = self.record.len(),
            episodes = series.drawdowns_by_magnitude.len(),
            "performance report finalized"
        );
        Ok(PerformanceReport {
            start_date,
            end_date,
            symbols: symbols.to_vec(),
            record: std::mem::take(&mut self.record),
            series,
        })
    }
}

/// Simple returns between consecutive timestamps; missing where either
/// price is missing or the earlier price is zero.
fn pct_change(prices: &TimeSeries) -> TimeSeries {
    let values = prices.values();
    let out = (0..values.len())
        .map(|t| {
            let prev = values.get(t.checked_sub(1)?).copied().flatten()?;
            let curr = values[t]?;
            (prev != 0.0).then(|| curr / prev - 1.0)
        })
        .collect();
    prices.with_values(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::test_support::*;
    use approx::assert_abs_diff_eq;

    const METRICS: [&str; 10] = [
        "Annualised return",
        "Annualised vol",
        "Total return",
        "Total return bmark",
        "Alpha",
        "Beta",
        "Sharpe ratio",
        "Information ratio",
        "Max drawdown",
        "Max drawdown dur",
    ];

    fn symbols() -> Vec<String> {
        vec!["SPY".to_string()]
    }

    #[test]
    fn report_lists_metrics_in_order() {
        let returns = ts(&[None, Some(0.01), Some(-0.02), Some(0.03), Some(0.01)]);
        let bm = ts_full(&[100.0, 101.0, 100.0, 102.0, 103.0]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.0);
        let report = analyser.generate_analysis(&returns, &bm, &symbols()).unwrap();

        assert_eq!(report.record.names(), METRICS.to_vec());
        assert_eq!(analyser.state(), AnalysisState::ReportFinalized);
        assert_eq!(report.start_date, day(0));
        assert_eq!(report.end_date, day(4));
    }

    #[test]
    fn metric_values() {
        let returns = ts(&[None, Some(0.10), Some(-0.05), Some(0.02)]);
        let bm = ts_full(&[100.0, 110.0, 104.5, 106.59]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.0);
        let report = analyser.generate_analysis(&returns, &bm, &symbols()).unwrap();
        let r = &report.record;

        let total = 1.10 * 0.95 * 1.02 - 1.0;
        assert_abs_diff_eq!(r.get("Total return").unwrap().value().unwrap(), total, epsilon = 1e-12);
        assert_abs_diff_eq!(
            r.get("Annualised return").unwrap().value().unwrap(),
            252.0 * (0.10 - 0.05 + 0.02) / 3.0,
            epsilon = 1e-9
        );
        // benchmark moves exactly with the strategy
        assert_abs_diff_eq!(
            r.get("Total return bmark").unwrap().value().unwrap(),
            total,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(r.get("Beta").unwrap().value().unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.get("Alpha").unwrap().value().unwrap(), 0.0, epsilon = 1e-9);
        // zero tracking error
        assert!(matches!(
            r.get("Information ratio"),
            Some(MetricValue::Undefined) | Some(MetricValue::Ratio(_))
        ));
        assert_abs_diff_eq!(
            r.get("Max drawdown").unwrap().value().unwrap(),
            1.10 / (1.10 * 0.95) - 1.0,
            epsilon = 1e-12
        );
        assert_eq!(r.get("Max drawdown dur"), Some(MetricValue::Periods(2)));
    }

    #[test]
    fn zero_volatility_sharpe_is_undefined() {
        let returns = ts(&[None, Some(0.1), Some(0.1), Some(0.1)]);
        let bm = ts_full(&[1.0, 1.0, 1.0, 1.0]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.04);
        let report = analyser.generate_analysis(&returns, &bm, &symbols()).unwrap();
        assert_eq!(report.record.get("Beta"), Some(MetricValue::Undefined));
        assert_eq!(report.record.get("Alpha"), Some(MetricValue::Undefined));
        assert_eq!(report.record.get("Sharpe ratio"), Some(MetricValue::Undefined));
    }

    #[test]
    fn no_usable_returns_is_missing_data() {
        let returns = ts(&[None, None, None]);
        let bm = ts_full(&[1.0, 2.0, 3.0]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.04);
        let err = analyser
            .generate_analysis(&returns, &bm, &symbols())
            .unwrap_err();
        assert!(matches!(err, SigtraderError::MissingData { .. }));
        assert_eq!(analyser.state(), AnalysisState::Created);
    }

    #[test]
    fn empty_benchmark_is_missing_data() {
        let returns = ts(&[None, Some(0.01), Some(0.02)]);
        let bm = ts(&[None, None, None]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.04);
        let err = analyser
            .generate_analysis(&returns, &bm, &symbols())
            .unwrap_err();
        assert!(matches!(err, SigtraderError::MissingData { .. }));
        assert_eq!(analyser.state(), AnalysisState::ReturnsIngested);
    }

    #[test]
    fn finalized_analyser_is_terminal() {
        let returns = ts(&[None, Some(0.01), Some(0.02)]);
        let bm = ts_full(&[1.0, 2.0, 3.0]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.04);
        analyser.generate_analysis(&returns, &bm, &symbols()).unwrap();
        assert!(analyser.generate_analysis(&returns, &bm, &symbols()).is_err());
    }

    #[test]
    fn series_and_top_episodes() {
        let returns = ts(&[None, Some(0.1), Some(-0.1), Some(0.3), Some(-0.05), Some(0.1)]);
        let bm = ts_full(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let mut analyser = PerformanceAnalyser::new(Frequency::Daily, 0.0)
            .with_rolling_window(3)
            .with_top_drawdowns(1);
        let report = analyser.generate_analysis(&returns, &bm, &symbols()).unwrap();
        let s = &report.series;

        assert_eq!(s.cumulative_returns.get(0), Some(0.0));
        assert_eq!(s.rolling_sharpe.len(), 6);
        assert!(s.rolling_sharpe.get(1).is_none());
        assert!(s.rolling_sharpe.get(3).is_some());
        assert_eq!(s.drawdowns_by_magnitude.len(), 1);
        assert_eq!(s.drawdowns_by_magnitude[0].start, day(2));
        assert_eq!(s.drawdowns_by_duration.len(), 1);
        assert_eq!(s.monthly_returns.len(), 1);
        assert!(
            s.benchmark_cumulative_returns
                .values()
                .iter()
                .all(|v| *v == Some(0.0))
        );
    }

    #[test]
    fn pct_change_skips_gaps() {
        let p = ts(&[Some(100.0), Some(110.0), None, Some(121.0), Some(0.0), Some(1.0)]);
        let r = pct_change(&p);
        assert_eq!(r.get(0), None);
        assert_abs_diff_eq!(r.get(1).unwrap(), 0.1, epsilon = 1e-12);
        assert_eq!(r.get(2), None);
        assert_eq!(r.get(3), None);
        assert!(r.get(4).is_some());
        assert_eq!(r.get(5), None);
    }
}
