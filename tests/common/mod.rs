#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::context::{Context, OutputOptions};
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::frame::PriceMatrix;
use sigtrader::domain::frequency::Frequency;
use sigtrader::domain::portfolio::PortfolioKind;
use sigtrader::domain::report::{PerformanceReport, ReportSeries};
use sigtrader::domain::strategy::StrategyConfig;
use sigtrader::domain::timeseries::TimeSeries;
use sigtrader::ports::data_port::DataHandler;
use sigtrader::ports::render_port::RenderPort;
use sigtrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataHandler {
    pub data: HashMap<String, TimeSeries>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<Vec<String>>>,
}

impl MockDataHandler {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), series(prices));
        self
    }

    pub fn with_series(mut self, symbol: &str, series: TimeSeries) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataHandler for MockDataHandler {
    fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        _frequency: Frequency,
    ) -> Result<PriceMatrix, SigtraderError> {
        self.requests.borrow_mut().push(symbols.to_vec());
        let mut columns = Vec::new();
        for symbol in symbols {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(SigtraderError::Data {
                    reason: reason.clone(),
                });
            }
            let full = self.data.get(symbol).ok_or_else(|| SigtraderError::Data {
                reason: format!("no data for {}", symbol),
            })?;
            let (index, values): (Vec<_>, Vec<_>) = full
                .iter()
                .filter(|(d, _)| *d >= start && *d <= end)
                .unzip();
            columns.push((symbol.clone(), TimeSeries::new(index, values)?));
        }
        PriceMatrix::outer_join(columns)
    }
}

#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<(PerformanceReport, PathBuf)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(&self, report: &PerformanceReport, output_dir: &Path) -> Result<(), SigtraderError> {
        self.written
            .borrow_mut()
            .push((report.clone(), output_dir.to_path_buf()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingRenderPort {
    pub rendered: RefCell<Vec<ReportSeries>>,
}

impl RenderPort for RecordingRenderPort {
    fn render(
        &self,
        series: &ReportSeries,
        _output_dir: &Path,
    ) -> Result<Vec<PathBuf>, SigtraderError> {
        self.rendered.borrow_mut().push(series.clone());
        Ok(Vec::new())
    }
}

/// Consecutive calendar days from 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64)
}

pub fn series(values: &[f64]) -> TimeSeries {
    TimeSeries::from_observations((0..values.len()).map(day).collect(), values.to_vec()).unwrap()
}

pub fn prices(columns: &[(&str, &[f64])]) -> PriceMatrix {
    PriceMatrix::outer_join(
        columns
            .iter()
            .map(|(s, v)| (s.to_string(), series(v)))
            .collect(),
    )
    .unwrap()
}

pub fn context(symbols: &[&str], strategy: StrategyConfig, portfolio: PortfolioKind) -> Context {
    Context {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        benchmark: symbols[0].to_string(),
        start_date: day(0),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        frequency: Frequency::Daily,
        risk_free_rate: 0.0,
        data_dir: PathBuf::from("data"),
        strategy,
        portfolio,
        output: OutputOptions::default(),
    }
}

/// Geometric walk with a deterministic wobble, long enough for rolling stats.
pub fn wobbly_prices(n: usize, start: f64, drift: f64, phase: f64) -> Vec<f64> {
    let mut p = start;
    (0..n)
        .map(|i| {
            let r = drift + 0.01 * ((i as f64) * 0.7 + phase).sin();
            p *= 1.0 + r;
            p
        })
        .collect()
}

/// `ExitCode` has no `PartialEq`; compare through its debug form.
pub fn assert_exit(code: std::process::ExitCode, expected: u8) {
    assert_eq!(
        format!("{:?}", code),
        format!("{:?}", std::process::ExitCode::from(expected))
    );
}
