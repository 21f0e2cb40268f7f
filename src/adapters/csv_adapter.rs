//! CSV price data adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a `date` column
//! (YYYY-MM-DD) and a closing price column. Empty cells and `NaN` are
//! missing observations.

use crate::domain::error::SigtraderError;
use crate::domain::frame::PriceMatrix;
use crate::domain::frequency::Frequency;
use crate::domain::timeseries::TimeSeries;
use crate::ports::data_port::DataHandler;
use chrono::NaiveDate;
use std::path::PathBuf;

const DATE_COLUMNS: [&str; 2] = ["date", "Date"];
const PRICE_COLUMNS: [&str; 5] = ["adj_close", "Adj Close", "close", "Close", "price"];

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Closing prices for one symbol within `[start, end]`.
    pub fn read_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, SigtraderError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr.headers()?.clone();
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h.trim() == *name))
        };
        let date_col = find(&DATE_COLUMNS[..]).ok_or_else(|| SigtraderError::Data {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_col = find(&PRICE_COLUMNS[..]).ok_or_else(|| SigtraderError::Data {
            reason: format!("{}: missing close price column", path.display()),
        })?;

        let mut rows: Vec<(NaiveDate, Option<f64>)> = Vec::new();
        for result in rdr.records() {
            let record = result?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SigtraderError::Data {
                    reason: format!("{}: invalid date '{}': {}", path.display(), date_str, e),
                }
            })?;
            if date < start || date > end {
                continue;
            }

            let raw = record.get(price_col).unwrap_or_default().trim();
            let price = if raw.is_empty() {
                None
            } else {
                let v: f64 = raw.parse().map_err(|e| SigtraderError::Data {
                    reason: format!("{}: invalid price '{}': {}", path.display(), raw, e),
                })?;
                Some(v)
            };
            rows.push((date, price));
        }

        rows.sort_by_key(|(d, _)| *d);
        let (index, values): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let values = values
            .into_iter()
            .map(|v| v.filter(|p: &f64| p.is_finite()))
            .collect();
        TimeSeries::new(index, values).map_err(|e| SigtraderError::Data {
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

impl DataHandler for CsvDataAdapter {
    fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<PriceMatrix, SigtraderError> {
        tracing::debug!(
            dir = %self.base_path.display(),
            %frequency,
            "reading price files"
        );
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let s = self.read_symbol(symbol, start, end)?;
            tracing::debug!(symbol = %symbol, rows = s.len(), "loaded prices");
            series.push((symbol.clone(), s));
        }
        PriceMatrix::outer_join(series)
    }
}
