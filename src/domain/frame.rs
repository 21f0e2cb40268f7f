//! Symbol-by-date matrices sharing one index.
//!
//! - `PriceMatrix`: prices per symbol, outer-joined onto a common index
//! - `SignalMatrix`: `Signal` per symbol, `None` while unset
//! - `WeightMatrix`: fraction of capital per symbol

use crate::domain::error::SigtraderError;
use crate::domain::signal::Signal;
use crate::domain::timeseries::{validate_index, TimeSeries};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    index: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<Option<T>>>,
}

pub type PriceMatrix = Frame<f64>;
pub type SignalMatrix = Frame<Signal>;
pub type WeightMatrix = Frame<f64>;

impl<T: Copy> Frame<T> {
    pub fn new(
        index: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<Option<T>>>,
    ) -> Result<Self, SigtraderError> {
        if symbols.len() != columns.len() {
            return Err(SigtraderError::Data {
                reason: format!(
                    "{} symbols but {} columns",
                    symbols.len(),
                    columns.len()
                ),
            });
        }
        if let Some((sym, col)) = symbols
            .iter()
            .zip(&columns)
            .find(|(_, c)| c.len() != index.len())
        {
            return Err(SigtraderError::Data {
                reason: format!(
                    "column {} has {} values for an index of {}",
                    sym,
                    col.len(),
                    index.len()
                ),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = symbols.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(SigtraderError::Data {
                reason: format!("duplicate symbol {}", dup),
            });
        }
        validate_index(&index)?;
        Ok(Self {
            index,
            symbols,
            columns,
        })
    }

    /// A frame with every cell set to `value`.
    pub fn filled(index: &[NaiveDate], symbols: &[String], value: Option<T>) -> Self {
        Self {
            index: index.to_vec(),
            symbols: symbols.to_vec(),
            columns: vec![vec![value; index.len()]; symbols.len()],
        }
    }

    /// An all-unset frame aligned to `other`'s index and columns.
    pub fn empty_like<U>(other: &Frame<U>) -> Self {
        Self::filled(&other.index, &other.symbols, None)
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column(&self, col: usize) -> &[Option<T>] {
        &self.columns[col]
    }

    pub fn column_by_symbol(&self, symbol: &str) -> Option<&[Option<T>]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.columns
            .get(col)
            .and_then(|c| c.get(row))
            .copied()
            .flatten()
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<T>) {
        self.columns[col][row] = value;
    }

    /// Set every column of one row at once.
    pub fn set_row(&mut self, row: usize, values: &[Option<T>]) {
        for (col, v) in values.iter().enumerate() {
            self.columns[col][row] = *v;
        }
    }

    /// Same index and the same symbols in the same order.
    pub fn is_aligned_with<U>(&self, other: &Frame<U>) -> bool {
        self.index == other.index && self.symbols == other.symbols
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Frame<U> {
        Frame {
            index: self.index.clone(),
            symbols: self.symbols.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c.iter().map(|v| v.map(&f)).collect())
                .collect(),
        }
    }
}

impl Frame<f64> {
    /// Align series onto the union of their dates. A symbol with no
    /// observation on a date is missing there; other symbols are unaffected.
    pub fn outer_join(series: Vec<(String, TimeSeries)>) -> Result<Self, SigtraderError> {
        let index: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, s)| s.index().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut symbols = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());
        for (symbol, s) in series {
            columns.push(s.reindex(&index).values().to_vec());
            symbols.push(symbol);
        }
        Self::new(index, symbols, columns)
    }

    /// One column as a standalone series.
    pub fn series(&self, col: usize) -> TimeSeries {
        TimeSeries::from_validated(self.index.clone(), self.columns[col].clone())
    }
}
