//! Market data port.

use crate::domain::error::SigtraderError;
use crate::domain::frame::PriceMatrix;
use crate::domain::frequency::Frequency;
use chrono::NaiveDate;

pub trait DataHandler {
    /// Prices for `symbols` between `start` and `end` inclusive, outer-joined
    /// onto one index with columns in the order requested.
    fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<PriceMatrix, SigtraderError>;
}
