use super::{Signals, Strategy};
use crate::domain::error::SigtraderError;
use crate::domain::frame::{Frame, PriceMatrix};
use crate::domain::signal::Signal;

/// Long every symbol at every timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn generate_signals(&self, prices: &PriceMatrix) -> Result<Signals, SigtraderError> {
        let matrix = Frame::filled(prices.index(), prices.symbols(), Some(Signal::Long));
        Ok(Signals::new(matrix))
    }
}
