//! Directional trading signals.

use std::fmt;

/// Per-symbol, per-period trading instruction. An unset cell is `None` in a
/// `SignalMatrix`, never a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Short,
    Flat,
    Long,
}

impl Signal {
    /// -1, 0 or +1.
    pub fn direction(self) -> f64 {
        match self {
            Signal::Short => -1.0,
            Signal::Flat => 0.0,
            Signal::Long => 1.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Short => write!(f, "-1"),
            Signal::Flat => write!(f, "0"),
            Signal::Long => write!(f, "1"),
        }
    }
}
