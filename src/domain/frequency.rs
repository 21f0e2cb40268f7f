//! Sampling frequency and annualisation factors.

use crate::domain::error::SigtraderError;
use std::fmt;
use std::str::FromStr;

/// Number of periods in a year, keyed by frequency name.
const ANNUALISATION_FACTORS: [(&str, f64); 5] = [
    ("hourly", 252.0 * 6.5),
    ("daily", 252.0),
    ("weekly", 52.0),
    ("monthly", 12.0),
    ("annually", 1.0),
];

/// Periods per year for `frequency`.
pub fn annualisation_factor(frequency: &str) -> Result<f64, SigtraderError> {
    ANNUALISATION_FACTORS
        .iter()
        .find(|(key, _)| *key == frequency)
        .map(|(_, n)| *n)
        .ok_or_else(|| SigtraderError::UnknownFrequency(frequency.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Annually,
}

impl Frequency {
    /// In table order.
    const ALL: [Frequency; 5] = [
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Annually,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Annually => "annually",
        }
    }

    pub fn periods_per_year(self) -> f64 {
        // Variant order matches the table.
        ANNUALISATION_FACTORS[self as usize].1
    }
}

impl FromStr for Frequency {
    type Err = SigtraderError;

    /// Keys must match the annualisation table exactly; only surrounding
    /// whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        annualisation_factor(key)?;
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| SigtraderError::UnknownFrequency(key.to_string()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
