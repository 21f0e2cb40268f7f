//! Report log port.

use crate::domain::error::SigtraderError;
use crate::domain::report::PerformanceReport;
use std::path::Path;

/// Port for writing the plain-text performance log.
pub trait ReportPort {
    fn write(&self, report: &PerformanceReport, output_dir: &Path) -> Result<(), SigtraderError>;
}
