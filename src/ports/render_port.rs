//! Rendering port. Implementations draw or export the derived series; they
//! compute nothing.

use crate::domain::error::SigtraderError;
use crate::domain::report::ReportSeries;
use std::path::{Path, PathBuf};

pub trait RenderPort {
    /// Render `series` into `output_dir`, returning the files written.
    fn render(
        &self,
        series: &ReportSeries,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, SigtraderError>;
}
