//! Dashboard rendering port trait.

use crate::domain::cycle::DashboardSnapshot;
use crate::domain::error::SentinelError;
use std::fs;
use std::path::Path;

/// Port for turning a refresh snapshot into a document.
pub trait ReportPort {
    fn render(&self, snapshot: &DashboardSnapshot) -> String;

    /// Default implementation: renders and writes the result to `output_path`.
    fn write(&self, snapshot: &DashboardSnapshot, output_path: &Path) -> Result<(), SentinelError> {
        fs::write(output_path, self.render(snapshot))?;
        Ok(())
    }
}
