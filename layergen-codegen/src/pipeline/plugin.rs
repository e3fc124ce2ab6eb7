//! Checks a caller can add to every run.

use crate::{Result, assemble::TargetFile, model::Model};

/// Inspects what a run produces and may veto it.
///
/// `check_model` sees the model once the catalog has been adapted;
/// `check_file` sees each rendered file before output paths are planned.
/// An error from either aborts the run before anything is written.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn check_model(&self, _model: &Model) -> Result<()> {
        Ok(())
    }

    fn check_file(&self, _file: &TargetFile) -> Result<()> {
        Ok(())
    }
}
