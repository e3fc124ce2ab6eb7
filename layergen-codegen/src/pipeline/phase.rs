//! One step of a generation run.

use super::GenerationContext;
use crate::Result;

/// A step of the pipeline.
///
/// Each built-in phase fills one slot of the [`GenerationContext`]: adapt
/// sets `model`, render sets `files` and plan moves the files into
/// `manifest`. Phases added with [`Pipeline::phase`](super::Pipeline::phase)
/// run after plan and see the finished manifest.
pub trait Phase: Send + Sync {
    /// Name recorded on the diagnostics the phase raises.
    fn name(&self) -> &'static str;

    /// An error aborts the run; nothing has been written at that point.
    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()>;
}
