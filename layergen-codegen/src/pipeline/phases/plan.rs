//! Plan phase: the output tree as a whole.

use crate::{
    Result,
    assemble::FileManifest,
    pipeline::{GenerationContext, Phase},
};

pub struct PlanPhase;

impl Phase for PlanPhase {
    fn name(&self) -> &'static str {
        "plan"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let manifest = FileManifest::plan(std::mem::take(&mut ctx.files))?;
        ctx.add_info(self.name(), format!("{} files planned", manifest.len()));
        ctx.manifest = Some(manifest);
        Ok(())
    }
}
