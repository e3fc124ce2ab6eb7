//! Adapt phase: catalog and queries to generation model.

use tracing::debug;

use crate::{
    Result, adapter,
    pipeline::{GenerationContext, Phase},
};

pub struct AdaptPhase;

impl Phase for AdaptPhase {
    fn name(&self) -> &'static str {
        "adapt"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let adapted = adapter::build_model(
            &ctx.input.catalog,
            &ctx.input.queries,
            ctx.settings,
        )?;

        debug!(
            structs = adapted.model.structs.len(),
            enums = adapted.model.enums.len(),
            queries = adapted.model.queries.len(),
            "adapted catalog"
        );
        ctx.diagnostics.extend(adapted.diagnostics);
        ctx.model = Some(adapted.model);
        Ok(())
    }
}
