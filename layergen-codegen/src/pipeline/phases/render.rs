//! Render phase: every template for every unit.

use crate::{
    Error, Result,
    pipeline::{GenerationContext, Phase},
    render::Renderer,
};

pub struct RenderPhase;

impl Phase for RenderPhase {
    fn name(&self) -> &'static str {
        "render"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let model = ctx
            .model
            .as_ref()
            .ok_or_else(|| Error::config("nothing to render: the adapt phase has not run"))?;

        let renderer = Renderer::new(ctx.registry, &ctx.settings.variant)?;
        let files = renderer.render(model, ctx.settings.emit)?;
        ctx.files = files;
        Ok(())
    }
}
