//! Built-in pipeline phases.
//!
//! - [`AdaptPhase`] maps the catalog and queries onto the generation model
//! - [`RenderPhase`] renders and validates every file
//! - [`PlanPhase`] checks the rendered files as a whole

mod adapt;
mod plan;
mod render;

pub use adapt::AdaptPhase;
pub use plan::PlanPhase;
pub use render::RenderPhase;
