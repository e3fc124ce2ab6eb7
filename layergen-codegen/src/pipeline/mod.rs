//! Generation pipeline.
//!
//! A [`Pipeline`] runs the built-in phases (adapt, render, plan) followed
//! by any user phases; plugins check the model and every rendered file
//! along the way. Nothing is written to disk by the pipeline itself: the
//! planned [`FileManifest`](crate::assemble::FileManifest) is materialized
//! afterwards.
//!
//! # Example
//!
//! ```ignore
//! use layergen_codegen::pipeline::Pipeline;
//!
//! let ctx = Pipeline::new().run(&input, &settings, &registry)?;
//! for warning in ctx.warnings() {
//!     eprintln!("{warning}");
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::GenerationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use plugin::Plugin;
pub use runner::Pipeline;
