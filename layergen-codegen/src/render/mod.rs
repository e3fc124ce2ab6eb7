//! Rendering of templates into validated Rust source.

pub mod context;
mod helpers;
mod renderer;
mod validate;

pub use renderer::Renderer;
pub use validate::{GENERATED_HEADER, format_source};
