//! Core utilities and types for the layergen code generator.
//!
//! This crate provides the string and filesystem primitives shared by the
//! generation engine and the CLI.

mod file;
mod utils;

// File operations
pub use file::{File, WriteResult, ensure_dir, write_atomic};
// String utilities
pub use utils::{to_screaming_snake_case, to_snake_case};
