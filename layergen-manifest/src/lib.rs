//! Parsing and validation of `layergen.toml` configuration files.
//!
//! A configuration declares one or more packages. Each package names a
//! compiler result document (catalog + queries), an output directory, the
//! template variant to render with and the settings that shape generation.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, ManifestSource, Result};
pub use manifest::{
    EmitOptions, LayergenToml, Manifest, PackageConfig, ParseContext, SUPPORTED_VERSION, Settings,
    TypeOverride, parse_manifest,
};
