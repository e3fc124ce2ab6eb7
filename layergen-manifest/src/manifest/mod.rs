//! Manifest types and parsing for layergen.toml files.

mod file;
mod package;
mod parse;
mod validate;

pub use file::LayergenToml;
pub use package::{EmitOptions, PackageConfig, Settings, TypeOverride};
pub use parse::parse_manifest;
use serde::Deserialize;
pub use validate::ParseContext;

/// The only configuration version this release understands.
pub const SUPPORTED_VERSION: &str = "1";

/// Root manifest for layergen.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Configuration format version; checked after parsing.
    #[serde(default)]
    pub version: Option<String>,

    /// Packages in declaration order
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
}

impl Manifest {
    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Names of every declared package, in declaration order.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }
}
