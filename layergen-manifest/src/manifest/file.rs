use std::path::{Path, PathBuf};

use super::{Manifest, PackageConfig};
use crate::Result;

/// Represents a layergen.toml file with both raw content and parsed manifest.
#[derive(Debug, Clone)]
pub struct LayergenToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl LayergenToml {
    /// Open and parse a layergen.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths in the manifest resolve against.
    pub fn root(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Packages with their paths resolved against the manifest directory.
    pub fn packages(&self) -> Vec<PackageConfig> {
        let root = self.root();
        self.manifest
            .packages
            .iter()
            .map(|p| p.resolved_against(root))
            .collect()
    }
}
