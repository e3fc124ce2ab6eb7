//! Output tree assembly.
//!
//! Rendering produces [`TargetFile`]s in memory. [`FileManifest::plan`]
//! checks them as a whole, then [`materialize`] writes them under the
//! output root. Nothing touches the disk until every file has rendered.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use layergen_core::{File, WriteResult, ensure_dir};
use tracing::{debug, info};

use crate::{Error, Result};

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    /// Directory relative to the output root, `/`-separated
    pub dir: String,
    pub name: String,
    pub body: String,
}

impl TargetFile {
    pub fn new(dir: impl Into<String>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            body: body.into(),
        }
    }

    /// Path relative to the output root, `/`-separated.
    pub fn path(&self) -> String {
        let dir = self.dir.trim_matches('/');
        if dir.is_empty() {
            self.name.clone()
        } else {
            format!("{dir}/{}", self.name)
        }
    }

    /// Location under `root`.
    pub fn full_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for component in self.dir.split('/').filter(|c| !c.is_empty()) {
            path.push(component);
        }
        path.push(&self.name);
        path
    }
}

/// The ordered files of one run.
#[derive(Debug, Clone, Default)]
pub struct FileManifest {
    files: Vec<TargetFile>,
}

impl FileManifest {
    /// Check rendered files before anything is written.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for duplicate paths and for paths that would leave
    /// the output root.
    pub fn plan(files: Vec<TargetFile>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for file in &files {
            let path = file.path();
            if file.name.is_empty()
                || file.name.contains('/')
                || path.starts_with('/')
                || path.split('/').any(|c| c == ".." || c == ".")
            {
                return Err(Error::config(format!(
                    "invalid output path '{path}': paths must stay inside the output root"
                )));
            }
            if !seen.insert(path.clone()) {
                return Err(Error::config(format!(
                    "more than one template renders '{path}'"
                )));
            }
        }
        Ok(Self { files })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetFile> {
        self.files.iter()
    }

    pub fn get(&self, path: &str) -> Option<&TargetFile> {
        self.files.iter().find(|f| f.path() == path)
    }

    /// Relative paths in manifest order.
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(TargetFile::path).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<TargetFile> {
        self.files
    }
}

/// Outcome of [`materialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: usize,
    pub unchanged: usize,
}

/// Write every file of `manifest` under `root`.
///
/// Directories are created as needed. Each body is written to a temporary
/// file and renamed into place; files that already hold the body are left
/// alone.
pub fn materialize(manifest: &FileManifest, root: &Path) -> Result<WriteStats> {
    ensure_dir(root).map_err(|e| Error::filesystem(root, e))?;

    let mut stats = WriteStats::default();
    for file in manifest.iter() {
        let path = file.full_path(root);
        if let Some(parent) = path.parent() {
            ensure_dir(parent).map_err(|e| Error::filesystem(parent, e))?;
        }

        match File::new(&path, file.body.as_str())
            .write()
            .map_err(|e| Error::filesystem(&path, e))?
        {
            WriteResult::Written => {
                debug!(path = %file.path(), "wrote file");
                stats.written += 1;
            }
            WriteResult::Unchanged => {
                debug!(path = %file.path(), "file unchanged");
                stats.unchanged += 1;
            }
        }
    }

    info!(
        root = %root.display(),
        written = stats.written,
        unchanged = stats.unchanged,
        "materialized output tree"
    );
    Ok(stats)
}
