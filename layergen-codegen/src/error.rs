//! Error taxonomy for a generation run.
//!
//! Every variant is fatal for the run that raised it. Nothing is written to
//! disk before rendering and validation have succeeded for every file.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Invalid settings, unknown variant, incomplete template set, invalid
    /// or duplicate query names, duplicate output paths.
    #[error("configuration error: {message}")]
    #[diagnostic(code(layergen::config))]
    Config { message: String },

    /// The catalog cannot be mapped onto the generation model.
    #[error("catalog mapping error: {message}")]
    #[diagnostic(
        code(layergen::catalog),
        help("add a rename or a type override to layergen.toml to resolve it")
    )]
    CatalogMapping { message: String },

    /// A template failed to compile or execute.
    #[error("failed to render template '{template}' for {unit}: {message}")]
    #[diagnostic(code(layergen::template))]
    TemplateRender {
        unit: String,
        template: String,
        message: String,
    },

    /// A rendered file does not parse as Rust source.
    #[error("generated file '{file}' for {unit} (template '{template}') is not valid Rust: {message}")]
    #[diagnostic(
        code(layergen::source_validation),
        help("the template produced malformed code; nothing was written")
    )]
    SourceValidation {
        unit: String,
        template: String,
        file: String,
        message: String,
    },

    /// Directory creation or file writing failed.
    #[error("filesystem error at '{}'", path.display())]
    #[diagnostic(code(layergen::filesystem))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::CatalogMapping {
            message: message.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Short category name, used for one-line reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::CatalogMapping { .. } => "catalog",
            Self::TemplateRender { .. } => "template",
            Self::SourceValidation { .. } => "validation",
            Self::Filesystem { .. } => "filesystem",
        }
    }
}
