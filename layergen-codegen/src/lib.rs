//! Catalog-driven code generation for layered Rust services.
//!
//! The engine reads a schema catalog and a list of annotated queries, maps
//! them onto a language-level [`model::Model`], renders one file per
//! (entity, template), per query source and per shared template of the
//! selected variant, validates every file as Rust source and only then
//! writes the output tree.
//!
//! # Modules
//!
//! - [`naming`] - identifier resolution (pascal case, acronyms, renames)
//! - [`mappers`] - database type to semantic type mapping
//! - [`adapter`] - catalog and queries to generation model
//! - [`templates`] - variants, template specs and the registry
//! - [`imports`] - per-file import resolution
//! - [`render`] - template dispatch, rendering and source validation
//! - [`assemble`] - output manifest and materialization
//! - [`pipeline`] - phase orchestration with plugin hooks

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod adapter;
pub mod assemble;
mod error;
pub mod imports;
pub mod mappers;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod render;
pub mod templates;

use std::path::Path;

pub use assemble::{FileManifest, TargetFile, WriteStats, materialize};
pub use error::{Error, Result};
use layergen_catalog::CompilerResult;
use layergen_manifest::Settings;
pub use pipeline::{Diagnostic, Pipeline, Severity};
pub use render::GENERATED_HEADER;
pub use templates::TemplateRegistry;
use tracing::info;

/// Entry point for one package: holds the template registry a run needs.
#[derive(Debug, Clone)]
pub struct Generator {
    registry: TemplateRegistry,
}

/// Outcome of a successful run, before anything is written.
#[derive(Debug, Clone)]
pub struct Generated {
    pub manifest: FileManifest,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }

    /// Write every file under `root`.
    pub fn write(&self, root: &Path) -> Result<WriteStats> {
        materialize(&self.manifest, root)
    }
}

impl Generator {
    /// Generator for `settings`: the built-in variants plus any under the
    /// configured template directory.
    pub fn new(settings: &Settings) -> Result<Self> {
        let registry = match &settings.template_dir {
            Some(dir) => TemplateRegistry::with_dir(dir)?,
            None => TemplateRegistry::builtin()?,
        };
        Ok(Self { registry })
    }

    pub fn with_registry(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Run every phase in memory.
    ///
    /// # Errors
    ///
    /// The first configuration, mapping, render or validation failure.
    pub fn generate(&self, input: &CompilerResult, settings: &Settings) -> Result<Generated> {
        let mut ctx = Pipeline::new().run(input, settings, &self.registry)?;
        let manifest = ctx.manifest.take().unwrap_or_default();

        info!(
            variant = %settings.variant,
            files = manifest.len(),
            warnings = ctx.warning_count(),
            "generated output tree"
        );

        Ok(Generated {
            manifest,
            diagnostics: ctx.diagnostics,
        })
    }

    /// Generate and write under `settings.out`.
    pub fn run(&self, input: &CompilerResult, settings: &Settings) -> Result<(Generated, WriteStats)> {
        let generated = self.generate(input, settings)?;
        let stats = generated.write(&settings.out)?;
        Ok((generated, stats))
    }
}
