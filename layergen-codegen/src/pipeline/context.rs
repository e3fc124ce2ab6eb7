//! State carried through the phases of one generation run.

use layergen_catalog::CompilerResult;
use layergen_manifest::Settings;

use super::diagnostic::{Diagnostic, Severity};
use crate::{
    assemble::{FileManifest, TargetFile},
    model::Model,
    templates::TemplateRegistry,
};

/// Context passed through all pipeline phases.
///
/// Inputs are borrowed and never mutated. Each built-in phase fills in its
/// own slot: `model` after adapting, `files` after rendering and `manifest`
/// after planning.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    pub input: &'a CompilerResult,
    pub settings: &'a Settings,
    pub registry: &'a TemplateRegistry,
    pub model: Option<Model>,
    /// Rendered and validated files, in render order; moved into
    /// `manifest` by planning
    pub files: Vec<TargetFile>,
    pub manifest: Option<FileManifest>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        input: &'a CompilerResult,
        settings: &'a Settings,
        registry: &'a TemplateRegistry,
    ) -> Self {
        Self {
            input,
            settings,
            registry,
            model: None,
            files: Vec::new(),
            manifest: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }
}
