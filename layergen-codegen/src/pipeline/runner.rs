//! Pipeline orchestrator.

use layergen_catalog::CompilerResult;
use layergen_manifest::Settings;
use tracing::debug;

use super::{
    GenerationContext, Phase, Plugin,
    phases::{AdaptPhase, PlanPhase, RenderPhase},
};
use crate::{Result, templates::TemplateRegistry};

/// Runs adapt, render and plan, then any phases added with
/// [`Pipeline::phase`].
///
/// Plugins see the model right after adapt and each rendered file right
/// after render.
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// # Errors
    ///
    /// The first error raised by a phase or plugin. Nothing has been
    /// written to disk at that point.
    pub fn run<'a>(
        &self,
        input: &'a CompilerResult,
        settings: &'a Settings,
        registry: &'a TemplateRegistry,
    ) -> Result<GenerationContext<'a>> {
        let mut ctx = GenerationContext::new(input, settings, registry);

        run_phase(&AdaptPhase, &mut ctx)?;
        if let Some(model) = &ctx.model {
            for plugin in &self.plugins {
                debug!(plugin = plugin.name(), "checking model");
                plugin.check_model(model)?;
            }
        }

        run_phase(&RenderPhase, &mut ctx)?;
        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), files = ctx.files.len(), "checking files");
            for file in &ctx.files {
                plugin.check_file(file)?;
            }
        }

        run_phase(&PlanPhase, &mut ctx)?;
        for phase in &self.phases {
            run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }
}

fn run_phase(phase: &dyn Phase, ctx: &mut GenerationContext<'_>) -> Result<()> {
    debug!(phase = phase.name(), "running phase");
    phase.run(ctx)
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{Error, assemble::TargetFile, model::Model};

    #[derive(Default)]
    struct Counts {
        models: AtomicUsize,
        files: AtomicUsize,
    }

    struct CountingPlugin(Arc<Counts>);

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn check_model(&self, _model: &Model) -> Result<()> {
            self.0.models.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn check_file(&self, _file: &TargetFile) -> Result<()> {
            self.0.files.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Vetoes tables without a primary key.
    struct RequireKeys;

    impl Plugin for RequireKeys {
        fn name(&self) -> &'static str {
            "require-keys"
        }

        fn check_model(&self, model: &Model) -> Result<()> {
            match model.structs.iter().find(|s| !s.id_exists()) {
                Some(keyless) => Err(Error::catalog(format!("table '{}' has no key", keyless.table))),
                None => Ok(()),
            }
        }
    }

    /// Vetoes one output path.
    struct RejectFile(&'static str);

    impl Plugin for RejectFile {
        fn name(&self) -> &'static str {
            "reject-file"
        }

        fn check_file(&self, file: &TargetFile) -> Result<()> {
            if file.path() == self.0 {
                return Err(Error::config(format!("{} is reserved", self.0)));
            }
            Ok(())
        }
    }

    /// Reports the size of the planned tree.
    struct Summary;

    impl Phase for Summary {
        fn name(&self) -> &'static str {
            "summary"
        }

        fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
            let files = ctx.manifest.as_ref().map_or(0, |m| m.len());
            ctx.add_info(self.name(), format!("{files} files"));
            Ok(())
        }
    }

    fn input() -> CompilerResult {
        CompilerResult::from_json_str(
            r#"{
                "catalog": {
                    "default_schema": "public",
                    "schemas": [{
                        "name": "public",
                        "tables": [{
                            "name": "authors",
                            "columns": [
                                {"name": "id", "data_type": "bigserial", "not_null": true, "primary_key": true},
                                {"name": "name", "data_type": "text", "not_null": true},
                                {"name": "bio", "data_type": "text"}
                            ]
                        }]
                    }]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let input = input();
        let settings = Settings::default();
        let registry = TemplateRegistry::builtin().unwrap();

        let ctx = Pipeline::new().run(&input, &settings, &registry).unwrap();

        assert!(ctx.model.is_some());
        assert!(ctx.files.is_empty());
        let manifest = ctx.manifest.as_ref().unwrap();
        assert!(manifest.get("model/author.rs").is_some());
        assert!(manifest.get("repository/author/postgres.rs").is_some());
        assert!(!ctx.has_warnings());
    }

    #[test]
    fn test_plugins_see_the_model_and_every_file() {
        let input = input();
        let settings = Settings::default();
        let registry = TemplateRegistry::builtin().unwrap();
        let counts = Arc::new(Counts::default());

        let ctx = Pipeline::new()
            .plugin(CountingPlugin(counts.clone()))
            .run(&input, &settings, &registry)
            .unwrap();

        assert_eq!(counts.models.load(Ordering::SeqCst), 1);
        assert_eq!(
            counts.files.load(Ordering::SeqCst),
            ctx.manifest.as_ref().unwrap().len()
        );
    }

    #[test]
    fn test_plugin_errors_abort_the_run() {
        let mut input = input();
        let settings = Settings::default();
        let registry = TemplateRegistry::builtin().unwrap();

        let err = Pipeline::new()
            .plugin(RejectFile("delivery/author/handler.rs"))
            .run(&input, &settings, &registry)
            .err()
            .unwrap();
        assert!(err.to_string().contains("delivery/author/handler.rs is reserved"));

        input.catalog.schemas[0].tables[0].columns[0].primary_key = false;
        let err = Pipeline::new()
            .plugin(RequireKeys)
            .run(&input, &settings, &registry)
            .err()
            .unwrap();
        assert!(matches!(err, Error::CatalogMapping { .. }));
        assert!(err.to_string().contains("'public.authors' has no key"));
    }

    #[test]
    fn test_extra_phases_see_the_manifest() {
        let input = input();
        let settings = Settings::default();
        let registry = TemplateRegistry::builtin().unwrap();

        let ctx = Pipeline::new()
            .phase(Summary)
            .run(&input, &settings, &registry)
            .unwrap();
        let summary = ctx.diagnostics.last().unwrap();
        assert_eq!(summary.phase, "summary");
        assert_eq!(
            summary.message,
            format!("{} files", ctx.manifest.as_ref().unwrap().len())
        );
    }
}
