//! Template dispatch: which templates run for which unit, and with what.

use handlebars::Handlebars;
use layergen_manifest::EmitOptions;
use serde::Serialize;
use tracing::debug;

use super::{
    context::{EntityContext, SharedContext, SourceContext},
    helpers,
    validate::{GENERATED_HEADER, format_source},
};
use crate::{
    Error, Result,
    assemble::TargetFile,
    imports::{Target, resolve_imports},
    model::Model,
    naming,
    templates::{Scope, TemplateKind, TemplateRegistry, TemplateSpec, Variant, all_hold, expand},
};

/// Compiled templates of one variant.
pub struct Renderer<'a> {
    handlebars: Handlebars<'static>,
    variant: &'a Variant,
}

impl<'a> Renderer<'a> {
    /// Compile the shared partials and the templates of `variant`.
    pub fn new(registry: &'a TemplateRegistry, variant: &str) -> Result<Self> {
        let variant = registry.get(variant)?;

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        helpers::register(&mut handlebars);

        let compile_error = |template: &str, e: handlebars::TemplateError| Error::TemplateRender {
            unit: format!("variant {}", variant.name),
            template: template.to_string(),
            message: e.to_string(),
        };

        for (name, source) in registry.shared_partials() {
            handlebars
                .register_partial(name, source)
                .map_err(|e| compile_error(name, e))?;
        }
        for (name, source) in &variant.partials {
            let key = variant.partial_key(name);
            handlebars
                .register_partial(&key, source)
                .map_err(|e| compile_error(&key, e))?;
        }
        for (index, spec) in variant.templates.iter().enumerate() {
            let root = format!(
                "{{{{> header}}}}\n{{{{> imports}}}}\n{{{{> {}}}}}\n",
                variant.partial_key(&spec.partial)
            );
            handlebars
                .register_template_string(&root_name(index), root)
                .map_err(|e| compile_error(spec.display_name(), e))?;
        }

        Ok(Self {
            handlebars,
            variant,
        })
    }

    pub fn variant(&self) -> &Variant {
        self.variant
    }

    /// Render every file of a run, in order: per-entity files in catalog
    /// order, then query files in source order, then shared files.
    ///
    /// Every rendered file has been validated as Rust source. The first
    /// failure aborts the run.
    pub fn render(&self, model: &Model, emit: EmitOptions) -> Result<Vec<TargetFile>> {
        let mut files = Vec::new();

        for entity in &model.structs {
            let scope = Scope {
                model,
                entity: Some(entity),
                emit,
            };
            let unit = format!("entity {}", entity.name);
            let module = naming::field_ident(&entity.name);
            let snake = naming::plain_ident(&module).to_string();
            let vars = [
                ("entity", entity.name.as_str()),
                ("entity_snake", snake.as_str()),
                ("module", module.as_str()),
            ];

            for (index, spec) in self.templates(|k| k.is_per_entity()) {
                if !all_hold(&spec.when, &scope) {
                    continue;
                }
                let imports = resolve_imports(Target::Entity(entity), spec, model, emit);
                let context = EntityContext::new(
                    title(spec, &vars),
                    entity,
                    model,
                    emit,
                    imports.render(),
                );
                files.push(self.render_file(index, spec, &unit, &vars, &context)?);
            }
        }

        let scope = Scope {
            model,
            entity: None,
            emit,
        };

        for source in model.sources() {
            let unit = format!("source {source}");
            let module = super::context::source_module(source);
            let stem = naming::plain_ident(&module).to_string();
            let vars = [
                ("source", stem.as_str()),
                ("source_file", source),
                ("module", module.as_str()),
            ];

            for (index, spec) in self.templates(|k| k == TemplateKind::QueryFile) {
                if !all_hold(&spec.when, &scope) {
                    continue;
                }
                let imports = resolve_imports(Target::Source(source), spec, model, emit);
                let context =
                    SourceContext::new(title(spec, &vars), source, model, emit, imports.render());
                files.push(self.render_file(index, spec, &unit, &vars, &context)?);
            }
        }

        for (index, spec) in self.templates(|k| k == TemplateKind::Shared) {
            if !all_hold(&spec.when, &scope) {
                continue;
            }
            let vars = [("name", spec.display_name())];
            let imports = resolve_imports(Target::Shared, spec, model, emit);
            let context = SharedContext::new(title(spec, &vars), model, emit, imports.render());
            files.push(self.render_file(index, spec, "shared files", &vars, &context)?);
        }

        Ok(files)
    }

    fn templates(
        &self,
        kinds: impl Fn(TemplateKind) -> bool,
    ) -> impl Iterator<Item = (usize, &TemplateSpec)> {
        self.variant
            .templates
            .iter()
            .enumerate()
            .filter(move |(_, spec)| kinds(spec.kind))
    }

    fn render_file<T: Serialize>(
        &self,
        index: usize,
        spec: &TemplateSpec,
        unit: &str,
        vars: &[(&str, &str)],
        context: &T,
    ) -> Result<TargetFile> {
        let template = format!("{}/{}", self.variant.name, spec.display_name());
        let mut file = TargetFile::new(expand(&spec.dir, vars), expand(&spec.file, vars), "");

        let text = self
            .handlebars
            .render(&root_name(index), context)
            .map_err(|e| Error::TemplateRender {
                unit: unit.to_string(),
                template: template.clone(),
                message: e.to_string(),
            })?;

        let formatted = format_source(&text).map_err(|message| Error::SourceValidation {
            unit: unit.to_string(),
            template: template.clone(),
            file: file.path(),
            message,
        })?;

        debug!(unit, template = %template, path = %file.path(), "rendered file");
        file.body = format!("{GENERATED_HEADER}{formatted}");
        Ok(file)
    }
}

fn root_name(index: usize) -> String {
    format!("__root_{index}")
}

fn title(spec: &TemplateSpec, vars: &[(&str, &str)]) -> String {
    let pattern = spec.title.as_deref().unwrap_or(match spec.kind {
        TemplateKind::EntityModel => "{entity} model.",
        TemplateKind::RepositoryInterface => "{entity} repository.",
        TemplateKind::RepositoryImplementation => "Postgres implementation of the {entity} repository.",
        TemplateKind::UsecaseInterface => "{entity} use cases.",
        TemplateKind::UsecaseImplementation => "{entity} service.",
        TemplateKind::EntityHandler => "HTTP handlers for {entity}.",
        TemplateKind::EntityPayload => "{entity} request payload.",
        TemplateKind::EntityRouter => "HTTP routes for {entity}.",
        TemplateKind::QueryFile => "Queries from {source_file}.",
        TemplateKind::Shared => "Generated {name} module.",
    });
    expand(pattern, vars)
}
