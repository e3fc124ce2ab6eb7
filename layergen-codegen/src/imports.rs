//! Per-file import resolution.
//!
//! Every rendered file gets an [`ImportSet`] built from the variant's base
//! imports for its template plus whatever the model says the file refers
//! to. Modules and symbols are kept in lexical order so repeated runs render
//! identical `use` lists.

use std::collections::{BTreeMap, BTreeSet};

use layergen_manifest::EmitOptions;

use crate::{
    model::{CommandKind, Field, Model, Query, Shape, Struct},
    naming,
    templates::{Scope, TemplateKind, TemplateSpec, all_hold, expand},
};

/// Module path -> imported symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    imports: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import `symbol` from `module`.
    pub fn add(&mut self, module: &str, symbol: &str) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    /// Import a full path (`sqlx::PgPool`). A path without `::` imports the
    /// module itself.
    pub fn add_path(&mut self, path: &str) {
        match path.rsplit_once("::") {
            Some((module, symbol)) => self.add(module, symbol),
            None => self.add_module(path),
        }
    }

    /// Import a module without symbols (`use chrono;`).
    pub fn add_module(&mut self, module: &str) {
        self.imports.entry(module.to_string()).or_default();
    }

    pub fn merge(&mut self, other: &ImportSet) {
        for (module, symbols) in &other.imports {
            self.imports
                .entry(module.clone())
                .or_default()
                .extend(symbols.iter().cloned());
        }
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.imports.contains_key(module)
    }

    pub fn has_symbol(&self, module: &str, symbol: &str) -> bool {
        self.imports
            .get(module)
            .is_some_and(|symbols| symbols.contains(symbol))
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// One `use` statement per module.
    pub fn render(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|(module, symbols)| match symbols.len() {
                0 => format!("use {module};"),
                1 => format!("use {module}::{};", symbols.iter().next().map_or("", String::as_str)),
                _ => format!(
                    "use {module}::{{{}}};",
                    symbols.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
            .collect()
    }
}

/// The generation unit a file is rendered for.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Entity(&'a Struct),
    Source(&'a str),
    Shared,
}

/// Compute the imports of one file.
pub fn resolve_imports(
    target: Target<'_>,
    spec: &TemplateSpec,
    model: &Model,
    emit: EmitOptions,
) -> ImportSet {
    let entity = match target {
        Target::Entity(entity) => Some(entity),
        _ => None,
    };
    let scope = Scope {
        model,
        entity,
        emit,
    };

    let mut imports = ImportSet::new();
    let vars = placeholders(model, entity);
    let vars: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
    for import in &spec.imports {
        if all_hold(import.conditions(), &scope) {
            imports.add_path(&expand(import.path(), &vars));
        }
    }

    match (spec.kind, target) {
        (TemplateKind::EntityModel, Target::Entity(entity)) => {
            add_struct_derives(&mut imports, emit);
            for field in &entity.fields {
                add_field(&mut imports, field, model);
            }
        }
        (
            TemplateKind::RepositoryInterface
            | TemplateKind::RepositoryImplementation
            | TemplateKind::UsecaseInterface
            | TemplateKind::UsecaseImplementation
            | TemplateKind::EntityHandler,
            Target::Entity(entity),
        ) => {
            imports.add(&entity.import_path, &entity.name);
            if let Some(id) = entity.id_field() {
                add_field(&mut imports, id, model);
            }
            if spec.kind != TemplateKind::EntityHandler {
                for query in model.entity_queries(entity) {
                    add_signature(&mut imports, query, model, true);
                }
            }
        }
        (TemplateKind::QueryFile, Target::Source(source)) => {
            let queries = model.queries_in(source);
            if queries.iter().any(|q| q.synthesized().next().is_some()) {
                add_struct_derives(&mut imports, emit);
            }
            for query in queries {
                for shape in query.synthesized() {
                    for field in &shape.fields {
                        add_field(&mut imports, field, model);
                    }
                }
                add_signature(&mut imports, query, model, false);
            }
        }
        (TemplateKind::EntityPayload, Target::Entity(entity)) => {
            imports.add("serde", "Deserialize");
            imports.add(&entity.import_path, &entity.name);
            for field in entity.insert_fields() {
                add_field(&mut imports, field, model);
            }
        }
        (TemplateKind::Shared, _) if spec.signature_imports.applies(&scope) => {
            for query in &model.queries {
                add_signature(&mut imports, query, model, false);
            }
        }
        _ => {}
    }

    imports
}

/// Placeholder values for base import paths.
fn placeholders(model: &Model, entity: Option<&Struct>) -> Vec<(&'static str, String)> {
    let mut vars = vec![
        ("model", model.layers.model.clone()),
        ("repository", model.layers.repository.clone()),
        ("usecase", model.layers.usecase.clone()),
        ("delivery", model.layers.delivery.clone()),
        ("queries", model.layers.queries()),
    ];
    if let Some(entity) = entity {
        let module = naming::field_ident(&entity.name);
        vars.push(("entity_snake", naming::plain_ident(&module).to_string()));
        vars.push(("module", module));
        vars.push(("entity", entity.name.clone()));
    }
    vars
}

/// Derives on generated structs.
fn add_struct_derives(imports: &mut ImportSet, emit: EmitOptions) {
    imports.add("serde", "Deserialize");
    imports.add("serde", "Serialize");
    if emit.db_tags {
        imports.add("sqlx", "FromRow");
    } else {
        imports.add("sqlx::postgres", "PgRow");
        imports.add("sqlx", "Row");
    }
}

fn add_field(imports: &mut ImportSet, field: &Field, model: &Model) {
    for (module, symbol) in field.ty.base.imports() {
        imports.add(module, symbol);
    }
    if let crate::model::SemanticType::Enum(name) = &field.ty.base
        && let Some(e) = model.find_enum(name)
    {
        imports.add(&e.import_path, &e.name);
    }
}

/// Types a query's argument and result mention.
///
/// With `include_synthesized`, synthesized shapes are imported from the
/// queries module; otherwise they are assumed to be in scope.
fn add_signature(imports: &mut ImportSet, query: &Query, model: &Model, include_synthesized: bool) {
    for shape in [&query.arg, &query.ret] {
        match shape {
            Shape::None => {}
            Shape::Scalar(field) => add_field(imports, field, model),
            Shape::Struct(s) if s.is_synthesized() => {
                if include_synthesized {
                    imports.add(&s.import_path, &s.name);
                }
            }
            Shape::Struct(s) => imports.add(&s.import_path, &s.name),
        }
    }
    if query.command == CommandKind::ExecResult {
        imports.add("sqlx::postgres", "PgQueryResult");
    }
}
