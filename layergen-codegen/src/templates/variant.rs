//! Variant definitions, as declared in `variant.toml`.

use std::collections::BTreeMap;

use layergen_manifest::EmitOptions;
use serde::Deserialize;

use crate::model::{Model, Struct};

/// The closed set of template kinds a variant must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    EntityModel,
    RepositoryInterface,
    RepositoryImplementation,
    UsecaseInterface,
    UsecaseImplementation,
    EntityHandler,
    EntityPayload,
    EntityRouter,
    QueryFile,
    Shared,
}

impl TemplateKind {
    /// Kinds that must appear exactly once in every variant.
    pub const REQUIRED: &'static [TemplateKind] = &[
        TemplateKind::EntityModel,
        TemplateKind::RepositoryInterface,
        TemplateKind::RepositoryImplementation,
        TemplateKind::UsecaseInterface,
        TemplateKind::UsecaseImplementation,
        TemplateKind::EntityHandler,
        TemplateKind::EntityPayload,
        TemplateKind::EntityRouter,
        TemplateKind::QueryFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityModel => "entity_model",
            Self::RepositoryInterface => "repository_interface",
            Self::RepositoryImplementation => "repository_implementation",
            Self::UsecaseInterface => "usecase_interface",
            Self::UsecaseImplementation => "usecase_implementation",
            Self::EntityHandler => "entity_handler",
            Self::EntityPayload => "entity_payload",
            Self::EntityRouter => "entity_router",
            Self::QueryFile => "query_file",
            Self::Shared => "shared",
        }
    }

    /// Rendered once per struct.
    pub fn is_per_entity(&self) -> bool {
        !matches!(self, Self::QueryFile | Self::Shared)
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate gating a template or one of its imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The entity has a single-column primary key
    Id,
    /// The entity can be updated by key
    Updatable,
    /// Some queries return the entity
    EntityQueries,
    /// `emit.interface` is on
    Interface,
    JsonTags,
    /// Payloads are read from forms
    FormTags,
    DbTags,
    /// `emit.db_tags` is off, rows are decoded by hand
    ManualDecode,
    /// The catalog declares enums
    Enums,
    /// The run has queries
    Queries,
}

/// What conditions are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub model: &'a Model,
    pub entity: Option<&'a Struct>,
    pub emit: EmitOptions,
}

impl Condition {
    pub fn holds(&self, scope: &Scope<'_>) -> bool {
        match self {
            Self::Id => scope.entity.is_some_and(Struct::id_exists),
            Self::Updatable => scope.entity.is_some_and(Struct::updatable),
            Self::EntityQueries => scope
                .entity
                .is_some_and(|e| scope.model.entity_queries(e).next().is_some()),
            Self::Interface => scope.emit.interface,
            Self::JsonTags => scope.emit.json_tags,
            Self::FormTags => scope.emit.form_tags,
            Self::DbTags => scope.emit.db_tags,
            Self::ManualDecode => !scope.emit.db_tags,
            Self::Enums => !scope.model.enums.is_empty(),
            Self::Queries => !scope.model.queries.is_empty(),
        }
    }
}

/// Returns true if every condition holds.
pub fn all_hold(conditions: &[Condition], scope: &Scope<'_>) -> bool {
    conditions.iter().all(|c| c.holds(scope))
}

/// A base import of a template: a bare path or a conditional one.
///
/// Paths may use the placeholders `{entity}`, `{module}`, `{model}`,
/// `{repository}`, `{usecase}`, `{delivery}` and `{queries}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImportSpec {
    Path(String),
    Conditional {
        path: String,
        when: Vec<Condition>,
    },
}

impl ImportSpec {
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::Conditional { path, .. } => path,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            Self::Path(_) => &[],
            Self::Conditional { when, .. } => when,
        }
    }
}

/// Whether a shared template imports the types of every query signature:
/// `true`, `false` or the conditions under which it does.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SignatureImports {
    Toggle(bool),
    When(Vec<Condition>),
}

impl Default for SignatureImports {
    fn default() -> Self {
        Self::Toggle(false)
    }
}

impl SignatureImports {
    pub fn applies(&self, scope: &Scope<'_>) -> bool {
        match self {
            Self::Toggle(on) => *on,
            Self::When(conditions) => all_hold(conditions, scope),
        }
    }
}

/// One `[[templates]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    pub kind: TemplateKind,
    /// Name of the shared file; defaults to the partial name
    #[serde(default)]
    pub name: Option<String>,
    /// Partial rendering the body
    pub partial: String,
    /// Output directory relative to the root, `/`-separated
    pub dir: String,
    /// Output file name
    pub file: String,
    /// Title line of the generated file; may use the path placeholders
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub imports: Vec<ImportSpec>,
    /// Render only when every condition holds
    #[serde(default)]
    pub when: Vec<Condition>,
    #[serde(default)]
    pub signature_imports: SignatureImports,
}

impl TemplateSpec {
    /// Name used in error messages and logs.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.partial)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VariantFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub templates: Vec<TemplateSpec>,
}

/// A validated template set.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub description: String,
    pub templates: Vec<TemplateSpec>,
    /// Variant-local partial sources by name
    pub partials: BTreeMap<String, String>,
}

impl Variant {
    /// Templates of one kind, in declaration order.
    pub fn templates_of(&self, kind: TemplateKind) -> impl Iterator<Item = &TemplateSpec> {
        self.templates.iter().filter(move |t| t.kind == kind)
    }

    /// Registered name of a partial: variant-local partials are namespaced
    /// by the variant name, shared ones are not.
    pub fn partial_key(&self, partial: &str) -> String {
        if self.partials.contains_key(partial) {
            format!("{}/{partial}", self.name)
        } else {
            partial.to_string()
        }
    }
}

/// Substitute `{name}` placeholders.
pub fn expand(pattern: &str, vars: &[(&str, &str)]) -> String {
    let mut out = pattern.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant_file() {
        let file: VariantFile = toml::from_str(
            r#"
            name = "demo"

            [[templates]]
            kind = "repository_implementation"
            partial = "repository_postgres"
            dir = "repository/{entity_snake}"
            file = "postgres.rs"
            imports = [
                "sqlx::PgPool",
                { path = "{queries}::Queries", when = ["entity_queries"] },
            ]
            "#,
        )
        .unwrap();

        let spec = &file.templates[0];
        assert_eq!(spec.kind, TemplateKind::RepositoryImplementation);
        assert_eq!(spec.display_name(), "repository_postgres");
        assert_eq!(spec.imports[0], ImportSpec::Path("sqlx::PgPool".into()));
        assert_eq!(spec.imports[1].conditions(), &[Condition::EntityQueries]);
        assert_eq!(spec.signature_imports, SignatureImports::Toggle(false));
    }

    #[test]
    fn test_conditional_signature_imports() {
        let file: VariantFile = toml::from_str(
            r#"
            name = "demo"

            [[templates]]
            kind = "shared"
            partial = "queries_mod"
            dir = "repository/queries"
            file = "mod.rs"
            signature_imports = ["interface"]
            "#,
        )
        .unwrap();
        assert_eq!(
            file.templates[0].signature_imports,
            SignatureImports::When(vec![Condition::Interface])
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<VariantFile, _> = toml::from_str(
            r#"
            name = "demo"
            [[templates]]
            kind = "graphql_resolver"
            partial = "x"
            dir = "x"
            file = "x.rs"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expand() {
        assert_eq!(
            expand(
                "repository/{entity_snake}/{entity}.rs",
                &[("entity_snake", "post"), ("entity", "Post")]
            ),
            "repository/post/Post.rs"
        );
    }
}
