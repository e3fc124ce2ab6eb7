//! Template registry: variant name to template set.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::variant::{TemplateKind, Variant, VariantFile};
use crate::{Error, Result};

macro_rules! asset {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $path))
    };
}

/// Partials every variant can use.
const SHARED_PARTIALS: &[(&str, &str)] = &[
    ("header", asset!("partials/header.hbs")),
    ("imports", asset!("partials/imports.hbs")),
    ("struct", asset!("partials/struct.hbs")),
    ("model", asset!("partials/model.hbs")),
    ("model_enums", asset!("partials/model_enums.hbs")),
    ("model_mod", asset!("partials/model_mod.hbs")),
    ("repository", asset!("partials/repository.hbs")),
    ("repository_postgres", asset!("partials/repository_postgres.hbs")),
    ("repository_mod", asset!("partials/repository_mod.hbs")),
    ("usecase", asset!("partials/usecase.hbs")),
    ("usecase_service", asset!("partials/usecase_service.hbs")),
    ("usecase_mod", asset!("partials/usecase_mod.hbs")),
    ("payload", asset!("partials/payload.hbs")),
    ("signature", asset!("partials/signature.hbs")),
    ("query_body", asset!("partials/query_body.hbs")),
    ("queries", asset!("partials/queries.hbs")),
    ("queries_mod", asset!("partials/queries_mod.hbs")),
];

type Builtin = (&'static str, &'static [(&'static str, &'static str)]);

const BUILTIN_VARIANTS: &[Builtin] = &[
    (
        asset!("axum_sqlx/variant.toml"),
        &[
            ("handler", asset!("axum_sqlx/handler.hbs")),
            ("router", asset!("axum_sqlx/router.hbs")),
            ("delivery_mod", asset!("axum_sqlx/delivery_mod.hbs")),
        ],
    ),
    (
        asset!("actix_sqlx/variant.toml"),
        &[
            ("handler", asset!("actix_sqlx/handler.hbs")),
            ("routes", asset!("actix_sqlx/routes.hbs")),
            ("delivery_mod", asset!("actix_sqlx/delivery_mod.hbs")),
        ],
    ),
];

/// File naming a variant inside a template directory.
pub const VARIANT_FILE: &str = "variant.toml";

/// Every known variant plus the shared partials.
///
/// Immutable once built, so one registry can serve any number of runs.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    shared: BTreeMap<String, String>,
    variants: BTreeMap<String, Variant>,
}

impl TemplateRegistry {
    /// Registry holding the embedded variants.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self {
            shared: SHARED_PARTIALS
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect(),
            variants: BTreeMap::new(),
        };

        for (definition, partials) in BUILTIN_VARIANTS {
            let partials = partials
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect();
            registry.register(definition, partials, "built-in variant")?;
        }

        Ok(registry)
    }

    /// Builtin registry extended with the variants under `dir`.
    pub fn with_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::builtin()?;
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Load variants from a template directory.
    ///
    /// `dir` is either a variant itself (it holds a `variant.toml`) or a
    /// directory of variants, one per subdirectory. A loaded variant
    /// replaces a registered one of the same name.
    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        if dir.join(VARIANT_FILE).is_file() {
            return self.load_variant_dir(dir);
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| Error::filesystem(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.join(VARIANT_FILE).is_file())
            .collect();
        dirs.sort();

        if dirs.is_empty() {
            return Err(Error::config(format!(
                "template directory '{}' contains no {VARIANT_FILE}",
                dir.display()
            )));
        }

        for variant_dir in dirs {
            self.load_variant_dir(&variant_dir)?;
        }
        Ok(())
    }

    fn load_variant_dir(&mut self, dir: &Path) -> Result<()> {
        let definition_path = dir.join(VARIANT_FILE);
        let definition = fs::read_to_string(&definition_path)
            .map_err(|e| Error::filesystem(&definition_path, e))?;

        let mut partials = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::filesystem(dir, e))? {
            let path = entry.map_err(|e| Error::filesystem(dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "hbs")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                let source =
                    fs::read_to_string(&path).map_err(|e| Error::filesystem(&path, e))?;
                partials.insert(stem.to_string(), source);
            }
        }

        self.register(
            &definition,
            partials,
            &definition_path.display().to_string(),
        )
    }

    /// Parse, validate and register one variant.
    pub fn register(
        &mut self,
        definition: &str,
        partials: BTreeMap<String, String>,
        origin: &str,
    ) -> Result<()> {
        let file: VariantFile = toml::from_str(definition)
            .map_err(|e| Error::config(format!("invalid variant definition in {origin}: {e}")))?;

        let variant = Variant {
            name: file.name,
            description: file.description,
            templates: file.templates,
            partials,
        };
        self.validate(&variant)?;

        debug!(
            variant = %variant.name,
            templates = variant.templates.len(),
            origin,
            "registered template variant"
        );
        self.variants.insert(variant.name.clone(), variant);
        Ok(())
    }

    fn validate(&self, variant: &Variant) -> Result<()> {
        let name = &variant.name;
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::config(format!("invalid variant name '{name}'")));
        }

        for kind in TemplateKind::REQUIRED {
            match variant.templates_of(*kind).count() {
                0 => {
                    return Err(Error::config(format!(
                        "variant '{name}' is missing the '{kind}' template"
                    )));
                }
                1 => {}
                _ => {
                    return Err(Error::config(format!(
                        "variant '{name}' declares the '{kind}' template more than once"
                    )));
                }
            }
        }

        let mut shared: Vec<&str> = Vec::new();
        for spec in variant.templates_of(TemplateKind::Shared) {
            if shared.contains(&spec.display_name()) {
                return Err(Error::config(format!(
                    "variant '{name}' declares the shared template '{}' more than once",
                    spec.display_name()
                )));
            }
            shared.push(spec.display_name());
        }
        if shared.is_empty() {
            return Err(Error::config(format!(
                "variant '{name}' declares no shared templates"
            )));
        }

        for spec in &variant.templates {
            if !variant.partials.contains_key(&spec.partial)
                && !self.shared.contains_key(&spec.partial)
            {
                return Err(Error::config(format!(
                    "template '{}' of variant '{name}' uses unknown partial '{}'",
                    spec.display_name(),
                    spec.partial
                )));
            }
        }

        Ok(())
    }

    /// Look up a variant.
    pub fn get(&self, name: &str) -> Result<&Variant> {
        self.variants.get(name).ok_or_else(|| {
            Error::config(format!(
                "unknown template variant '{name}' (available: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Variant names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    /// Shared partial sources by name.
    pub fn shared_partials(&self) -> &BTreeMap<String, String> {
        &self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        name = "minimal"

        [[templates]]
        kind = "entity_model"
        partial = "model"
        dir = "model"
        file = "{entity_snake}.rs"

        [[templates]]
        kind = "repository_interface"
        partial = "repository"
        dir = "repository/{entity_snake}"
        file = "mod.rs"

        [[templates]]
        kind = "repository_implementation"
        partial = "repository_postgres"
        dir = "repository/{entity_snake}"
        file = "postgres.rs"

        [[templates]]
        kind = "usecase_interface"
        partial = "usecase"
        dir = "usecase/{entity_snake}"
        file = "mod.rs"

        [[templates]]
        kind = "usecase_implementation"
        partial = "usecase_service"
        dir = "usecase/{entity_snake}"
        file = "service.rs"

        [[templates]]
        kind = "entity_handler"
        partial = "handler"
        dir = "delivery"
        file = "{entity_snake}.rs"

        [[templates]]
        kind = "entity_payload"
        partial = "payload"
        dir = "delivery"
        file = "{entity_snake}_payload.rs"

        [[templates]]
        kind = "entity_router"
        partial = "handler"
        dir = "delivery"
        file = "{entity_snake}_router.rs"

        [[templates]]
        kind = "query_file"
        partial = "queries"
        dir = "repository/queries"
        file = "{source}.rs"

        [[templates]]
        kind = "shared"
        partial = "model_mod"
        dir = "model"
        file = "mod.rs"
    "#;

    fn handler_partial() -> BTreeMap<String, String> {
        BTreeMap::from([("handler".to_string(), "pub fn handler() {}".to_string())])
    }

    #[test]
    fn test_builtin_variants() {
        let registry = TemplateRegistry::builtin().unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["actix_sqlx", "axum_sqlx"]);

        let axum = registry.get("axum_sqlx").unwrap();
        assert_eq!(axum.partial_key("handler"), "axum_sqlx/handler");
        assert_eq!(axum.partial_key("model"), "model");
    }

    #[test]
    fn test_unknown_variant() {
        let registry = TemplateRegistry::builtin().unwrap();
        let err = registry.get("rocket_diesel").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("available: actix_sqlx, axum_sqlx"));
    }

    #[test]
    fn test_register_custom_variant() {
        let mut registry = TemplateRegistry::builtin().unwrap();
        registry
            .register(MINIMAL, handler_partial(), "test")
            .unwrap();
        assert!(registry.get("minimal").is_ok());
    }

    #[test]
    fn test_template_kind_counts() {
        let mut registry = TemplateRegistry::builtin().unwrap();

        let definition = MINIMAL.replace("kind = \"entity_router\"", "kind = \"shared\"");
        let err = registry
            .register(&definition, handler_partial(), "test")
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(
            err.to_string()
                .contains("variant 'minimal' is missing the 'entity_router' template")
        );

        let definition = MINIMAL.replace("kind = \"entity_router\"", "kind = \"entity_handler\"");
        let err = registry
            .register(&definition, handler_partial(), "test")
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("declares the 'entity_handler' template more than once")
        );

        let definition = MINIMAL.replace("kind = \"shared\"", "kind = \"query_file\"");
        let err = registry
            .register(&definition, handler_partial(), "test")
            .unwrap_err();
        assert!(err.to_string().contains("'query_file' template more than once"));
    }

    #[test]
    fn test_unknown_partial_is_config_error() {
        let mut registry = TemplateRegistry::builtin().unwrap();
        let err = registry
            .register(MINIMAL, BTreeMap::new(), "test")
            .unwrap_err();
        assert!(err.to_string().contains("unknown partial 'handler'"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let variant_dir = dir.path().join("minimal");
        fs::create_dir(&variant_dir).unwrap();
        fs::write(variant_dir.join(VARIANT_FILE), MINIMAL).unwrap();
        fs::write(variant_dir.join("handler.hbs"), "pub fn handler() {}").unwrap();
        fs::write(variant_dir.join("notes.txt"), "ignored").unwrap();

        let registry = TemplateRegistry::with_dir(dir.path()).unwrap();
        let minimal = registry.get("minimal").unwrap();
        assert_eq!(minimal.partials.len(), 1);

        let empty = tempfile::tempdir().unwrap();
        let err = TemplateRegistry::with_dir(empty.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
