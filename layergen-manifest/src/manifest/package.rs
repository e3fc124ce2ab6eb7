use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

fn default_variant() -> String {
    "axum_sqlx".to_string()
}

fn default_model_module() -> String {
    "crate::model".to_string()
}

fn enabled() -> bool {
    true
}

/// One `[[packages]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// Package name, used in diagnostics and for `--package` selection
    pub name: String,

    /// Compiler result JSON (catalog + queries)
    pub input: PathBuf,

    #[serde(flatten)]
    pub settings: Settings,
}

impl PackageConfig {
    /// Resolve relative paths against `base` (the manifest's directory).
    pub fn resolved_against(&self, base: &Path) -> Self {
        let mut resolved = self.clone();
        resolved.input = base.join(&self.input);
        resolved.settings.out = base.join(&self.settings.out);
        resolved.settings.template_dir = self.settings.template_dir.as_ref().map(|d| base.join(d));
        resolved
    }
}

/// Settings that shape one generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Output root directory
    pub out: PathBuf,

    /// Template variant name
    #[serde(default = "default_variant")]
    pub variant: String,

    /// Directory holding additional template variants
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Module path the generated model types live in
    #[serde(default = "default_model_module")]
    pub model_module: String,

    /// Extra acronym segments (`url` becomes `URL`)
    #[serde(default)]
    pub acronyms: Vec<String>,

    #[serde(default)]
    pub emit: EmitOptions,

    /// Raw identifier to generated name overrides
    #[serde(default)]
    pub rename: BTreeMap<String, String>,

    /// Database type to Rust type overrides
    #[serde(default)]
    pub overrides: Vec<TypeOverride>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            out: PathBuf::from("."),
            variant: default_variant(),
            template_dir: None,
            model_module: default_model_module(),
            acronyms: Vec::new(),
            emit: EmitOptions::default(),
            rename: BTreeMap::new(),
            overrides: Vec::new(),
        }
    }
}

/// Emission toggles (`[packages.emit]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmitOptions {
    /// serde rename tags on model fields
    #[serde(default = "enabled")]
    pub json_tags: bool,
    /// Request payloads are read from url-encoded forms, keyed by column name
    #[serde(default)]
    pub form_tags: bool,
    /// `sqlx::FromRow` derives and column rename tags
    #[serde(default = "enabled")]
    pub db_tags: bool,
    /// Persistent prepared statements in query files
    #[serde(default)]
    pub prepared_queries: bool,
    /// A `Querier` trait over every query
    #[serde(default)]
    pub interface: bool,
    /// List responses serialize an empty array instead of omitting the field
    #[serde(default)]
    pub empty_slices: bool,
    /// Keep table names as written instead of singularizing them
    #[serde(default)]
    pub exact_table_names: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            json_tags: true,
            form_tags: false,
            db_tags: true,
            prepared_queries: false,
            interface: false,
            empty_slices: false,
            exact_table_names: false,
        }
    }
}

/// A `[[packages.overrides]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeOverride {
    /// Database type name as the catalog reports it (e.g. `ltree`)
    pub db_type: String,
    /// Rust type path to emit (e.g. `String`, `crate::types::Money`)
    pub rust_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_defaults() {
        let emit = EmitOptions::default();
        assert!(emit.json_tags);
        assert!(!emit.form_tags);
        assert!(emit.db_tags);
        assert!(!emit.prepared_queries);
        assert!(!emit.interface);
        assert!(!emit.empty_slices);
        assert!(!emit.exact_table_names);
    }

    #[test]
    fn test_resolved_against_joins_relative_paths() {
        let package = PackageConfig {
            name: "blog".into(),
            input: "build/blog.json".into(),
            settings: Settings {
                out: "internal".into(),
                template_dir: Some("templates".into()),
                ..Default::default()
            },
        };

        let resolved = package.resolved_against(Path::new("/work"));

        assert_eq!(resolved.input, PathBuf::from("/work/build/blog.json"));
        assert_eq!(resolved.settings.out, PathBuf::from("/work/internal"));
        assert_eq!(
            resolved.settings.template_dir,
            Some(PathBuf::from("/work/templates"))
        );
    }

    #[test]
    fn test_resolved_against_keeps_absolute_paths() {
        let package = PackageConfig {
            name: "blog".into(),
            input: "/data/blog.json".into(),
            settings: Settings {
                out: "/srv/out".into(),
                ..Default::default()
            },
        };

        let resolved = package.resolved_against(Path::new("/work"));

        assert_eq!(resolved.input, PathBuf::from("/data/blog.json"));
        assert_eq!(resolved.settings.out, PathBuf::from("/srv/out"));
        assert_eq!(resolved.settings.template_dir, None);
    }
}
