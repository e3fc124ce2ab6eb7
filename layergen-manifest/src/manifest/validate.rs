//! Validation context and utilities for manifest parsing.

use std::{collections::HashSet, sync::Arc};

use miette::SourceSpan;

use super::{Manifest, PackageConfig, SUPPORTED_VERSION};
use crate::{Result, error::ManifestSource};

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current path
/// through the manifest hierarchy, so nested checks can name the package
/// they belong to.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "layergen.toml");
/// ctx.validate_name("blog", "package")?;
///
/// let nested = ctx.push("blog").push("rename");
/// nested.validate_name("Article", "rename target")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Shared across nested contexts
    source: Arc<ManifestSource>,
    /// Path segments for nested validation (e.g., ["blog", "rename"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(ManifestSource::new(src, filename)),
            path: Vec::new(),
        }
    }

    pub fn src(&self) -> &str {
        self.source.text()
    }

    pub fn filename(&self) -> &str {
        self.source.name()
    }

    pub fn source(&self) -> &ManifestSource {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages.
    ///
    /// For example: "rename target in 'blog'" or just "package" if no path.
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Find the span of a quoted value in the source.
    pub fn find_span(&self, value: &str) -> Option<SourceSpan> {
        find_value_span(self.source.text(), value)
    }

    /// Reject keywords and anything that cannot become an identifier.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        match validate_identifier(name) {
            Some(reason) => Err(self.source.invalid_name(
                name,
                self.context_for(kind),
                reason,
                self.find_span(name),
            )),
            None => Ok(()),
        }
    }

    /// Validate a `::`-separated module path such as `crate::model`.
    pub fn validate_module_path(&self, path: &str) -> Result<()> {
        for (i, segment) in path.split("::").enumerate() {
            let leading_keyword = i == 0 && matches!(segment, "crate" | "self" | "super");
            if leading_keyword {
                continue;
            }
            if segment.contains('-')
                || is_rust_keyword(segment)
                || validate_identifier(segment).is_some()
            {
                return Err(self.source.invalid_setting(
                    format!("invalid {} '{}'", self.context_for("module path"), path),
                    self.find_span(path),
                ));
            }
        }
        Ok(())
    }
}

/// Check version, package presence and every package's settings.
pub(crate) fn validate_manifest<'a>(manifest: &'a Manifest, ctx: &ParseContext<'a>) -> Result<()> {
    let source = ctx.source();

    match manifest.version.as_deref() {
        None | Some("") => return Err(source.version(None, None)),
        Some(SUPPORTED_VERSION) => {}
        Some(other) => return Err(source.version(Some(other), ctx.find_span(other))),
    }

    if manifest.packages.is_empty() {
        return Err(source.no_packages());
    }

    let mut seen = HashSet::new();
    for package in &manifest.packages {
        ctx.validate_name(&package.name, "package")?;
        if !seen.insert(package.name.as_str()) {
            return Err(source.duplicate_package(&package.name, ctx.find_span(&package.name)));
        }
        validate_package(package, &ctx.push(&package.name))?;
    }

    Ok(())
}

fn validate_package(package: &PackageConfig, ctx: &ParseContext<'_>) -> Result<()> {
    let source = ctx.source();
    let settings = &package.settings;

    if package.input.as_os_str().is_empty() {
        return Err(source.invalid_setting(
            format!("{} has an empty input path", ctx.context_for("package")),
            None,
        ));
    }

    if settings.out.as_os_str().is_empty() {
        return Err(source.invalid_setting(
            format!("{} has an empty output path", ctx.context_for("package")),
            None,
        ));
    }

    ctx.validate_name(&settings.variant, "variant")?;
    ctx.validate_module_path(&settings.model_module)?;

    for acronym in &settings.acronyms {
        if acronym.is_empty() || !acronym.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(source.invalid_setting(
                format!(
                    "{} '{}' must be a non-empty alphanumeric word",
                    ctx.context_for("acronym"),
                    acronym
                ),
                ctx.find_span(acronym),
            ));
        }
    }

    let rename_ctx = ctx.push("rename");
    for target in settings.rename.values() {
        rename_ctx.validate_name(target, "rename target")?;
    }

    for entry in &settings.overrides {
        if entry.db_type.trim().is_empty() || entry.rust_type.trim().is_empty() {
            return Err(source.invalid_setting(
                format!("{} needs both db_type and rust_type", ctx.context_for("type override")),
                None,
            ));
        }
    }

    Ok(())
}

/// Rust reserved keywords that cannot be used as identifiers
/// Source: https://doc.rust-lang.org/reference/keywords.html
pub(crate) const RUST_KEYWORDS: &[&str] = &[
    // Strict keywords (2021 edition)
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
    // Reserved keywords (may be used in future)
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Check if a name is a Rust reserved keyword
pub(crate) fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Find the span of a quoted string value in the TOML source.
///
/// Only quoted occurrences match, so a bare key or a longer string that
/// merely contains `value` is never pointed at.
pub(crate) fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let pattern = format!("{quote}{value}{quote}");
        if let Some(pos) = src.find(&pattern) {
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }
    None
}

/// Validate that a name is a valid identifier (dashes allowed)
/// Returns None if valid, Some(reason) if invalid
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name cannot be empty");
    }

    if is_rust_keyword(name) {
        return Some("name is a Rust reserved keyword");
    }

    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    let mut prev_was_dash = false;

    for c in chars {
        if c == '-' {
            if prev_was_dash {
                return Some("name cannot contain consecutive dashes");
            }
            prev_was_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            prev_was_dash = false;
        } else {
            return Some("name must contain only letters, numbers, underscores, and dashes");
        }
    }

    if prev_was_dash {
        return Some("name cannot end with a dash");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("blog").is_none());
        assert!(validate_identifier("axum_sqlx").is_none());
        assert!(validate_identifier("Article").is_none());
        assert!(validate_identifier("_private").is_none());
        assert!(validate_identifier("v2").is_none());
        assert!(validate_identifier("blog-api").is_none());
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(validate_identifier("fn").is_some());
        assert!(validate_identifier("struct").is_some());
        assert!(validate_identifier("type").is_some());
        assert!(validate_identifier("Self").is_some());
        assert!(validate_identifier("mod").is_some());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("-name").is_some());
        assert!(validate_identifier("name-").is_some());
        assert!(validate_identifier("a--b").is_some());
        assert!(validate_identifier("hello world").is_some());
        assert!(validate_identifier("a.b").is_some());
    }

    #[test]
    fn test_find_value_span() {
        let src = "version = \"1\"\n[[packages]]\nname = \"blog\"";
        let span = find_value_span(src, "blog").unwrap();
        assert_eq!(span.offset(), 35);
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_find_value_span_ignores_partial_matches() {
        let src = "name = \"blogging\"\nblog = 1";
        assert!(find_value_span(src, "blog").is_none());
    }

    #[test]
    fn test_parse_context_push() {
        let ctx = ParseContext::new("", "layergen.toml");
        let nested = ctx.push("blog").push("rename");
        assert_eq!(nested.path_string(), "blog.rename");
        assert_eq!(ctx.context_for("package"), "package");
        assert_eq!(
            nested.context_for("rename target"),
            "rename target in 'blog.rename'"
        );
    }

    #[test]
    fn test_parse_context_validate_name_keyword() {
        let ctx = ParseContext::new("[packages.rename]\nposts = \"type\"", "layergen.toml");
        let err = ctx.validate_name("type", "rename target").unwrap_err();
        assert!(err.to_string().contains("reserved keyword"));
    }

    #[test]
    fn test_validate_module_path() {
        let ctx = ParseContext::new("", "layergen.toml");
        assert!(ctx.validate_module_path("crate::model").is_ok());
        assert!(ctx.validate_module_path("super::types::model").is_ok());
        assert!(ctx.validate_module_path("my_app::model").is_ok());
        assert!(ctx.validate_module_path("crate::type").is_err());
        assert!(ctx.validate_module_path("crate::").is_err());
        assert!(ctx.validate_module_path("crate::my model").is_err());
    }
}
