mod check;
mod completions;
mod generate;
mod variants;

use std::path::Path;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::{Context, Result};
use generate::GenerateCommand;
use layergen_catalog::CompilerResult;
use layergen_codegen::{Diagnostic, Generated, Generator};
use layergen_manifest::{LayergenToml, PackageConfig};
use variants::VariantsCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for layergen_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "layergen")]
#[command(version)]
#[command(about = "Generate layered Rust services from a database catalog")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Variants(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code for every package in layergen.toml
    Generate(GenerateCommand),

    /// Map and render every package without writing anything
    Check(CheckCommand),

    /// List the available template variants
    Variants(VariantsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Packages of `config`, optionally narrowed to one by name.
pub(crate) fn load_packages(config: &Path, only: Option<&str>) -> Result<Vec<PackageConfig>> {
    let layergen_toml = LayergenToml::open(config).unwrap_or_exit();
    let packages = layergen_toml.packages();

    match only {
        None => Ok(packages),
        Some(name) => {
            let package = packages.into_iter().find(|p| p.name == name);
            match package {
                Some(package) => Ok(vec![package]),
                None => eyre::bail!(
                    "no package named '{}' in {} (available: {})",
                    name,
                    config.display(),
                    layergen_toml
                        .manifest()
                        .package_names()
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }
    }
}

/// Load the input of `package` and run generation in memory.
///
/// A generation failure is returned as `Ok(Err(..))` so callers can report
/// it and carry on with the remaining packages.
pub(crate) fn generate_package(
    package: &PackageConfig,
) -> Result<layergen_codegen::Result<Generated>> {
    let input = CompilerResult::from_file(&package.input)
        .wrap_err_with(|| format!("failed to load input of package '{}'", package.name))?;
    let generator = match Generator::new(&package.settings) {
        Ok(generator) => generator,
        Err(e) => return Ok(Err(e)),
    };
    Ok(generator.generate(&input, &package.settings))
}

/// One line per failed package, followed by the underlying cause if any.
pub(crate) fn print_failure(package: &str, err: &layergen_codegen::Error) {
    eprintln!("error[{}]: {}: {}", err.kind(), package, err);
    if let Some(source) = std::error::Error::source(err) {
        eprintln!("  caused by: {source}");
    }
}

/// Print warnings to stderr and, when `infos` is set, the rest to stdout.
pub(crate) fn print_diagnostics(package: &str, diagnostics: &[Diagnostic], infos: bool) {
    for diag in diagnostics {
        if diag.severity.is_warning() {
            eprintln!("{package}: {diag}");
        } else if infos {
            println!("{package}: {diag}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = r#"
version = "1"

[[packages]]
name = "blog"
input = "blog.json"
out = "internal/blog"

[[packages]]
name = "shop"
input = "shop.json"
out = "internal/shop"
variant = "actix_sqlx"
"#;

    fn config() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("layergen.toml");
        std::fs::write(&path, CONFIG).unwrap();
        (temp, path)
    }

    #[test]
    fn test_load_every_package() {
        let (_temp, path) = config();
        let packages = load_packages(&path, None).unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["blog", "shop"]);
    }

    #[test]
    fn test_load_one_package() {
        let (temp, path) = config();
        let packages = load_packages(&path, Some("shop")).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].settings.variant, "actix_sqlx");
        assert_eq!(packages[0].input, temp.path().join("shop.json"));
    }

    #[test]
    fn test_load_unknown_package() {
        let (_temp, path) = config();
        let err = load_packages(&path, Some("billing")).unwrap_err();
        assert!(err.to_string().contains("no package named 'billing'"));
        assert!(err.to_string().contains("(available: blog, shop)"));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let (_temp, path) = config();
        let packages = load_packages(&path, Some("blog")).unwrap();
        let err = generate_package(&packages[0]).unwrap_err();
        assert!(err.to_string().contains("failed to load input of package 'blog'"));
    }

    #[test]
    fn test_generate_package() {
        let (temp, path) = config();
        std::fs::write(
            temp.path().join("blog.json"),
            r#"{"catalog": {"default_schema": "public", "schemas": [{"name": "public", "tables": [{
                "name": "authors",
                "columns": [
                    {"name": "id", "data_type": "bigserial", "not_null": true, "primary_key": true},
                    {"name": "name", "data_type": "text", "not_null": true}
                ]
            }]}]}}"#,
        )
        .unwrap();

        let packages = load_packages(&path, Some("blog")).unwrap();
        let generated = generate_package(&packages[0]).unwrap().unwrap();
        assert!(generated.manifest.get("model/author.rs").is_some());
        assert_eq!(generated.warnings().count(), 0);
    }
}
