use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use layergen_codegen::Generated;
use layergen_manifest::PackageConfig;

use super::{generate_package, load_packages, print_diagnostics, print_failure};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to layergen.toml (defaults to ./layergen.toml)
    #[arg(short, long, default_value = "layergen.toml")]
    pub config: PathBuf,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Only generate the named package
    #[arg(short, long)]
    pub package: Option<String>,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let packages = load_packages(&self.config, self.package.as_deref())?;

        let mut failed = 0;
        for package in &packages {
            match generate_package(package)? {
                Ok(generated) => {
                    print_diagnostics(&package.name, &generated.diagnostics, false);
                    if self.dry_run {
                        Self::run_preview(package, &generated);
                    } else {
                        Self::write(package, &generated)?;
                    }
                }
                Err(e) => {
                    failed += 1;
                    print_failure(&package.name, &e);
                }
            }
        }

        if failed > 0 {
            eprintln!(
                "{} of {} package{} failed",
                failed,
                packages.len(),
                if packages.len() == 1 { "" } else { "s" }
            );
            std::process::exit(1);
        }

        Ok(())
    }

    fn write(package: &PackageConfig, generated: &Generated) -> Result<()> {
        let out = &package.settings.out;
        let stats = generated
            .write(out)
            .wrap_err_with(|| format!("failed to write package '{}'", package.name))?;

        println!(
            "{}: {} files in {} ({} written, {} unchanged)",
            package.name,
            generated.manifest.len(),
            out.display(),
            stats.written,
            stats.unchanged
        );

        Ok(())
    }

    fn run_preview(package: &PackageConfig, generated: &Generated) {
        for file in generated.manifest.iter() {
            println!("── {} ──", file.path());
            println!("{}", file.body);
        }

        println!("── Summary ──");
        println!(
            "{}: {} files would be generated in {}",
            package.name,
            generated.manifest.len(),
            package.settings.out.display()
        );
    }
}
