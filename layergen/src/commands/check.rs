use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::{generate_package, load_packages, print_diagnostics, print_failure};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to layergen.toml (defaults to ./layergen.toml)
    #[arg(short, long, default_value = "layergen.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let packages = load_packages(&self.config, None)?;

        let mut has_errors = false;
        for package in &packages {
            match generate_package(package)? {
                Ok(generated) => {
                    print_diagnostics(&package.name, &generated.diagnostics, true);
                    println!(
                        "✓ {} ({}, {} files)",
                        package.name,
                        package.settings.variant,
                        generated.manifest.len()
                    );
                }
                Err(e) => {
                    has_errors = true;
                    print_failure(&package.name, &e);
                }
            }
        }

        if has_errors {
            std::process::exit(1);
        }

        println!("\n{} is valid", self.config.display());

        Ok(())
    }
}
