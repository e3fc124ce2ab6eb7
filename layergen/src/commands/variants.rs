use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use layergen_codegen::TemplateRegistry;

#[derive(Args)]
pub struct VariantsCommand {
    /// Also load variants from this directory
    #[arg(long)]
    pub template_dir: Option<PathBuf>,
}

impl VariantsCommand {
    pub fn run(&self) -> Result<()> {
        let registry = match &self.template_dir {
            Some(dir) => TemplateRegistry::with_dir(dir),
            None => TemplateRegistry::builtin(),
        }
        .wrap_err("failed to load template variants")?;

        for variant in registry.variants() {
            if variant.description.is_empty() {
                println!("{}", variant.name);
            } else {
                println!("{} - {}", variant.name, variant.description);
            }
            for spec in &variant.templates {
                println!(
                    "  {:<26} {}/{}",
                    spec.kind.as_str(),
                    spec.dir,
                    spec.file
                );
            }
        }

        Ok(())
    }
}
