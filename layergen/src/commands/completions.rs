use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use eyre::{Context, Result};

use super::Cli;

#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn run(&self) -> Result<()> {
        let script = script(self.shell)?;
        match &self.out {
            Some(path) => std::fs::write(path, script)
                .wrap_err_with(|| format!("failed to write completions to {}", path.display())),
            None => {
                print!("{script}");
                Ok(())
            }
        }
    }
}

/// Completion script for every `layergen` subcommand and flag.
fn script(shell: Shell) -> Result<String> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, name, &mut buf);
    String::from_utf8(buf).wrap_err("completion script is not UTF-8")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_script_covers_subcommands() {
        let script = script(Shell::Bash).unwrap();
        assert!(script.contains("_layergen()"));
        for sub in ["generate", "check", "variants", "completions"] {
            assert!(script.contains(sub), "missing {sub}");
        }
        assert!(script.contains("--dry-run"));
    }

    #[test]
    fn test_write_to_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("layergen.fish");
        let cmd = CompletionsCommand {
            shell: Shell::Fish,
            out: Some(out.clone()),
        };
        cmd.run().unwrap();

        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.contains("complete -c layergen"));
    }
}
