// `doctoc init`: write a default doctoc.toml into a project root.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::config::{config_path, CliConfig};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project root (defaults to current directory).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Overwrite an existing doctoc.toml.
    #[arg(long)]
    force: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitResult {
    pub config_path: String,
    #[serde(default)]
    pub overwritten: bool,
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let root = resolve_root(args.path.clone())?;

    match init(&root, args.force) {
        Ok(result) => {
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(error) => {
            output::print_error(format, "INIT_ERROR", &format!("{error:#}"));
            Err(error)
        }
    }
}

fn init(root: &Path, force: bool) -> anyhow::Result<InitResult> {
    let path = config_path(root);
    let overwritten = path.exists();
    if overwritten && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }

    CliConfig::default()
        .save_to(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(InitResult { config_path: path.display().to_string(), overwritten })
}

fn resolve_root(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let provided = path.unwrap_or_else(|| PathBuf::from("."));
    if provided.is_absolute() {
        return Ok(provided);
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(provided))
        .context("failed to resolve current working directory")
}

fn format_human(result: &InitResult) -> String {
    if result.overwritten {
        format!("Replaced {} with the default configuration", result.config_path)
    } else {
        format!("Wrote default configuration to {}", result.config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_loadable_default_config() {
        let tmp = TempDir::new().unwrap();
        let result = init(tmp.path(), false).unwrap();

        assert!(!result.overwritten);
        assert_eq!(result.config_path, config_path(tmp.path()).display().to_string());
        assert_eq!(CliConfig::load(tmp.path()).unwrap(), CliConfig::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(config_path(tmp.path()), "ignore_flag = true\n").unwrap();

        let error = init(tmp.path(), false).unwrap_err();
        assert!(error.to_string().contains("already exists"));
        assert!(CliConfig::load(tmp.path()).unwrap().settings.ignore_flag);
    }

    #[test]
    fn force_overwrites_existing_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(config_path(tmp.path()), "ignore_flag = true\n").unwrap();

        let result = init(tmp.path(), true).unwrap();
        assert!(result.overwritten);
        assert!(!CliConfig::load(tmp.path()).unwrap().settings.ignore_flag);
    }

    #[test]
    fn resolve_root_keeps_absolute_paths() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(tmp.path().to_path_buf())).unwrap(), tmp.path());
    }

    #[test]
    fn human_format_mentions_path() {
        let result = InitResult { config_path: "/site/doctoc.toml".into(), overwritten: false };
        assert_eq!(format_human(&result), "Wrote default configuration to /site/doctoc.toml");
    }
}
