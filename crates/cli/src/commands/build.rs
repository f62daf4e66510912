// `doctoc build`: add heading ids and attach TOC trees across a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use doctoc_common::pipeline::pattern::FilePattern;
use doctoc_common::pipeline::{Doctoc, FileOutcome, PipelineError, RunSummary};
use doctoc_common::types::FileRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::{CliConfig, CONFIG_FILE_NAME};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Directory or single file to process (defaults to current directory).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Config file to use instead of `<root>/doctoc.toml`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process every matching file regardless of its flag.
    #[arg(long)]
    all: bool,

    /// Rewrite files in place when ids were added.
    #[arg(long, conflicts_with = "out")]
    write: bool,

    /// Mirror processed files into DIR, each with a `<file>.toc.json` tree.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub root: String,
    pub trees: usize,
    pub rewritten: usize,
    pub skipped: usize,
    /// Where results were saved; `None` for a dry run.
    #[serde(default)]
    pub saved_to: Option<String>,
    #[serde(default)]
    pub files: Vec<BuildFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildFile {
    pub path: String,
    pub headings: usize,
    pub rewritten: bool,
    pub tree: Value,
}

pub fn run(args: BuildArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match build(&args) {
        Ok(result) => {
            if result.files.is_empty() && result.skipped == 0 {
                output::print_warning(
                    format,
                    "NO_FILES",
                    &format!("no files matched under {}", result.root),
                );
            }
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

fn build(args: &BuildArgs) -> anyhow::Result<BuildResult> {
    let target = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let metadata = fs::metadata(&target)
        .with_context(|| format!("failed to read {}", target.display()))?;
    let (root, single) = if metadata.is_dir() {
        (target.clone(), None)
    } else {
        let parent = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        (parent, Some(target.clone()))
    };

    let mut config = match &args.config {
        Some(path) => CliConfig::load_from(path),
        None => CliConfig::load(&root),
    }
    .context("failed to load doctoc config")?;
    if args.all {
        config.settings.ignore_flag = true;
    }

    let files = match &single {
        Some(file) => single_file(file, &config)?,
        None => collect_files(&root, &config, args.out.as_deref())?,
    };

    let mut doctoc = Doctoc::new(config.settings.clone())?;
    let tree_key = doctoc.settings().tree_key.clone();
    let mut summary = RunSummary::default();
    let mut processed = Vec::new();

    for (path, mut file) in files {
        let outcome = doctoc.process_file(&path, &mut file)?;
        summary.record(outcome);
        if let FileOutcome::Processed { rewritten } = outcome {
            let tree = file.metadata.get(&tree_key).cloned().unwrap_or(Value::Null);
            let entry = BuildFile { headings: count_headings(&tree), path, rewritten, tree };
            processed.push((entry, file.contents));
        }
    }

    info!(
        root = %root.display(),
        trees = summary.trees,
        rewritten = summary.rewritten,
        skipped = summary.skipped,
        "build complete"
    );

    let saved_to = if let Some(out) = &args.out {
        write_out_dir(out, &processed)?;
        Some(out.display().to_string())
    } else if args.write {
        write_in_place(&root, &processed)?;
        Some(root.display().to_string())
    } else {
        None
    };

    Ok(BuildResult {
        root: root.display().to_string(),
        trees: summary.trees,
        rewritten: summary.rewritten,
        skipped: summary.skipped,
        saved_to,
        files: processed.into_iter().map(|(entry, _)| entry).collect(),
    })
}

/// Matching files under `root`, keyed by `/`-separated relative path.
///
/// Hidden entries, the config file and `exclude` (the output directory) are
/// never collected.
fn collect_files(
    root: &Path,
    config: &CliConfig,
    exclude: Option<&Path>,
) -> anyhow::Result<BTreeMap<String, FileRecord>> {
    let pattern = FilePattern::new(&config.settings.pattern).map_err(PipelineError::from)?;
    let excluded = exclude.and_then(|dir| fs::canonicalize(dir).ok());

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !skip_entry(entry, excluded.as_deref()));

    let mut files = BTreeMap::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).with_context(|| {
            format!("{} is outside {}", entry.path().display(), root.display())
        })?;
        let key = relative_key(relative);
        if key == CONFIG_FILE_NAME || !pattern.matches(&key) {
            debug!(file = %key, "not matched");
            continue;
        }

        let contents = fs::read(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;
        let mut record = FileRecord::new(contents);
        record.metadata = config.metadata_for(&key);
        files.insert(key, record);
    }
    Ok(files)
}

/// A file named on the command line is processed whatever the pattern says.
fn single_file(path: &Path, config: &CliConfig) -> anyhow::Result<BTreeMap<String, FileRecord>> {
    let key = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let contents =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut record = FileRecord::new(contents);
    record.metadata = config.metadata_for(&key);
    Ok(BTreeMap::from([(key, record)]))
}

fn skip_entry(entry: &DirEntry, excluded: Option<&Path>) -> bool {
    if entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    match excluded {
        Some(dir) if entry.file_type().is_dir() => {
            fs::canonicalize(entry.path()).is_ok_and(|path| path == dir)
        }
        _ => false,
    }
}

fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_out_dir(out: &Path, processed: &[(BuildFile, Vec<u8>)]) -> anyhow::Result<()> {
    for (entry, contents) in processed {
        let target = out.join(&entry.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, contents)
            .with_context(|| format!("failed to write {}", target.display()))?;

        let tree_path = out.join(format!("{}.toc.json", entry.path));
        let json = serde_json::to_vec_pretty(&entry.tree)
            .with_context(|| format!("failed to serialize the tree of {}", entry.path))?;
        fs::write(&tree_path, json)
            .with_context(|| format!("failed to write {}", tree_path.display()))?;
    }
    Ok(())
}

fn write_in_place(root: &Path, processed: &[(BuildFile, Vec<u8>)]) -> anyhow::Result<()> {
    for (entry, contents) in processed.iter().filter(|(entry, _)| entry.rewritten) {
        let target = root.join(&entry.path);
        fs::write(&target, contents)
            .with_context(|| format!("failed to write {}", target.display()))?;
        debug!(file = %entry.path, "rewritten in place");
    }
    Ok(())
}

// The root's `children_all` lists every heading in the tree.
fn count_headings(tree: &Value) -> usize {
    tree.get("children_all").and_then(Value::as_array).map_or(0, Vec::len)
}

fn format_human(result: &BuildResult) -> String {
    let mut lines = Vec::new();
    for file in &result.files {
        let plural = if file.headings == 1 { "" } else { "s" };
        let note = if file.rewritten { " (ids added)" } else { "" };
        lines.push(format!("{}: {} heading{plural}{note}", file.path, file.headings));
    }
    lines.push(format!(
        "{} tree(s), {} rewritten, {} skipped",
        result.trees, result.rewritten, result.skipped
    ));
    match &result.saved_to {
        Some(dest) => lines.push(format!("Saved to {dest}")),
        None if result.rewritten > 0 => {
            lines.push("Dry run: pass --write or --out DIR to save changes.".to_string())
        }
        None => {}
    }
    lines.join("\n")
}
