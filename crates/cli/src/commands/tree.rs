// `doctoc tree`: print the TOC tree of one HTML file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use doctoc_common::options::{OptionsPatch, TocOptions};
use doctoc_common::toc::generate;
use doctoc_common::toc::id::IdGenerator;
use doctoc_common::toc::tree::{NodeId, TocTree};
use serde::{Deserialize, Serialize};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// HTML file to read.
    pub file: PathBuf,

    /// Heading levels to include, e.g. "h2-4".
    #[arg(long, value_name = "RANGE")]
    range: Option<String>,

    /// Prefix for generated ids.
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Step generated ids around ids declared anywhere in the file.
    #[arg(long)]
    unique: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResult {
    pub file: String,
    /// Whether ids would be added to the file.
    pub new_ids: bool,
    #[serde(default)]
    pub sections: Vec<TreeSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSection {
    pub id: String,
    pub title: String,
    pub tag: String,
    pub level: u8,
    #[serde(default)]
    pub children: Vec<TreeSection>,
}

pub fn run(args: TreeArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match read_tree(&args) {
        Ok(result) => {
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

fn read_tree(args: &TreeArgs) -> anyhow::Result<TreeResult> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut options = TocOptions::default();
    let patch = OptionsPatch {
        h_range: args.range.clone(),
        id_prefix: args.prefix.clone(),
        make_ids_unique: args.unique.then_some(true),
        ..OptionsPatch::default()
    };
    options.combine(&patch.into()).context("invalid tree options")?;

    tree_result(&args.file.display().to_string(), &content, &options)
}

fn tree_result(file: &str, content: &str, options: &TocOptions) -> anyhow::Result<TreeResult> {
    let mut ids = IdGenerator::from_options(options);
    let toc = generate(content, options, &mut ids)
        .with_context(|| format!("failed to build the tree of {file}"))?;

    Ok(TreeResult {
        file: file.to_string(),
        new_ids: toc.new_ids(),
        sections: sections(&toc.tree, NodeId::ROOT),
    })
}

fn sections(tree: &TocTree, parent: NodeId) -> Vec<TreeSection> {
    tree.node(parent)
        .children
        .iter()
        .filter_map(|&child| {
            let node = tree.node(child);
            let heading = node.heading.as_ref()?;
            Some(TreeSection {
                id: heading.id.clone(),
                title: heading.title.clone(),
                tag: heading.tag.clone(),
                level: node.level,
                children: sections(tree, child),
            })
        })
        .collect()
}

fn format_human(result: &TreeResult) -> String {
    let mut lines = Vec::new();
    lines.push(result.file.clone());
    for section in &result.sections {
        render_tree_node(&mut lines, section, 0);
    }
    lines.join("\n")
}

fn render_tree_node(lines: &mut Vec<String>, section: &TreeSection, depth: usize) {
    let indent = "  ".repeat(depth);
    let prefix = if depth == 0 { "" } else { "├─ " };
    lines.push(format!("{indent}{prefix}{} [{}]", section.title, section.id));
    for child in &section.children {
        render_tree_node(lines, child, depth + 1);
    }
}
