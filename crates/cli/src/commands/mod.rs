// CLI subcommand dispatch.

use clap::Subcommand;

pub mod build;
pub mod init;
pub mod tree;

#[derive(Subcommand)]
pub enum Command {
    /// Add heading ids and attach TOC trees to every matching file
    Build(build::BuildArgs),
    /// Write a default doctoc.toml
    Init(init::InitArgs),
    /// Show the TOC tree of one file
    Tree(tree::TreeArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Build(args) => build::run(args),
        Command::Init(args) => init::run(args),
        Command::Tree(args) => tree::run(args),
    }
}
