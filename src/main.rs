//! Binary entry point for the `brickdiff` CLI.

mod cli;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
