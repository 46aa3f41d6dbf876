use std::path::Path;

use anyhow::Context;
use brickdiff::{Partlist, Spacing, render_partlist};
use tracing::{info, instrument};

use crate::cli::{InputArgs, OutputArgs, output_filename};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(flatten)]
    outputs: OutputArgs,

    /// Distance between part-type columns, in LDraw units (20 ldu = 1 stud)
    #[arg(long, default_value_t = 165, value_parser = clap::value_parser!(u32).range(1..=1000))]
    column_distance: u32,

    /// Distance between part-colour rows, in LDraw units
    #[arg(long, default_value_t = 165, value_parser = clap::value_parser!(u32).range(1..=1000))]
    row_distance: u32,

    /// Height between stacked parts of the same type and colour (24 ldu = 1
    /// brick)
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u32).range(1..=1000))]
    height_distance: u32,
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let outputs = self.outputs.resolve(&self.inputs.file_a);
        outputs.validate()?;
        let (doc_a, doc_b) = self.inputs.load()?;

        let total_a = doc_a.total_partlist()?;
        let total_b = doc_b.total_partlist()?;
        info!(%total_a, %total_b, "aggregated partlists");

        let spacing = Spacing {
            column: self.column_distance,
            row: self.row_distance,
            height: self.height_distance,
        };

        let a_vs_b = brickdiff::diff_partlists(&total_a, &total_b);
        let mut written = Vec::new();

        if let Some(path) = &outputs.common {
            write_partlist(&a_vs_b.common, path, &spacing)?;
            written.push(path);
        }
        if let Some(path) = &outputs.only_a {
            write_partlist(&a_vs_b.only_a, path, &spacing)?;
            written.push(path);
        }
        if let Some(path) = &outputs.only_b {
            let b_vs_a = brickdiff::diff_partlists(&total_b, &total_a);
            write_partlist(&b_vs_a.only_a, path, &spacing)?;
            written.push(path);
        }

        println!("Saved the following files:");
        for path in written {
            println!("  {}", path.display());
        }
        Ok(())
    }
}

/// Renders a partlist onto the grid and writes it to `path`.
fn write_partlist(partlist: &Partlist, path: &Path, spacing: &Spacing) -> anyhow::Result<()> {
    let document = render_partlist(partlist, &output_filename(path), spacing);
    brickdiff::save(&document, path)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    info!(path = %path.display(), %partlist, "wrote partlist model");
    Ok(())
}
