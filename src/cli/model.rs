use std::path::Path;

use anyhow::Context;
use brickdiff::{Document, structural_diff};
use tracing::{info, instrument};

use crate::cli::{InputArgs, OutputArgs};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(flatten)]
    outputs: OutputArgs,
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let outputs = self.outputs.resolve(&self.inputs.file_a);
        outputs.validate()?;
        let (doc_a, doc_b) = self.inputs.load()?;

        let mut written = Vec::new();
        // The common model is semantically the same from either direction,
        // so whichever diff ran last can supply it.
        let mut common = None;

        if let Some(path) = &outputs.only_b {
            let diff = structural_diff(&doc_b, &doc_a);
            write_model(&diff.difference, path)?;
            written.push(path);
            common = Some(diff.common);
        }
        if let Some(path) = &outputs.only_a {
            let diff = structural_diff(&doc_a, &doc_b);
            write_model(&diff.difference, path)?;
            written.push(path);
            common = Some(diff.common);
        }
        if let Some(path) = &outputs.common {
            let common =
                common.unwrap_or_else(|| structural_diff(&doc_a, &doc_b).common);
            write_model(&common, path)?;
            written.push(path);
        }

        println!("Saved the following files:");
        for path in written {
            println!("  {}", path.display());
        }
        Ok(())
    }
}

/// Writes a diff output document to `path`.
fn write_model(document: &Document, path: &Path) -> anyhow::Result<()> {
    brickdiff::save(document, path)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    info!(path = %path.display(), submodels = document.len(), "wrote model");
    Ok(())
}
