//! The command-line shell: input/output selection, validation, and mode
//! dispatch into the two diffing pipelines.

use std::path::{Path, PathBuf};

mod model;
mod partlist;

use anyhow::Context;
use clap::ArgAction;

/// Compare two LDraw models and write difference/common output models.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Diff the total part quantities of two models
    ///
    /// Aggregates each model's instantiated partlist, diffs the two
    /// multisets, and lays the results out as placeable grid models.
    Partlist(partlist::Command),

    /// Diff the structure of two models
    ///
    /// Produces difference and common models that preserve the recursive
    /// submodel instantiation structure of the inputs.
    Model(model::Command),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Partlist(command) => command.run(),
            Self::Model(command) => command.run(),
        }
    }
}

/// The two input model files, shared by both modes.
#[derive(Debug, clap::Args)]
struct InputArgs {
    /// The first input model (A)
    file_a: PathBuf,

    /// The second input model (B)
    file_b: PathBuf,
}

impl InputArgs {
    /// Loads both documents, checking the paths first.
    fn load(&self) -> anyhow::Result<(brickdiff::Document, brickdiff::Document)> {
        for path in [&self.file_a, &self.file_b] {
            if !path.is_file() {
                anyhow::bail!("Input file '{}' does not exist", path.display());
            }
        }
        let doc_a = brickdiff::load(&self.file_a)
            .with_context(|| format!("failed to load '{}'", self.file_a.display()))?;
        let doc_b = brickdiff::load(&self.file_b)
            .with_context(|| format!("failed to load '{}'", self.file_b.display()))?;
        Ok((doc_a, doc_b))
    }
}

/// Default output filename for the "in both A and B" model.
const COMMON_FILENAME: &str = "BD_in_A_and_B.ldr";

/// Default output filename for the "only in A" model.
const ONLY_A_FILENAME: &str = "BD_only_in_A.ldr";

/// Default output filename for the "only in B" model.
const ONLY_B_FILENAME: &str = "BD_only_in_B.ldr";

/// The three optional output targets shared by both modes. An omitted flag
/// disables that output; a flag given without `=PATH` writes the
/// conventional filename next to the first input.
#[derive(Debug, clap::Args)]
struct OutputArgs {
    /// Write the "in both A and B" model (default: BD_in_A_and_B.ldr beside
    /// FILE_A)
    #[arg(long, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    common: Option<Option<PathBuf>>,

    /// Write the "only in A" model (default: BD_only_in_A.ldr beside FILE_A)
    #[arg(long, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    only_a: Option<Option<PathBuf>>,

    /// Write the "only in B" model (default: BD_only_in_B.ldr beside FILE_A)
    #[arg(long, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    only_b: Option<Option<PathBuf>>,

    /// Overwrite existing output files without prompting
    #[arg(long, short)]
    yes: bool,
}

impl OutputArgs {
    /// Fills in the default filenames, placed in `file_a`'s directory, for
    /// flags given without an explicit path.
    fn resolve(&self, file_a: &Path) -> OutputPaths {
        let resolve = |choice: &Option<Option<PathBuf>>, default: &str| {
            choice
                .as_ref()
                .map(|path| path.clone().unwrap_or_else(|| file_a.with_file_name(default)))
        };
        OutputPaths {
            common: resolve(&self.common, COMMON_FILENAME),
            only_a: resolve(&self.only_a, ONLY_A_FILENAME),
            only_b: resolve(&self.only_b, ONLY_B_FILENAME),
            yes: self.yes,
        }
    }
}

/// The resolved output targets, after defaults have been applied.
#[derive(Debug)]
struct OutputPaths {
    common: Option<PathBuf>,
    only_a: Option<PathBuf>,
    only_b: Option<PathBuf>,
    yes: bool,
}

impl OutputPaths {
    /// The enabled output paths.
    fn enabled(&self) -> impl Iterator<Item = &PathBuf> {
        [
            self.common.as_ref(),
            self.only_a.as_ref(),
            self.only_b.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Checks that at least one output is requested, that every target
    /// directory exists, and that existing files may be overwritten
    /// (prompting unless `--yes` was given).
    fn validate(&self) -> anyhow::Result<()> {
        if self.enabled().next().is_none() {
            anyhow::bail!(
                "All output files are disabled; request at least one of --common, --only-a, \
                 --only-b"
            );
        }

        for path in self.enabled() {
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !parent.is_dir() {
                anyhow::bail!("Output directory '{}' does not exist", parent.display());
            }
            if path.exists() && !self.yes {
                let overwrite = dialoguer::Confirm::new()
                    .with_prompt(format!("'{}' already exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()?;
                if !overwrite {
                    anyhow::bail!("Cancelled");
                }
            }
        }
        Ok(())
    }
}

/// The filename a generated document should declare, taken from the output
/// path it will be written to.
fn output_filename(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "partlist.ldr".to_string(), |name| {
            name.to_string_lossy().into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(common: Option<PathBuf>, only_a: Option<PathBuf>, yes: bool) -> OutputPaths {
        OutputPaths {
            common,
            only_a,
            only_b: None,
            yes,
        }
    }

    #[test]
    fn omitted_path_defaults_beside_the_first_input() {
        let args = OutputArgs {
            common: Some(None),
            only_a: Some(Some(PathBuf::from("explicit.ldr"))),
            only_b: None,
            yes: false,
        };
        let paths = args.resolve(Path::new("models/a.ldr"));
        assert_eq!(
            paths.common,
            Some(PathBuf::from("models/BD_in_A_and_B.ldr"))
        );
        assert_eq!(paths.only_a, Some(PathBuf::from("explicit.ldr")));
        assert_eq!(paths.only_b, None);
    }

    #[test]
    fn bare_first_input_defaults_to_the_working_directory() {
        let args = OutputArgs {
            common: None,
            only_a: None,
            only_b: Some(None),
            yes: true,
        };
        let paths = args.resolve(Path::new("a.ldr"));
        assert_eq!(paths.only_b, Some(PathBuf::from("BD_only_in_B.ldr")));
    }

    #[test]
    fn all_outputs_disabled_is_rejected() {
        let error = outputs(None, None, false).validate().unwrap_err();
        assert!(error.to_string().contains("disabled"));
    }

    #[test]
    fn missing_output_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.ldr");
        assert!(outputs(Some(path), None, false).validate().is_err());
    }

    #[test]
    fn existing_file_is_accepted_with_yes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ldr");
        std::fs::write(&path, "0 FILE out.ldr\n0 NOFILE\n").unwrap();
        assert!(outputs(Some(path), None, true).validate().is_ok());
    }

    #[test]
    fn bare_filename_targets_current_directory() {
        let args = outputs(None, Some(PathBuf::from("brickdiff-only-a.ldr")), true);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn output_filename_comes_from_the_path() {
        assert_eq!(output_filename(Path::new("/tmp/out.ldr")), "out.ldr");
    }
}
