//! The LDraw multi-file block parser and serializer.
//!
//! A document is a sequence of submodel blocks, each opened by a
//! `0 FILE <filename>` directive and closed by `0 NOFILE`. Lines between the
//! opening directive and the first type-1 statement form the header; type-1
//! lines are content statements. Parsing is purely lexical: pose transforms,
//! colour semantics and part-library resolution are not validated.

use std::{fmt::Write as _, fs, io, path::Path};

use tracing::debug;

use crate::domain::{
    Document, MalformedStatementError, ReferenceError, Statement, Submodel, SubmodelId,
};

/// Opens a submodel block; the remainder of the line is the filename.
const BEGIN_DIRECTIVE: &str = "0 FILE ";

/// Closes a submodel block.
const END_DIRECTIVE: &str = "0 NOFILE";

/// The declared brick-count bookkeeping line. Derived data, dropped on parse
/// and re-synthesized when a partlist is rendered.
const BRICK_COUNT_LINE: &str = "0 NumOfBricks";

/// Errors raised while parsing a document from text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input contained no submodel blocks at all.
    #[error("Empty document: no submodel blocks found")]
    Empty,

    /// A block did not open with a `0 FILE` directive.
    #[error("Line {line}: expected a '0 FILE' directive opening a submodel block")]
    MissingFileDirective {
        /// One-based line number of the offending line.
        line: usize,
    },

    /// A `0 FILE` directive with no filename after it.
    #[error("Line {line}: '0 FILE' directive is missing a filename")]
    MissingFilename {
        /// One-based line number of the offending line.
        line: usize,
    },

    /// A block was opened but never closed by `0 NOFILE`.
    #[error("Submodel '{id}' is missing its closing '0 NOFILE' directive")]
    UnterminatedBlock {
        /// The id of the unterminated submodel.
        id: SubmodelId,
    },

    /// Two blocks in one file declared the same (lowercased) filename.
    #[error("Duplicate submodel '{id}' in one document")]
    DuplicateSubmodel {
        /// The id declared twice.
        id: SubmodelId,
    },

    /// A type-1 line with too few fields.
    #[error("Line {line}: {source}")]
    MalformedStatement {
        /// One-based line number of the offending line.
        line: usize,
        /// The underlying lexing error.
        source: MalformedStatementError,
    },

    /// An instance reference failed to resolve, or the reference graph is
    /// cyclic.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Parses a whole document from text and validates its reference graph.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input (no blocks, a block without
/// its `0 FILE` directive, an unterminated or duplicate block, a short
/// type-1 line) or for a reference that does not resolve within the
/// document. Parsing fails fast; there is no partial recovery.
pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    let mut document = Document::new();
    let mut current: Option<Submodel> = None;
    let mut in_content = false;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        let number = index + 1;

        if let Some(mut submodel) = current.take() {
            if line == END_DIRECTIVE {
                debug!(
                    id = %submodel.id(),
                    statements = submodel.statements().len(),
                    "parsed submodel block"
                );
                document.insert(submodel);
            } else if line.starts_with(BEGIN_DIRECTIVE) {
                return Err(ParseError::UnterminatedBlock {
                    id: submodel.id().clone(),
                });
            } else {
                if line.split(' ').next() == Some("1") {
                    let statement =
                        Statement::parse(line).map_err(|source| ParseError::MalformedStatement {
                            line: number,
                            source,
                        })?;
                    submodel.push_statement(statement);
                    in_content = true;
                } else if !in_content && !line.starts_with(BRICK_COUNT_LINE) {
                    submodel.push_header_line(line);
                }
                // Non-statement lines after the first statement, and the
                // declared brick-count line, are not retained.
                current = Some(submodel);
            }
        } else {
            if line.trim().is_empty() {
                continue;
            }
            let filename = line
                .strip_prefix(BEGIN_DIRECTIVE)
                .ok_or(ParseError::MissingFileDirective { line: number })?
                .trim();
            if filename.is_empty() {
                return Err(ParseError::MissingFilename { line: number });
            }
            let submodel = Submodel::new(filename);
            if document.contains(submodel.id()) {
                return Err(ParseError::DuplicateSubmodel {
                    id: submodel.id().clone(),
                });
            }
            current = Some(submodel);
            in_content = false;
        }
    }

    if let Some(submodel) = current {
        return Err(ParseError::UnterminatedBlock {
            id: submodel.id().clone(),
        });
    }
    if document.is_empty() {
        return Err(ParseError::Empty);
    }

    document.validate_references()?;
    Ok(document)
}

/// Serializes a document back to text: for each submodel in insertion order,
/// the begin-file directive, the header lines, the statement lines, and the
/// end-file directive.
#[must_use]
pub fn serialize(document: &Document) -> String {
    let mut text = String::new();
    for submodel in document {
        writeln!(text, "{BEGIN_DIRECTIVE}{}", submodel.filename()).expect("this must never fail");
        for line in submodel.header() {
            writeln!(text, "{line}").expect("this must never fail");
        }
        for statement in submodel.statements() {
            writeln!(text, "{statement}").expect("this must never fail");
        }
        writeln!(text, "{END_DIRECTIVE}").expect("this must never fail");
    }
    text
}

/// Errors raised while loading a document from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read '{path}'")]
    Io {
        /// The path that failed to read.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The file's contents could not be parsed.
    #[error("Failed to parse '{path}'")]
    Parse {
        /// The path that failed to parse.
        path: String,
        /// The underlying parse error.
        source: ParseError,
    },
}

/// Reads and parses the document at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read and
/// [`LoadError::Parse`] if its contents are not a valid document.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&text).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Serializes `document` and writes it to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(document: &Document, path: &Path) -> io::Result<()> {
    fs::write(path, serialize(document))
}
