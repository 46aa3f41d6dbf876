//! Content statements: part placements and submodel instantiations.

use std::fmt;

use crate::domain::{PartKey, SubmodelId};

/// The number of positional fields in a type-1 line before the trailing name:
/// the line type, the colour id, and the 3×4 pose transform.
const POSITIONAL_FIELDS: usize = 14;

/// Suffix that marks the trailing name of a type-1 line as a primitive part.
const PART_SUFFIX: &str = ".dat";

/// One content line of a submodel body.
///
/// A type-1 line either places a primitive part or instantiates another
/// submodel by name. The pose transform is carried opaquely inside `raw`:
/// statement equality, as used by the structural differ, is exact text
/// equality, not geometric equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Placement of a primitive part.
    Part {
        /// Colour and part filename of the placed part.
        key: PartKey,
        /// The exact line text, without the trailing newline.
        raw: String,
    },
    /// Instantiation of another submodel.
    Instance {
        /// The id of the referenced submodel (lowercased filename).
        reference: SubmodelId,
        /// The exact line text, without the trailing newline.
        raw: String,
    },
}

impl Statement {
    /// Lexes one type-1 line.
    ///
    /// Fields are separated by single spaces: field 0 is the line type,
    /// field 1 the colour id, fields 2–13 the pose transform, and everything
    /// from field 14 on, rejoined, is the trailing name. A name ending in
    /// `.dat` is a primitive part; any other name references a submodel.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedStatementError`] if the line has fewer than 15
    /// fields.
    pub fn parse(line: &str) -> Result<Self, MalformedStatementError> {
        let raw = line.trim_end_matches(['\n', '\r']).to_string();
        let fields: Vec<&str> = raw.split(' ').collect();
        if fields.len() <= POSITIONAL_FIELDS {
            return Err(MalformedStatementError(raw));
        }
        let colour = fields[1];
        let name = fields[POSITIONAL_FIELDS..].join(" ");
        if name.ends_with(PART_SUFFIX) {
            Ok(Self::Part {
                key: PartKey::new(colour, name),
                raw,
            })
        } else {
            Ok(Self::Instance {
                reference: SubmodelId::new(&name),
                raw,
            })
        }
    }

    /// The exact serialized form of the statement (no trailing newline).
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Part { raw, .. } | Self::Instance { raw, .. } => raw,
        }
    }

    /// The referenced submodel id, if this is an instance statement.
    #[must_use]
    pub const fn reference(&self) -> Option<&SubmodelId> {
        match self {
            Self::Instance { reference, .. } => Some(reference),
            Self::Part { .. } => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Error returned for a type-1 line with too few fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Malformed statement line '{0}': expected at least 15 space-separated fields")]
pub struct MalformedStatementError(String);

#[cfg(test)]
mod tests {
    use super::*;

    const BRICK: &str = "1 4 0 0 0 1 0 0 0 1 0 0 0 1 3001.dat";

    #[test]
    fn parses_part_placement() {
        let statement = Statement::parse(BRICK).unwrap();
        let Statement::Part { key, raw } = &statement else {
            panic!("expected a part placement");
        };
        assert_eq!(key, &PartKey::new("4", "3001.dat"));
        assert_eq!(raw, BRICK);
        assert_eq!(statement.reference(), None);
    }

    #[test]
    fn parses_submodel_instance() {
        let line = "1 16 0 0 0 1 0 0 0 1 0 0 0 1 wheel.ldr";
        let statement = Statement::parse(line).unwrap();
        let Statement::Instance { reference, raw } = &statement else {
            panic!("expected an instance");
        };
        assert_eq!(reference.as_str(), "wheel.ldr");
        assert_eq!(raw, line);
    }

    #[test]
    fn instance_reference_is_lowercased() {
        let statement = Statement::parse("1 16 0 0 0 1 0 0 0 1 0 0 0 1 Wheel.ldr").unwrap();
        assert_eq!(statement.reference().unwrap().as_str(), "wheel.ldr");
        // The raw text keeps the original case.
        assert!(statement.raw().ends_with("Wheel.ldr"));
    }

    #[test]
    fn part_name_may_contain_spaces() {
        let line = "1 4 0 0 0 1 0 0 0 1 0 0 0 1 my brick.dat";
        let statement = Statement::parse(line).unwrap();
        let Statement::Part { key, .. } = &statement else {
            panic!("expected a part placement");
        };
        assert_eq!(key.part(), "my brick.dat");
    }

    #[test]
    fn strips_trailing_newline() {
        let statement = Statement::parse("1 4 0 0 0 1 0 0 0 1 0 0 0 1 3001.dat\r\n").unwrap();
        assert_eq!(statement.raw(), BRICK);
    }

    #[test]
    fn too_few_fields_is_an_error() {
        assert!(Statement::parse("1 4 0 0 0").is_err());
    }
}
