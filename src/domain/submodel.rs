//! Named submodels: the unit of structure inside a document.

use std::{collections::BTreeMap, fmt};

use crate::domain::{Partlist, Statement};

/// The identity of a submodel within a document: its lowercased filename.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmodelId(String);

impl SubmodelId {
    /// Creates an id from a filename, lowercasing it.
    #[must_use]
    pub fn new(filename: &str) -> Self {
        Self(filename.to_lowercase())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with `_<token>` appended, as produced by collision-safe
    /// renaming in the structural differ.
    #[must_use]
    pub fn with_suffix(&self, token: &str) -> Self {
        Self(format!("{}_{token}", self.0))
    }
}

impl fmt::Display for SubmodelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmodelId {
    fn from(filename: &str) -> Self {
        Self::new(filename)
    }
}

/// A named, independently addressable body of placement and instance
/// statements within a document.
///
/// Identity is the lowercased filename, unique within its [`Document`]. A
/// submodel never owns the submodels it references; references are ids that
/// the owning document resolves on demand.
///
/// [`Document`]: crate::domain::Document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodel {
    id: SubmodelId,
    filename: String,
    header: Vec<String>,
    statements: Vec<Statement>,
    parts: Partlist,
    instances: BTreeMap<SubmodelId, usize>,
}

impl Submodel {
    /// Creates a header-only submodel for the given filename.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            id: SubmodelId::new(&filename),
            filename,
            header: Vec::new(),
            statements: Vec::new(),
            parts: Partlist::new(),
            instances: BTreeMap::new(),
        }
    }

    /// The submodel's id (lowercased filename).
    #[must_use]
    pub const fn id(&self) -> &SubmodelId {
        &self.id
    }

    /// The filename as it appeared in the begin-file directive.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The header lines (metadata between the begin directive and the first
    /// statement), without the derived brick-count line.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The content statements, in original order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The parts placed directly in this submodel (not through instances).
    #[must_use]
    pub const fn parts(&self) -> &Partlist {
        &self.parts
    }

    /// Direct instantiation counts, keyed by referenced submodel id.
    ///
    /// Counts are the number of instance statements appearing in this
    /// submodel's own body; they are not multiplied by ancestor counts.
    #[must_use]
    pub const fn instances(&self) -> &BTreeMap<SubmodelId, usize> {
        &self.instances
    }

    /// Appends a header line.
    pub fn push_header_line(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    /// Appends a content statement, updating the direct partlist or the
    /// instance counts accordingly.
    pub fn push_statement(&mut self, statement: Statement) {
        match &statement {
            Statement::Part { key, .. } => self.parts.add(key.clone(), 1),
            Statement::Instance { reference, .. } => {
                *self.instances.entry(reference.clone()).or_insert(0) += 1;
            }
        }
        self.statements.push(statement);
    }

    /// A copy of this submodel with the same header but no content.
    #[must_use]
    pub fn header_only(&self) -> Self {
        Self {
            id: self.id.clone(),
            filename: self.filename.clone(),
            header: self.header.clone(),
            statements: Vec::new(),
            parts: Partlist::new(),
            instances: BTreeMap::new(),
        }
    }

    /// One-level structural equality: same id and the same multiset of
    /// statement texts, ignoring order and headers.
    ///
    /// This test deliberately does not recurse into referenced submodels, so
    /// a divergence nested two or more instantiations deep inside an
    /// otherwise identical reference is not visible to it.
    #[must_use]
    pub fn content_eq(&self, other: &Self) -> bool {
        if self.id != other.id || self.statements.len() != other.statements.len() {
            return false;
        }
        let mut lines_a: Vec<&str> = self.statements.iter().map(Statement::raw).collect();
        let mut lines_b: Vec<&str> = other.statements.iter().map(Statement::raw).collect();
        lines_a.sort_unstable();
        lines_b.sort_unstable();
        lines_a == lines_b
    }

    /// A copy of this submodel under the unique name `<filename>_<token>`.
    ///
    /// Header lines naming the old filename are rewritten to the new one;
    /// content statements are carried over verbatim.
    #[must_use]
    pub fn renamed(&self, token: &str) -> Self {
        let filename = format!("{}_{token}", self.filename);
        let header = self
            .header
            .iter()
            .map(|line| line.replace(&self.filename, &filename))
            .collect();
        Self {
            id: self.id.with_suffix(token),
            filename,
            header,
            statements: self.statements.clone(),
            parts: self.parts.clone(),
            instances: self.instances.clone(),
        }
    }
}

impl fmt::Display for Submodel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({} statements)", self.id, self.statements.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(line: &str) -> Statement {
        Statement::parse(line).unwrap()
    }

    fn brick(colour: &str, x: u32) -> String {
        format!("1 {colour} {x} 0 0 1 0 0 0 1 0 0 0 1 3001.dat")
    }

    #[test]
    fn push_statement_tracks_direct_parts() {
        let mut submodel = Submodel::new("car.ldr");
        submodel.push_statement(statement(&brick("4", 0)));
        submodel.push_statement(statement(&brick("4", 20)));
        assert_eq!(submodel.parts().count(&"4:3001.dat".parse().unwrap()), 2);
        assert!(submodel.instances().is_empty());
    }

    #[test]
    fn push_statement_tracks_instance_counts() {
        let mut submodel = Submodel::new("car.ldr");
        let instance = "1 16 0 0 0 1 0 0 0 1 0 0 0 1 wheel.ldr";
        submodel.push_statement(statement(instance));
        submodel.push_statement(statement(instance));
        assert_eq!(
            submodel.instances().get(&SubmodelId::new("wheel.ldr")),
            Some(&2)
        );
        assert!(submodel.parts().is_empty());
    }

    #[test]
    fn content_eq_ignores_order_and_header() {
        let mut a = Submodel::new("car.ldr");
        a.push_header_line("0 model a");
        a.push_statement(statement(&brick("4", 0)));
        a.push_statement(statement(&brick("1", 20)));

        let mut b = Submodel::new("car.ldr");
        b.push_header_line("0 a different header");
        b.push_statement(statement(&brick("1", 20)));
        b.push_statement(statement(&brick("4", 0)));

        assert!(a.content_eq(&b));
    }

    #[test]
    fn content_eq_differs_on_id_or_lines() {
        let mut a = Submodel::new("car.ldr");
        a.push_statement(statement(&brick("4", 0)));

        let mut other_id = Submodel::new("truck.ldr");
        other_id.push_statement(statement(&brick("4", 0)));
        assert!(!a.content_eq(&other_id));

        let mut other_line = Submodel::new("car.ldr");
        other_line.push_statement(statement(&brick("4", 40)));
        assert!(!a.content_eq(&other_line));
    }

    #[test]
    fn content_eq_is_a_multiset_test() {
        let mut a = Submodel::new("car.ldr");
        a.push_statement(statement(&brick("4", 0)));
        a.push_statement(statement(&brick("4", 0)));

        let mut b = Submodel::new("car.ldr");
        b.push_statement(statement(&brick("4", 0)));
        assert!(!a.content_eq(&b));
    }

    #[test]
    fn renamed_rewrites_id_and_header() {
        let mut submodel = Submodel::new("Wheel.ldr");
        submodel.push_header_line("0 Wheel.ldr");
        submodel.push_header_line("0 Name:  Wheel.ldr");
        submodel.push_header_line("0 Author: someone");
        submodel.push_statement(statement(&brick("4", 0)));

        let renamed = submodel.renamed("1a");
        assert_eq!(renamed.id().as_str(), "wheel.ldr_1a");
        assert_eq!(renamed.filename(), "Wheel.ldr_1a");
        assert_eq!(renamed.header()[0], "0 Wheel.ldr_1a");
        assert_eq!(renamed.header()[1], "0 Name:  Wheel.ldr_1a");
        assert_eq!(renamed.header()[2], "0 Author: someone");
        assert_eq!(renamed.statements(), submodel.statements());
    }
}
