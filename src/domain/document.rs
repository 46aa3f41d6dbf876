//! The document: an ordered arena of submodels.

use indexmap::IndexMap;
use petgraph::{algo::is_cyclic_directed, graphmap::DiGraphMap};
use tracing::debug;

use crate::domain::{Partlist, Submodel, SubmodelId};

/// A parsed multi-file model: the sole owner of its submodels, keyed by id.
///
/// Submodels are kept in the order they were first inserted; the first one is
/// the logical root, used for whole-document aggregate queries. All
/// cross-references between submodels are plain ids resolved through this
/// arena, never retained links, so the reference graph may share nodes freely
/// without ownership cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    submodels: IndexMap<SubmodelId, Submodel>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a submodel, keyed by its id. An existing submodel with the
    /// same id is replaced.
    pub fn insert(&mut self, submodel: Submodel) {
        self.submodels.insert(submodel.id().clone(), submodel);
    }

    /// Looks up a submodel by id.
    #[must_use]
    pub fn get(&self, id: &SubmodelId) -> Option<&Submodel> {
        self.submodels.get(id)
    }

    /// `true` if a submodel with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &SubmodelId) -> bool {
        self.submodels.contains_key(id)
    }

    /// The logical root: the first submodel encountered during parsing.
    #[must_use]
    pub fn root(&self) -> Option<&Submodel> {
        self.submodels.values().next()
    }

    /// The number of submodels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.submodels.len()
    }

    /// `true` if the document holds no submodels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.submodels.is_empty()
    }

    /// Iterates over submodels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Submodel> {
        self.submodels.values()
    }

    /// Confirms that every instance reference resolves within this document
    /// and that the reference graph is acyclic.
    ///
    /// Called once after parsing; resolved submodels are never cached as
    /// pointers, so later lookups go through [`Self::get`] again.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unresolved`] for a reference with no
    /// matching submodel, or [`ReferenceError::Cyclic`] if the reference
    /// graph contains a cycle (which would make the recursive operations
    /// diverge).
    pub fn validate_references(&self) -> Result<(), ReferenceError> {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for (index, submodel) in self.submodels.values().enumerate() {
            graph.add_node(index);
            for reference in submodel.instances().keys() {
                let target = self.submodels.get_index_of(reference).ok_or_else(|| {
                    ReferenceError::Unresolved {
                        submodel: submodel.id().clone(),
                        reference: reference.clone(),
                    }
                })?;
                // A self-reference is the smallest possible cycle.
                if target == index {
                    return Err(ReferenceError::Cyclic);
                }
                graph.add_edge(index, target, ());
            }
        }
        if is_cyclic_directed(&graph) {
            return Err(ReferenceError::Cyclic);
        }
        debug!(submodels = self.len(), "reference graph validated");
        Ok(())
    }

    /// The total instantiated partlist of the root submodel.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unresolved`] if an instance reference does
    /// not resolve. An empty document yields an empty partlist.
    pub fn total_partlist(&self) -> Result<Partlist, ReferenceError> {
        self.root()
            .map_or_else(|| Ok(Partlist::new()), |root| self.submodel_partlist(root))
    }

    /// The total instantiated partlist of one submodel: its direct parts
    /// plus, for every referenced submodel, that submodel's own total scaled
    /// by the instantiation count.
    ///
    /// Pure and recursive; calling it twice yields identical fresh values.
    /// Only defined on acyclic documents (guaranteed after
    /// [`Self::validate_references`]).
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unresolved`] if an instance reference does
    /// not resolve.
    pub fn submodel_partlist(&self, submodel: &Submodel) -> Result<Partlist, ReferenceError> {
        let mut total = submodel.parts().clone();
        for (reference, count) in submodel.instances() {
            let referenced =
                self.get(reference)
                    .ok_or_else(|| ReferenceError::Unresolved {
                        submodel: submodel.id().clone(),
                        reference: reference.clone(),
                    })?;
            total.merge(&self.submodel_partlist(referenced)?.scaled(*count));
        }
        Ok(total)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Submodel;
    type IntoIter = indexmap::map::Values<'a, SubmodelId, Submodel>;

    fn into_iter(self) -> Self::IntoIter {
        self.submodels.values()
    }
}

/// Errors raised while resolving submodel references within one document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// An instance statement names a submodel the document does not contain.
    #[error("Submodel '{submodel}' references '{reference}', which does not exist in the document")]
    Unresolved {
        /// The submodel containing the dangling instance statement.
        submodel: SubmodelId,
        /// The id that failed to resolve.
        reference: SubmodelId,
    },

    /// The submodel reference graph contains a cycle.
    #[error("The submodel reference graph contains a cycle")]
    Cyclic,
}
