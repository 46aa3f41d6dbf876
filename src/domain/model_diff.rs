//! Recursive structural diffing of two documents.
//!
//! Produces a "difference" document (what only A has) and a "common" document
//! (what both share), preserving the instantiation structure. When the two
//! documents hold divergent submodels under one shared id, the differ
//! synthesizes a uniquely renamed copy so the versions do not collide.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Document, Statement, Submodel};

/// The two output documents of a structural diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDiff {
    /// Geometry only document A has (plus synthesized renamed submodels).
    pub difference: Document,
    /// Geometry both documents share.
    pub common: Document,
}

/// A per-invocation source of rename tokens.
///
/// A monotonic counter, hex-formatted, so the differ is a deterministic pure
/// function of its inputs and concurrent invocations cannot collide (each
/// call owns its own source).
#[derive(Debug, Default)]
struct TokenSource {
    counter: u64,
}

impl TokenSource {
    /// The next token, skipping any that would collide with an id already
    /// present in `doc_a` or in the output under the candidate name.
    fn fresh(&mut self, base: &Submodel, doc_a: &Document, output: &Document) -> String {
        loop {
            self.counter += 1;
            let token = format!("{:x}", self.counter);
            let candidate = base.id().with_suffix(&token);
            if !doc_a.contains(&candidate) && !output.contains(&candidate) {
                return token;
            }
        }
    }
}

/// Diffs document A against document B, per submodel id.
///
/// For every id in A the difference document receives a submodel with A's
/// header and the statements only A has; the common document receives, for
/// ids present in both, the statements whose exact text occurs in both.
/// Instance statements are additionally checked against the one-level
/// structural equality of their referenced submodels; a shared instance line
/// over unequal targets lands in both outputs, and an unshared instance line
/// over unequal targets triggers synthesis of a renamed copy of A's target.
///
/// A shared id whose difference ends up with no statements falls back to a
/// verbatim copy of A's full content. Call the function twice with swapped
/// arguments to obtain "only in A" and "only in B"; the common output is
/// semantically the same from either call.
///
/// Input documents are never mutated; the outputs are freshly built.
#[must_use]
pub fn structural_diff(doc_a: &Document, doc_b: &Document) -> ModelDiff {
    let mut diff = ModelDiff::default();
    let mut tokens = TokenSource::default();

    for submodel_a in doc_a {
        let Some(submodel_b) = doc_b.get(submodel_a.id()) else {
            // The whole submodel exists only in A.
            diff.difference.insert(submodel_a.clone());
            continue;
        };

        let lines_b: HashSet<&str> = submodel_b.statements().iter().map(Statement::raw).collect();
        let mut only_a = submodel_a.header_only();
        let mut shared = submodel_a.header_only();

        for statement in submodel_a.statements() {
            if lines_b.contains(statement.raw()) {
                if let Some(reference) = statement.reference() {
                    // The instance line is shared, but its target's content
                    // may still differ between the two documents.
                    let targets_equal = match (doc_a.get(reference), doc_b.get(reference)) {
                        (Some(target_a), Some(target_b)) => target_a.content_eq(target_b),
                        _ => false,
                    };
                    if !targets_equal {
                        only_a.push_statement(statement.clone());
                    }
                }
                shared.push_statement(statement.clone());
            } else {
                match statement
                    .reference()
                    .map(|reference| (reference, doc_a.get(reference), doc_b.get(reference)))
                {
                    Some((reference, Some(target_a), Some(target_b)))
                        if !target_a.content_eq(target_b) =>
                    {
                        // Both documents hold a submodel under this id, with
                        // different content. A verbatim copy of A's version
                        // is stored under a fresh unique name and the
                        // instance line is rewritten to point at it.
                        let token = tokens.fresh(target_a, doc_a, &diff.difference);
                        let renamed = target_a.renamed(&token);
                        debug!(
                            from = %reference,
                            to = %renamed.id(),
                            "synthesized renamed submodel for divergent reference"
                        );
                        only_a.push_statement(Statement::Instance {
                            reference: renamed.id().clone(),
                            raw: format!("{}_{token}", statement.raw()),
                        });
                        diff.difference.insert(renamed);
                    }
                    // Part placements, references absent from B, and
                    // references with structurally equal targets all carry
                    // over as-is.
                    _ => only_a.push_statement(statement.clone()),
                }
            }
        }

        diff.common.insert(shared);
        if only_a.statements().is_empty() {
            // Degenerate fallback: nothing differs line-by-line, so the
            // difference reports A's content wholesale.
            diff.difference.insert(submodel_a.clone());
        } else {
            diff.difference.insert(only_a);
        }
    }

    diff
}
