//! Structural diffing for LDraw multi-file brick models.
//!
//! Given two models, computes the aggregate part-quantity difference and
//! intersection, or a geometrically faithful difference/common model that
//! preserves the recursive submodel instantiation structure.

pub mod domain;
pub use domain::{
    Document, ModelDiff, PartKey, Partlist, PartlistDiff, Spacing, Statement, Submodel,
    SubmodelId, diff_partlists, render_partlist, structural_diff,
};

/// Reading and writing documents in the LDraw text format.
pub mod storage;
pub use storage::{LoadError, ParseError, load, parse_document, save, serialize};
