//! Domain models for brick-model diffing.
//!
//! This module contains the core types (part keys, partlists, statements,
//! submodels, documents) and the three diffing pipelines: partlist
//! aggregation and diffing, grid layout rendering, and structural model
//! diffing.

pub mod part;
pub use part::{InvalidPartKeyError, PartKey, Partlist};

pub mod statement;
pub use statement::{MalformedStatementError, Statement};

pub mod submodel;
pub use submodel::{Submodel, SubmodelId};

pub mod document;
pub use document::{Document, ReferenceError};

pub mod partlist_diff;
pub use partlist_diff::{PartlistDiff, diff_partlists};

pub mod layout;
pub use layout::{Spacing, render_partlist};

pub mod model_diff;
pub use model_diff::{ModelDiff, structural_diff};
