//! Reading and writing documents in the LDraw multi-file text format.

pub mod ldraw;
pub use ldraw::{LoadError, ParseError, load, parse_document, save, serialize};
