//! MOOSE input block engine.
//!
//! This crate loads the YAML block schema dumped by a MOOSE application into
//! a catalog of exemplar blocks, lets callers build and edit working block
//! trees from it, and reads and writes those trees as GetPot input files.
//!
//! The binary `mooseblocks` demonstrates usage and prints parsed blocks as JSON.

pub mod error;
pub mod generator;
pub mod model;
pub mod operations;
pub mod parser;
pub mod schema;
pub mod tree;

pub use error::{Error, ParseWarning, Result};
pub use generator::dump;
pub use model::{AdaptiveVariants, Block, Catalog, CatalogDoc, Parameter};
pub use operations::clone_exemplar;
pub use parser::parse;
pub use schema::{load_action_syntax, load_schema};
pub use tree::{GenericTreeNode, from_generic_tree, to_generic_tree};
