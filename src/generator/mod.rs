//! GetPot generator – write MOOSE input files from the block model.
//!
//! - [`getpot`] – Generate GetPot text from a [`Block`](crate::model::Block) forest.

pub mod getpot;

pub use getpot::{dump, write_input_file};
