//! NML resolution library - shared modules for the resolver binary.

pub mod collection;
pub mod heuristic;
pub mod history;
pub mod models;
pub mod normalize;
