//! Comment tree engine for discussion boards.
//!
//! Turns the flat (or pre-nested) comment list of a post into a tree rooted
//! at the post, marks the best-scoring thread and lays the tree out for
//! drawing.

pub mod config;
pub mod error;
pub mod model;
pub mod outline;
pub mod tree;
