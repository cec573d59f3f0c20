//! Core types for MBUI view descriptors.
//!
//! This crate provides the foundational types used across the other mbui crates:
//! - The descriptor tree parsed from MBUI XML (an arena with parent indices)
//! - Binding declarations supplied by the UI class side
//! - The resolved binding graph handed to code emitters
//! - Error types

pub mod ast;
pub mod bindings;
pub mod errors;
pub mod graph;
pub mod markup;

pub use ast::*;
pub use bindings::*;
pub use errors::*;
pub use graph::*;
