//! Error types for MBUI processing.

use crate::ast::{NodeId, NodeKind};
use crate::bindings::ElementKind;
use std::fmt;
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum MbuiError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] Diagnostics),
}

/// Errors while parsing MBUI XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "Unexpected token at line {line}, column {column}: \
         expected {expected}, found {found:?}"
    )]
    UnexpectedToken {
        found: String,
        expected: String,
        line: u32,
        column: u32,
    },

    #[error(
        "Mismatched closing tag at line {line}, column {column}: \
         expected </{expected}>, found </{found}>"
    )]
    MismatchedTag {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Duplicate attribute '{name}' at line {line}, column {column}")]
    DuplicateAttribute { name: String, line: u32, column: u32 },

    #[error("Unknown entity '&{name};' at line {line}, column {column}")]
    UnknownEntity { name: String, line: u32, column: u32 },

    #[error("Content after the root element at line {line}, column {column}")]
    TrailingContent { line: u32, column: u32 },

    #[error("Element nesting exceeds {limit} levels at line {line}, column {column}")]
    NestingTooDeep { limit: usize, line: u32, column: u32 },

    #[error("No root element found")]
    NoRootElement,

    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Coarse classification of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Structural,
    Selector,
    KindMismatch,
    Scope,
    Field,
}

/// A single diagnostic reported while resolving a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Malformed tree shape.
    #[error("{message}")]
    Structural { message: String, node: Option<NodeId> },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(
        "Element with id \"{selector}\" bound to '{declaration}' \
         is a <{found}>, expected {expected}."
    )]
    KindMismatch {
        declaration: String,
        selector: String,
        expected: ElementKind,
        found: NodeKind,
        node: NodeId,
    },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Missing mandatory attribute, bad nesting or bad expression syntax.
    #[error("{message}")]
    Field {
        message: String,
        node: Option<NodeId>,
        declaration: Option<String>,
    },
}

/// Selector lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Cannot find a matching element in the MBUI XML with id \"{selector}\".")]
    NotFound { declaration: String, selector: String },

    #[error(
        "Found {count} matching elements in the MBUI XML with id \"{selector}\". \
         Id must be unique."
    )]
    Ambiguous {
        declaration: String,
        selector: String,
        count: usize,
        nodes: Vec<NodeId>,
    },
}

/// Metadata scoping failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error(
        "Missing metadata ancestor for {element}#{id}. \
         Please make sure there's a <metadata/> ancestor element."
    )]
    MissingAncestor {
        declaration: String,
        element: String,
        id: String,
        node: NodeId,
    },

    #[error(
        "No metadata found for {element}#{id}. \
         Please make sure the <metadata/> ancestor element has a valid address."
    )]
    Unregistered {
        declaration: String,
        element: String,
        id: String,
        address: Option<String>,
        node: NodeId,
        metadata: NodeId,
    },
}

impl ValidationError {
    pub fn structural(message: impl Into<String>, node: Option<NodeId>) -> Self {
        ValidationError::Structural {
            message: message.into(),
            node,
        }
    }

    pub fn field(message: impl Into<String>, node: NodeId, declaration: Option<&str>) -> Self {
        ValidationError::Field {
            message: message.into(),
            node: Some(node),
            declaration: declaration.map(str::to_string),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ValidationError::Structural { .. } => ErrorCategory::Structural,
            ValidationError::Selector(_) => ErrorCategory::Selector,
            ValidationError::KindMismatch { .. } => ErrorCategory::KindMismatch,
            ValidationError::Scope(_) => ErrorCategory::Scope,
            ValidationError::Field { .. } => ErrorCategory::Field,
        }
    }

    /// The offending descriptor node, if the error is tied to one.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ValidationError::Structural { node, .. } => *node,
            ValidationError::Selector(SelectorError::NotFound { .. }) => None,
            ValidationError::Selector(SelectorError::Ambiguous { nodes, .. }) => {
                nodes.first().copied()
            }
            ValidationError::KindMismatch { node, .. } => Some(*node),
            ValidationError::Scope(ScopeError::MissingAncestor { node, .. }) => Some(*node),
            ValidationError::Scope(ScopeError::Unregistered { node, .. }) => Some(*node),
            ValidationError::Field { node, .. } => *node,
        }
    }

    /// The offending binding declaration, if the error is tied to one.
    pub fn declaration(&self) -> Option<&str> {
        match self {
            ValidationError::Structural { .. } => None,
            ValidationError::Selector(SelectorError::NotFound { declaration, .. })
            | ValidationError::Selector(SelectorError::Ambiguous { declaration, .. })
            | ValidationError::KindMismatch { declaration, .. }
            | ValidationError::Scope(ScopeError::MissingAncestor { declaration, .. })
            | ValidationError::Scope(ScopeError::Unregistered { declaration, .. }) => {
                Some(declaration)
            }
            ValidationError::Field { declaration, .. } => declaration.as_deref(),
        }
    }
}

/// A non-empty batch of validation errors.
///
/// `Display` is implemented by hand to list every error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub struct Diagnostics(pub Vec<ValidationError>);

impl Diagnostics {
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no validation errors"),
            [single] => write!(f, "{single}"),
            errors => {
                write!(f, "{} validation errors:", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
