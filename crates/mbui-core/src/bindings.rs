//! Binding declarations: requests from the UI class side to wire one member
//! to one descriptor node.

use crate::ast::NodeKind;
use std::fmt;

/// The kind of UI element a declaration expects to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ElementKind {
    VerticalNavigation,
    Table,
    Form,
}

impl ElementKind {
    /// The descriptor node kind this element kind binds to.
    pub fn node_kind(&self) -> NodeKind {
        match self {
            ElementKind::VerticalNavigation => NodeKind::VerticalNavigation,
            ElementKind::Table => NodeKind::Table,
            ElementKind::Form => NodeKind::Form,
        }
    }

    pub fn accepts(&self, kind: NodeKind) -> bool {
        self.node_kind() == kind
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::VerticalNavigation => f.write_str("VerticalNavigation"),
            ElementKind::Table => f.write_str("DataTable"),
            ElementKind::Form => f.write_str("Form"),
        }
    }
}

/// One UI member to be wired to a descriptor node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct BindingDeclaration {
    /// Member name on the UI class.
    pub name: String,
    pub kind: ElementKind,
    /// Explicit selector. Falls back to `name` when absent or empty.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub selector: Option<String>,
    /// Fully qualified type argument of the member, if declared.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub type_parameter: Option<String>,
}

impl BindingDeclaration {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            selector: None,
            type_parameter: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_type_parameter(mut self, type_parameter: impl Into<String>) -> Self {
        self.type_parameter = Some(type_parameter.into());
        self
    }

    /// The id this declaration selects.
    pub fn selector(&self) -> &str {
        match self.selector.as_deref() {
            Some(selector) if !selector.is_empty() => selector,
            _ => &self.name,
        }
    }
}
