//! The resolved binding graph handed to code emitters.

use crate::ast::NodeId;
use crate::errors::{Diagnostics, ValidationError};
use indexmap::IndexMap;

/// Association between a management-model address and the metadata
/// elements declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataScope {
    pub address: String,
    /// Every `<metadata/>` element with this address, in document order.
    pub nodes: Vec<NodeId>,
}

/// The vertical navigation of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedNavigation {
    /// Member name of the binding, `None` when no declaration selects it.
    pub name: Option<String>,
    pub id: Option<String>,
    pub node: NodeId,
    pub items: Vec<ResolvedItem>,
}

impl ResolvedNavigation {
    /// Find an item or sub item by id.
    pub fn item(&self, id: &str) -> Option<&ResolvedItem> {
        self.items.iter().find_map(|item| item.find(id))
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut ResolvedItem> {
        self.items.iter_mut().find_map(|item| item.find_mut(id))
    }
}

/// A navigation entry (`<item/>` or `<sub-item/>`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub node: NodeId,
    pub sub_items: Vec<ResolvedItem>,
    /// Content of a leaf item, in document order.
    pub content: Vec<ContentSegment>,
}

impl ResolvedItem {
    fn find(&self, id: &str) -> Option<&ResolvedItem> {
        let mut stack = vec![self];
        while let Some(item) = stack.pop() {
            if item.id.as_deref() == Some(id) {
                return Some(item);
            }
            stack.extend(item.sub_items.iter().rev());
        }
        None
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ResolvedItem> {
        let mut stack = vec![self];
        while let Some(item) = stack.pop() {
            if item.id.as_deref() == Some(id) {
                return Some(item);
            }
            stack.extend(item.sub_items.iter_mut().rev());
        }
        None
    }

    pub fn references(&self) -> impl Iterator<Item = &ContentReference> {
        self.content.iter().filter_map(|segment| match segment {
            ContentSegment::Reference(reference) => Some(reference),
            ContentSegment::Markup(_) => None,
        })
    }

    pub fn reference_mut(&mut self, id: &str) -> Option<&mut ContentReference> {
        self.content.iter_mut().find_map(|segment| match segment {
            ContentSegment::Reference(reference) if reference.id.as_deref() == Some(id) => {
                Some(reference)
            }
            _ => None,
        })
    }
}

// Sub items are released level by level so dropping a deep chain does not
// recurse once per level.
impl Drop for ResolvedItem {
    fn drop(&mut self) {
        let mut released = std::mem::take(&mut self.sub_items);
        while let Some(mut item) = released.pop() {
            released.append(&mut item.sub_items);
        }
    }
}

/// One piece of navigation item content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentSegment {
    /// Coalesced opaque markup.
    Markup(String),
    /// An embedded table or form.
    Reference(ContentReference),
}

/// An embedded table or form inside navigation content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentReference {
    pub id: Option<String>,
    /// Member name of the binding selecting `id`, if any.
    pub member: Option<String>,
}

/// A bound data table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedTable {
    pub name: String,
    pub selector: String,
    pub type_parameter: String,
    pub node: NodeId,
    /// Address of the enclosing metadata scope.
    pub metadata: Option<String>,
    pub columns: Vec<ResolvedColumn>,
    /// Member name of the linked form binding.
    pub form_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedColumn {
    pub name: Option<String>,
    pub title: Option<String>,
    pub value: Option<String>,
}

/// A bound form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedForm {
    pub name: String,
    pub selector: String,
    pub type_parameter: String,
    pub node: NodeId,
    pub metadata: Option<String>,
    pub attributes: Vec<ResolvedAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedAttribute {
    pub name: Option<String>,
    /// Addresses of the suggest handler templates, in document order.
    pub suggest_handler_templates: Vec<String>,
}

/// Fully cross-referenced output of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedBindingGraph {
    pub metadata: IndexMap<String, MetadataScope>,
    pub navigation: Option<ResolvedNavigation>,
    pub tables: Vec<ResolvedTable>,
    pub forms: Vec<ResolvedForm>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: Vec<ValidationError>,
}

impl ResolvedBindingGraph {
    /// True when no diagnostics were reported.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&ResolvedTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn form(&self, name: &str) -> Option<&ResolvedForm> {
        self.forms.iter().find(|f| f.name == name)
    }

    /// Member name of the table or form binding that selects `selector`.
    pub fn binding_for_selector(&self, selector: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.selector == selector)
            .map(|t| t.name.as_str())
            .or_else(|| {
                self.forms
                    .iter()
                    .find(|f| f.selector == selector)
                    .map(|f| f.name.as_str())
            })
    }

    /// The graph if it is free of diagnostics, otherwise the diagnostics.
    pub fn into_result(self) -> Result<Self, Diagnostics> {
        if self.diagnostics.is_empty() {
            Ok(self)
        } else {
            Err(Diagnostics(self.diagnostics))
        }
    }
}
