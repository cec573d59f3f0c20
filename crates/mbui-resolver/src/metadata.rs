//! Metadata scopes.
//!
//! All `<metadata/>` addresses are registered upfront; tables and forms then
//! resolve to the scope of their nearest metadata ancestor.

use mbui_core::{MetadataScope, NodeId, NodeKind, ScopeError, ValidationError};
use tracing::trace;

use crate::context::ResolveContext;

pub(crate) fn register_metadata(ctx: &mut ResolveContext<'_>) {
    let tree = ctx.tree;
    for node in tree.nodes_of_kind(NodeKind::Metadata) {
        match tree.attribute(node, "address") {
            Some(address) => {
                trace!(address, "registering metadata");
                ctx.graph
                    .metadata
                    .entry(address.to_string())
                    .or_insert_with(|| MetadataScope {
                        address: address.to_string(),
                        nodes: Vec::new(),
                    })
                    .nodes
                    .push(node);
            }
            None => ctx.report(ValidationError::field(
                format!(
                    "Missing address attribute in metadata element \"{}\"",
                    tree.start_tag(node)
                ),
                node,
                None,
            )),
        }
    }
}

/// Address of the scope enclosing `node`, reporting a scope error if there is none.
pub(crate) fn find_scope(
    ctx: &mut ResolveContext<'_>,
    declaration: &str,
    node: NodeId,
) -> Option<String> {
    let tree = ctx.tree;
    let element = tree.node(node).map(|n| n.name.clone()).unwrap_or_default();
    let id = tree.id(node).unwrap_or_default().to_string();

    let Some(metadata) = tree.nearest_ancestor_of_kind(node, NodeKind::Metadata) else {
        ctx.report(ScopeError::MissingAncestor {
            declaration: declaration.to_string(),
            element,
            id,
            node,
        });
        return None;
    };

    let address = tree.attribute(metadata, "address");
    match address {
        Some(address) if ctx.graph.metadata.contains_key(address) => Some(address.to_string()),
        _ => {
            ctx.report(ScopeError::Unregistered {
                declaration: declaration.to_string(),
                element,
                id,
                address: address.map(str::to_string),
                node,
                metadata,
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve;
    use crate::test_support::*;
    use mbui_core::{BindingDeclaration, ElementKind, ErrorCategory, ScopeError, ValidationError};

    #[test]
    fn test_registers_every_address_once() {
        let tree = view(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A"><metadata address="/x"><p/></metadata></item>
                <item id="b" title="B"><metadata address="/x"><p/></metadata></item>
                <item id="c" title="C"><metadata address="/y"><p/></metadata></item>
            </vertical-navigation></view>"#,
        );
        let graph = resolve(&tree, &[]);

        assert!(graph.is_valid(), "{:?}", graph.diagnostics);
        let addresses: Vec<_> = graph.metadata.keys().map(String::as_str).collect();
        assert_eq!(addresses, vec!["/x", "/y"]);
        assert_eq!(graph.metadata["/x"].nodes.len(), 2);
    }

    #[test]
    fn test_table_scope() {
        let tree =
            view(r#"<view><metadata address="X"><div><table id="t"/></div></metadata></view>"#);
        let graph = resolve(&tree, &[BindingDeclaration::new("t", ElementKind::Table)]);

        assert!(graph.is_valid());
        assert_eq!(graph.table("t").unwrap().metadata.as_deref(), Some("X"));
    }

    #[test]
    fn test_nearest_metadata_wins() {
        let tree = view(
            r#"<view><metadata address="/outer">
                <metadata address="/inner"><form id="f"/></metadata>
            </metadata></view>"#,
        );
        let graph = resolve(&tree, &[BindingDeclaration::new("f", ElementKind::Form)]);

        assert_eq!(graph.form("f").unwrap().metadata.as_deref(), Some("/inner"));
    }

    #[test]
    fn test_missing_metadata_ancestor() {
        let tree = view(
            r#"<view><vertical-navigation id="nav">
                <item id="i" title="I"><table id="t"/></item>
            </vertical-navigation></view>"#,
        );
        let declaration = BindingDeclaration::new("table", ElementKind::Table).with_selector("t");
        let graph = resolve(&tree, &[declaration]);

        assert_eq!(graph.diagnostics.len(), 1);
        let error = &graph.diagnostics[0];
        assert_eq!(error.category(), ErrorCategory::Scope);
        assert!(matches!(error, ValidationError::Scope(ScopeError::MissingAncestor { .. })));
        assert_eq!(graph.table("table").unwrap().metadata, None);
    }

    #[test]
    fn test_metadata_without_address() {
        let tree = view(r#"<view><metadata><table id="t"/></metadata></view>"#);
        let graph = resolve(&tree, &[BindingDeclaration::new("t", ElementKind::Table)]);

        let fields = errors_of(&graph, ErrorCategory::Field);
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[0].to_string(),
            "Missing address attribute in metadata element \"<metadata>\""
        );
        let scopes = errors_of(&graph, ErrorCategory::Scope);
        assert_eq!(scopes.len(), 1);
        assert!(matches!(
            scopes[0],
            ValidationError::Scope(ScopeError::Unregistered { address: None, .. })
        ));
    }
}
