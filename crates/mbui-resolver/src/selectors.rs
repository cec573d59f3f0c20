//! Selector resolution and kind compatibility.

use mbui_core::{BindingDeclaration, NodeId, SelectorError, ValidationError};

use crate::context::ResolveContext;

/// Find the single node selected by a declaration.
///
/// Lookup is by exact `id` over the whole tree. Missing, ambiguous and
/// kind-incompatible matches are reported and yield no node.
pub(crate) fn resolve_selector(
    ctx: &mut ResolveContext<'_>,
    declaration: &BindingDeclaration,
) -> Option<NodeId> {
    let selector = declaration.selector();
    let matches = ctx.nodes_with_id(selector).to_vec();

    match matches.as_slice() {
        [] => {
            ctx.report(SelectorError::NotFound {
                declaration: declaration.name.clone(),
                selector: selector.to_string(),
            });
            None
        }
        [node] => {
            let found = ctx.tree.kind(*node);
            if declaration.kind.accepts(found) {
                Some(*node)
            } else {
                ctx.report(ValidationError::KindMismatch {
                    declaration: declaration.name.clone(),
                    selector: selector.to_string(),
                    expected: declaration.kind,
                    found,
                    node: *node,
                });
                None
            }
        }
        _ => {
            ctx.report(SelectorError::Ambiguous {
                declaration: declaration.name.clone(),
                selector: selector.to_string(),
                count: matches.len(),
                nodes: matches.clone(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve;
    use crate::test_support::*;
    use mbui_core::{
        BindingDeclaration, ElementKind, ErrorCategory, NodeKind, SelectorError, ValidationError,
    };

    const VIEW: &str = r#"
<view>
    <metadata address="/subsystem=mail">
        <table id="mail-table"/>
        <table id="dup"/>
        <table id="dup"/>
    </metadata>
</view>"#;

    #[test]
    fn test_unique_selector() {
        let tree = view(VIEW);
        let declaration =
            BindingDeclaration::new("table", ElementKind::Table).with_selector("mail-table");
        let graph = resolve(&tree, &[declaration]);

        assert!(graph.is_valid(), "{:?}", graph.diagnostics);
        let table = graph.table("table").unwrap();
        assert_eq!(tree.kind(table.node), NodeKind::Table);
        assert_eq!(table.selector, "mail-table");
    }

    #[test]
    fn test_default_selector_is_member_name() {
        let declaration = BindingDeclaration::new("mail-table", ElementKind::Table);
        let graph = resolve(&view(VIEW), &[declaration]);

        assert!(graph.is_valid());
        assert_eq!(graph.binding_for_selector("mail-table"), Some("mail-table"));
    }

    #[test]
    fn test_selector_not_found() {
        let declaration =
            BindingDeclaration::new("form", ElementKind::Form).with_selector("missing");
        let graph = resolve(&view(VIEW), &[declaration]);

        assert_eq!(graph.diagnostics.len(), 1);
        assert_eq!(
            graph.diagnostics[0].to_string(),
            "Cannot find a matching element in the MBUI XML with id \"missing\"."
        );
        assert!(graph.forms.is_empty());
    }

    #[test]
    fn test_ambiguous_selector() {
        let declaration = BindingDeclaration::new("table", ElementKind::Table).with_selector("dup");
        let graph = resolve(&view(VIEW), &[declaration]);

        assert_eq!(graph.diagnostics.len(), 1);
        match &graph.diagnostics[0] {
            ValidationError::Selector(SelectorError::Ambiguous { count, nodes, .. }) => {
                assert_eq!(*count, 2);
                assert_eq!(nodes.len(), 2);
            }
            other => panic!("unexpected diagnostic: {other:?}"),
        }
        assert!(graph.tables.is_empty());
    }

    #[test]
    fn test_kind_mismatch() {
        let declaration =
            BindingDeclaration::new("form", ElementKind::Form).with_selector("mail-table");
        let graph = resolve(&view(VIEW), &[declaration]);

        let mismatches = errors_of(&graph, ErrorCategory::KindMismatch);
        assert_eq!(mismatches.len(), 1);
        assert!(matches!(
            mismatches[0],
            ValidationError::KindMismatch {
                expected: ElementKind::Form,
                found: NodeKind::Table,
                ..
            }
        ));
        assert!(graph.forms.is_empty() && graph.tables.is_empty());
    }
}
