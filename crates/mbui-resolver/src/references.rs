//! Cross references between bindings.
//!
//! Resolves table to form links (`form-ref`) and the table and form
//! references embedded in navigation item content. Neither produces
//! diagnostics: an unmatched reference is a valid "no link" state.

use mbui_core::{NodeId, NodeKind};
use tracing::trace;

use crate::context::ResolveContext;

pub(crate) fn resolve_cross_references(ctx: &mut ResolveContext<'_>) {
    link_forms(ctx);
    resolve_item_references(ctx);
}

fn link_forms(ctx: &mut ResolveContext<'_>) {
    let tree = ctx.tree;
    for node in tree.nodes_of_kind(NodeKind::Table) {
        let Some(form_ref) = tree.attribute(node, "form-ref") else {
            continue;
        };
        let Some(form) = ctx.graph.forms.iter().find(|f| f.selector == form_ref) else {
            trace!(form_ref, "form-ref without form binding");
            continue;
        };
        let form_name = form.name.clone();
        if let Some(table) = ctx.graph.tables.iter_mut().find(|t| t.node == node) {
            trace!(table = %table.name, form = %form_name, "linked form");
            table.form_ref = Some(form_name);
        }
    }
}

fn resolve_item_references(ctx: &mut ResolveContext<'_>) {
    let tree = ctx.tree;
    if ctx.graph.navigation.is_none() {
        return;
    }

    // Tables first, then forms, each in document order.
    let bound: Vec<(NodeId, String)> = ctx
        .graph
        .tables
        .iter()
        .map(|t| (t.node, t.name.clone()))
        .chain(ctx.graph.forms.iter().map(|f| (f.node, f.name.clone())))
        .collect();

    let Some(navigation) = ctx.graph.navigation.as_mut() else {
        return;
    };
    for kind in [NodeKind::Table, NodeKind::Form] {
        for node in tree.nodes_of_kind(kind) {
            let Some((_, member)) = bound.iter().find(|(bound_node, _)| *bound_node == node) else {
                continue;
            };
            let Some(id) = tree.id(node) else {
                continue;
            };
            let Some(item) = tree
                .nearest_ancestor_of_kind(node, NodeKind::SubItem)
                .or_else(|| tree.nearest_ancestor_of_kind(node, NodeKind::Item))
            else {
                continue;
            };
            let Some(item_id) = tree.id(item) else {
                continue;
            };

            if let Some(reference) = navigation
                .item_mut(item_id)
                .and_then(|item| item.reference_mut(id))
            {
                trace!(item = item_id, id, member = %member, "resolved item reference");
                reference.member = Some(member.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::resolve;
    use crate::test_support::*;
    use mbui_core::{BindingDeclaration, ElementKind};

    const VIEW: &str = r#"
<view>
    <vertical-navigation id="nav">
        <item id="a" title="A">
            <metadata address="/x">
                <table id="t1" form-ref="f1"/>
            </metadata>
        </item>
        <item id="b" title="B">
            <metadata address="/x">
                <form id="f1"/>
            </metadata>
        </item>
    </vertical-navigation>
</view>"#;

    fn declarations() -> Vec<BindingDeclaration> {
        vec![
            BindingDeclaration::new("table", ElementKind::Table).with_selector("t1"),
            BindingDeclaration::new("form", ElementKind::Form).with_selector("f1"),
        ]
    }

    #[test]
    fn test_form_ref_and_item_references() {
        let graph = resolve(&view(VIEW), &declarations());

        assert!(graph.is_valid(), "{:?}", graph.diagnostics);
        assert_eq!(graph.table("table").unwrap().form_ref.as_deref(), Some("form"));

        let nav = graph.navigation.as_ref().unwrap();
        let a: Vec<_> = nav.item("a").unwrap().references().collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].member.as_deref(), Some("table"));
        let b: Vec<_> = nav.item("b").unwrap().references().collect();
        assert_eq!(b[0].member.as_deref(), Some("form"));
    }

    #[test]
    fn test_unmatched_form_ref_is_silent() {
        let graph = resolve(&view(VIEW), &declarations()[..1]);

        assert!(graph.is_valid(), "{:?}", graph.diagnostics);
        assert_eq!(graph.table("table").unwrap().form_ref, None);
    }

    #[test]
    fn test_unbound_reference_has_no_member() {
        let graph = resolve(&view(VIEW), &declarations()[1..]);

        let nav = graph.navigation.as_ref().unwrap();
        let reference = nav.item("a").unwrap().references().next().unwrap();
        assert_eq!(reference.id.as_deref(), Some("t1"));
        assert_eq!(reference.member, None);
    }

    #[test]
    fn test_sub_item_is_nearest() {
        let tree = view(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A">
                    <sub-item id="s" title="S">
                        <metadata address="/x"><table id="t"/></metadata>
                    </sub-item>
                </item>
            </vertical-navigation></view>"#,
        );
        let declaration = BindingDeclaration::new("table", ElementKind::Table).with_selector("t");
        let graph = resolve(&tree, &[declaration]);

        let nav = graph.navigation.as_ref().unwrap();
        let sub = nav.item("s").unwrap();
        assert_eq!(sub.references().next().unwrap().member.as_deref(), Some("table"));
        assert!(nav.item("a").unwrap().content.is_empty());
    }
}
