//! Vertical navigation: items, sub items and their content.

use mbui_core::{
    BindingDeclaration, ContentReference, ContentSegment, DescriptorTree, NodeId, NodeKind,
    ResolvedItem, ResolvedNavigation, ValidationError,
};
use tracing::{debug, warn};

use crate::context::ResolveContext;

pub(crate) fn process_navigation(
    ctx: &mut ResolveContext<'_>,
    declaration: &BindingDeclaration,
    node: NodeId,
) {
    if let Some(existing) = &ctx.graph.navigation {
        let existing = existing.name.clone().unwrap_or_default();
        warn!(%existing, ignored = %declaration.name, "second vertical navigation binding");
        let message = format!(
            "Only one vertical navigation can be bound per view, '{existing}' is already bound."
        );
        ctx.report(ValidationError::structural(message, Some(node)));
        return;
    }
    build_navigation(ctx, Some(declaration.name.as_str()), node);
}

/// Items of a navigation no declaration binds still take part in validation
/// and reference resolution.
pub(crate) fn process_unbound_navigation(ctx: &mut ResolveContext<'_>) {
    if ctx.graph.navigation.is_some() {
        return;
    }
    if let Some(node) = ctx.tree.nodes_of_kind(NodeKind::VerticalNavigation).next() {
        debug!("vertical navigation without binding");
        build_navigation(ctx, None, node);
    }
}

fn build_navigation(ctx: &mut ResolveContext<'_>, name: Option<&str>, node: NodeId) {
    let tree = ctx.tree;
    let items = tree
        .children_of_kind(node, NodeKind::Item)
        .map(|item| create_item(ctx, name, item))
        .collect::<Vec<_>>();
    debug!(name = ?name, items = items.len(), "resolved vertical navigation");

    ctx.graph.navigation = Some(ResolvedNavigation {
        name: name.map(str::to_string),
        id: tree.id(node).map(str::to_string),
        node,
        items,
    });
}

/// An item whose sub items are still being built.
struct PendingItem {
    item: ResolvedItem,
    level: usize,
    /// Sub item nodes not yet visited, last in document order first.
    pending: Vec<NodeId>,
}

impl PendingItem {
    fn start(
        ctx: &mut ResolveContext<'_>,
        declaration: Option<&str>,
        node: NodeId,
        level: usize,
    ) -> Self {
        let tree = ctx.tree;
        let id = tree.id(node).map(str::to_string);
        let title = tree.attribute(node, "title").map(str::to_string);
        let icon = tree.attribute(node, "icon").map(str::to_string);

        for (attribute, value) in [("id", &id), ("title", &title)] {
            if value.is_none() {
                ctx.report(ValidationError::field(
                    format!(
                        "Invalid item \"{}\" in vertical-navigation: {attribute} is mandatory.",
                        tree.start_tag(node)
                    ),
                    node,
                    declaration,
                ));
            }
        }

        let mut pending: Vec<_> = tree.children_of_kind(node, NodeKind::SubItem).collect();
        let content = if pending.is_empty() {
            segment_content(tree, content_root(tree, node))
        } else {
            if level > 0 {
                ctx.report(ValidationError::field(
                    "Invalid nesting in vertical-navigation: sub items cannot have sub items.",
                    node,
                    declaration,
                ));
            }
            Vec::new()
        };
        pending.reverse();

        Self {
            item: ResolvedItem {
                id,
                title,
                icon,
                node,
                sub_items: Vec::new(),
                content,
            },
            level,
            pending,
        }
    }
}

/// Build an item and its sub items depth first, without recursion.
fn create_item(
    ctx: &mut ResolveContext<'_>,
    declaration: Option<&str>,
    node: NodeId,
) -> ResolvedItem {
    let mut current = PendingItem::start(ctx, declaration, node, 0);
    let mut parents: Vec<PendingItem> = Vec::new();

    loop {
        if let Some(sub) = current.pending.pop() {
            let child = PendingItem::start(ctx, declaration, sub, current.level + 1);
            parents.push(std::mem::replace(&mut current, child));
            continue;
        }
        match parents.pop() {
            Some(mut parent) => {
                parent.item.sub_items.push(current.item);
                current = parent;
            }
            None => return current.item,
        }
    }
}

/// Content lives in the item's `<metadata/>` child if it has one.
fn content_root(tree: &DescriptorTree, item: NodeId) -> NodeId {
    tree.first_child_of_kind(item, NodeKind::Metadata).unwrap_or(item)
}

/// Split content into coalesced markup runs and table/form references.
pub(crate) fn segment_content(tree: &DescriptorTree, node: NodeId) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut markup = String::new();

    for child in tree.element_children(node) {
        if tree.kind(child).is_embeddable() {
            if !markup.is_empty() {
                segments.push(ContentSegment::Markup(std::mem::take(&mut markup)));
            }
            segments.push(ContentSegment::Reference(ContentReference {
                id: tree.id(child).map(str::to_string),
                member: None,
            }));
        } else {
            markup.push_str(&tree.to_markup(child));
        }
    }
    if !markup.is_empty() {
        segments.push(ContentSegment::Markup(markup));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;
    use crate::test_support::*;
    use mbui_core::{ElementKind, ErrorCategory};

    fn navigation(xml: &str) -> mbui_core::ResolvedBindingGraph {
        let declaration = BindingDeclaration::new("navigation", ElementKind::VerticalNavigation)
            .with_selector("nav");
        resolve(&view(xml), &[declaration])
    }

    #[test]
    fn test_item_without_id_and_title() {
        let graph = navigation(
            r#"<view><vertical-navigation id="nav"><item><p/></item></vertical-navigation></view>"#,
        );

        let messages: Vec<_> = errors_of(&graph, ErrorCategory::Field)
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Invalid item \"<item>\" in vertical-navigation: id is mandatory.",
                "Invalid item \"<item>\" in vertical-navigation: title is mandatory.",
            ]
        );
        assert_eq!(graph.diagnostics[0].declaration(), Some("navigation"));
    }

    #[test]
    fn test_nested_sub_items() {
        let graph = navigation(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A">
                    <sub-item id="b" title="B">
                        <sub-item id="c" title="C"><p/></sub-item>
                    </sub-item>
                </item>
            </vertical-navigation></view>"#,
        );

        let fields = errors_of(&graph, ErrorCategory::Field);
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[0].to_string(),
            "Invalid nesting in vertical-navigation: sub items cannot have sub items."
        );
        // Nested entries are still built.
        let nav = graph.navigation.as_ref().unwrap();
        assert!(nav.item("c").is_some());
    }

    #[test]
    fn test_content_is_coalesced() {
        let graph = navigation(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A" icon="pficon pficon-settings">
                    <h1>Mail</h1>
                    <p>Sessions   and servers.</p>
                    <table id="t"/>
                    <form id="f"/>
                    <p>Footer</p>
                </item>
            </vertical-navigation></view>"#,
        );

        let nav = graph.navigation.as_ref().unwrap();
        assert_eq!(nav.name.as_deref(), Some("navigation"));
        assert_eq!(nav.id.as_deref(), Some("nav"));
        let item = nav.item("a").unwrap();
        assert_eq!(item.icon.as_deref(), Some("pficon pficon-settings"));
        insta::assert_debug_snapshot!(item.content, @r###"
        [
            Markup(
                "<h1>Mail</h1><p>Sessions and servers.</p>",
            ),
            Reference(
                ContentReference {
                    id: Some(
                        "t",
                    ),
                    member: None,
                },
            ),
            Reference(
                ContentReference {
                    id: Some(
                        "f",
                    ),
                    member: None,
                },
            ),
            Markup(
                "<p>Footer</p>",
            ),
        ]
        "###);
    }

    #[test]
    fn test_metadata_is_content_root() {
        let tree = view(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A"><metadata address="/x"><p>Inside</p></metadata></item>
            </vertical-navigation></view>"#,
        );
        let item = tree.find_by_id("a")[0];
        let root = content_root(&tree, item);

        assert_eq!(tree.kind(root), NodeKind::Metadata);
        assert_eq!(
            segment_content(&tree, root),
            vec![ContentSegment::Markup("<p>Inside</p>".to_string())]
        );
    }

    #[test]
    fn test_second_navigation_binding() {
        let tree = view(
            r#"<view><vertical-navigation id="nav">
                <item id="a" title="A"/>
            </vertical-navigation></view>"#,
        );
        let declarations = vec![
            BindingDeclaration::new("first", ElementKind::VerticalNavigation).with_selector("nav"),
            BindingDeclaration::new("second", ElementKind::VerticalNavigation).with_selector("nav"),
        ];
        let graph = resolve(&tree, &declarations);

        let structural = errors_of(&graph, ErrorCategory::Structural);
        assert_eq!(structural.len(), 1);
        assert!(structural[0].to_string().contains("'first' is already bound"));
        assert_eq!(graph.navigation.unwrap().name.as_deref(), Some("first"));
    }

    #[test]
    fn test_unbound_navigation_is_validated() {
        let graph = resolve(
            &view(
                r#"<view><vertical-navigation id="nav">
                    <item id="a"/>
                </vertical-navigation></view>"#,
            ),
            &[],
        );

        let nav = graph.navigation.as_ref().unwrap();
        assert_eq!(nav.name, None);
        assert_eq!(nav.items.len(), 1);
        assert_eq!(errors_of(&graph, ErrorCategory::Field).len(), 1);
    }

    #[test]
    fn test_deep_sub_item_chain() {
        use indexmap::IndexMap;
        use mbui_core::Span;

        let attrs = |id: &str| {
            let mut attrs = IndexMap::new();
            attrs.insert("id".to_string(), id.to_string());
            attrs.insert("title".to_string(), id.to_uppercase());
            attrs
        };

        let mut tree = DescriptorTree::new();
        let root = tree.add_element(None, "view", IndexMap::new(), Span::default());
        let nav =
            tree.add_element(Some(root), "vertical-navigation", attrs("nav"), Span::default());
        let mut parent = tree.add_element(Some(nav), "item", attrs("item"), Span::default());
        for depth in 0..20_000 {
            let id = format!("s{depth}");
            parent = tree.add_element(Some(parent), "sub-item", attrs(&id), Span::default());
        }

        let graph = resolve(&tree, &[]);

        // Every sub item except the innermost one has a sub item child.
        assert_eq!(errors_of(&graph, ErrorCategory::Field).len(), 19_999);
        let nav = graph.navigation.as_ref().unwrap();
        assert!(nav.item("s19999").is_some());
        assert_eq!(nav.items[0].sub_items[0].id.as_deref(), Some("s0"));
    }
}
