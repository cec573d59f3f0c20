//! Shape of the document root.

use mbui_core::{NodeKind, ValidationError};

use crate::context::ResolveContext;

/// The root must be `<view/>` with exactly one `<vertical-navigation/>` or
/// `<metadata/>` child. Each malformed shape yields one error.
pub(crate) fn validate_structure(ctx: &mut ResolveContext<'_>) {
    let tree = ctx.tree;
    let Some(root) = tree.root() else {
        ctx.report(ValidationError::structural("No root element found in MBUI XML.", None));
        return;
    };

    if tree.kind(root) != NodeKind::View {
        let found = tree.node(root).map(|n| n.name.clone()).unwrap_or_default();
        ctx.report(ValidationError::structural(
            format!("Invalid root element in MBUI XML. Allowed: \"view\", found: \"{found}\"."),
            Some(root),
        ));
        return;
    }

    let children: Vec<_> = tree.element_children(root).collect();
    match children.as_slice() {
        [] => ctx.report(ValidationError::structural(
            "No children found in MBUI XML.",
            Some(root),
        )),
        [child] => {
            let kind = tree.kind(*child);
            if !matches!(kind, NodeKind::VerticalNavigation | NodeKind::Metadata) {
                let found = tree.node(*child).map(|n| n.name.clone()).unwrap_or_default();
                ctx.report(ValidationError::structural(
                    format!(
                        "Invalid child of root element in MBUI XML. \
                         Allowed: \"vertical-navigation\" or \"metadata\", found: \"{found}\"."
                    ),
                    Some(*child),
                ));
            }
        }
        [_, second, ..] => ctx.report(ValidationError::structural(
            "Only one child allowed in MBUI XML.",
            Some(*second),
        )),
    }
}
