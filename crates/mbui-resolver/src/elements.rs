//! Data tables and forms.

use mbui_core::{
    BindingDeclaration, NodeId, NodeKind, ResolvedAttribute, ResolvedColumn, ResolvedForm,
    ResolvedTable, ValidationError,
};
use tracing::debug;

use crate::context::ResolveContext;
use crate::metadata::find_scope;

fn type_parameter(ctx: &ResolveContext<'_>, declaration: &BindingDeclaration) -> String {
    declaration
        .type_parameter
        .clone()
        .unwrap_or_else(|| ctx.config.default_type_parameter.clone())
}

pub(crate) fn process_table(
    ctx: &mut ResolveContext<'_>,
    declaration: &BindingDeclaration,
    node: NodeId,
) {
    let tree = ctx.tree;
    let selector = declaration.selector();
    let metadata = find_scope(ctx, &declaration.name, node);

    let mut columns = Vec::new();
    if let Some(container) = tree.first_child_of_kind(node, NodeKind::Columns) {
        for column in tree.children_of_kind(container, NodeKind::Column) {
            let name = tree.attribute(column, "name");
            let title = tree.attribute(column, "title");
            let value = tree.attribute(column, "value");
            let invalid = |reason: &str| {
                ValidationError::field(
                    format!(
                        "Invalid column \"{}\" in data-table#{selector}: {reason}",
                        tree.start_tag(column)
                    ),
                    column,
                    Some(declaration.name.as_str()),
                )
            };

            if name.is_none() {
                ctx.report(invalid("name is mandatory."));
            }
            if let Some(value) = value {
                if !ctx.expression.is_match(value) {
                    ctx.report(invalid("value has to be an expression."));
                }
                if title.is_none() {
                    ctx.report(invalid("if value is given, title is mandatory."));
                }
            }

            columns.push(ResolvedColumn {
                name: name.map(str::to_string),
                title: title.map(str::to_string),
                value: value.map(str::to_string),
            });
        }
    }

    debug!(name = %declaration.name, selector, columns = columns.len(), "resolved data table");
    let table = ResolvedTable {
        name: declaration.name.clone(),
        selector: selector.to_string(),
        type_parameter: type_parameter(ctx, declaration),
        node,
        metadata,
        columns,
        form_ref: None,
    };
    ctx.graph.tables.push(table);
}

pub(crate) fn process_form(
    ctx: &mut ResolveContext<'_>,
    declaration: &BindingDeclaration,
    node: NodeId,
) {
    let tree = ctx.tree;
    let selector = declaration.selector();
    let metadata = find_scope(ctx, &declaration.name, node);

    let mut attributes = Vec::new();
    if let Some(container) = tree.first_child_of_kind(node, NodeKind::Attributes) {
        for attribute in tree.children_of_kind(container, NodeKind::Attribute) {
            let name = tree.attribute(attribute, "name");
            if name.is_none() {
                ctx.report(ValidationError::field(
                    format!(
                        "Invalid attribute \"{}\" in form#{selector}: name is mandatory.",
                        tree.start_tag(attribute)
                    ),
                    attribute,
                    Some(declaration.name.as_str()),
                ));
            }

            let suggest_handler_templates = tree
                .first_child_of_kind(attribute, NodeKind::SuggestHandler)
                .and_then(|handler| tree.first_child_of_kind(handler, NodeKind::Templates))
                .map(|templates| {
                    tree.children_of_kind(templates, NodeKind::Template)
                        .filter_map(|template| tree.attribute(template, "address"))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            attributes.push(ResolvedAttribute {
                name: name.map(str::to_string),
                suggest_handler_templates,
            });
        }
    }

    debug!(name = %declaration.name, selector, attributes = attributes.len(), "resolved form");
    let form = ResolvedForm {
        name: declaration.name.clone(),
        selector: selector.to_string(),
        type_parameter: type_parameter(ctx, declaration),
        node,
        metadata,
        attributes,
    };
    ctx.graph.forms.push(form);
}
