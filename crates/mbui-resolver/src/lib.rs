//! Selector, scope and cross-reference resolution for MBUI views.
//!
//! This crate resolves:
//! - Binding declarations to the descriptor nodes they select
//! - Tables and forms to their metadata scope
//! - Navigation items and their embedded table/form references
//! - Table to form links
//!
//! Problems are collected as diagnostics on the returned graph instead of
//! stopping at the first one, so a single pass reports everything wrong
//! with a view.

mod config;
mod context;
mod elements;
mod metadata;
mod navigation;
mod references;
mod selectors;
mod structure;

pub use config::{
    ConfigError, ResolverConfig, DEFAULT_EXPRESSION_PATTERN, DEFAULT_TYPE_PARAMETER,
};

use mbui_core::{BindingDeclaration, DescriptorTree, ElementKind, ResolvedBindingGraph};
use regex::Regex;
use tracing::{debug, instrument};

use context::ResolveContext;

/// Resolve a view with the default configuration.
pub fn resolve(tree: &DescriptorTree, declarations: &[BindingDeclaration]) -> ResolvedBindingGraph {
    Resolver::default().resolve(tree, declarations)
}

/// Resolves descriptor trees against binding declarations.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
    expression: Regex,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            config: ResolverConfig::default(),
            expression: config::DEFAULT_EXPRESSION.clone(),
        }
    }
}

impl Resolver {
    pub fn with_config(config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let expression = config.expression()?;
        Ok(Self { config, expression })
    }

    /// Resolve one view.
    ///
    /// Always returns a graph. It may be partial; check
    /// [`ResolvedBindingGraph::is_valid`] before emitting code from it.
    #[instrument(skip_all, fields(nodes = tree.len(), declarations = declarations.len()))]
    pub fn resolve(
        &self,
        tree: &DescriptorTree,
        declarations: &[BindingDeclaration],
    ) -> ResolvedBindingGraph {
        let mut ctx = ResolveContext::new(tree, &self.config, &self.expression);

        structure::validate_structure(&mut ctx);
        metadata::register_metadata(&mut ctx);
        debug!(scopes = ctx.graph.metadata.len(), "registered metadata");

        for declaration in declarations {
            let Some(node) = selectors::resolve_selector(&mut ctx, declaration) else {
                continue;
            };
            match declaration.kind {
                ElementKind::VerticalNavigation => {
                    navigation::process_navigation(&mut ctx, declaration, node)
                }
                ElementKind::Table => elements::process_table(&mut ctx, declaration, node),
                ElementKind::Form => elements::process_form(&mut ctx, declaration, node),
            }
        }

        navigation::process_unbound_navigation(&mut ctx);
        references::resolve_cross_references(&mut ctx);

        let graph = ctx.finish();
        debug!(
            tables = graph.tables.len(),
            forms = graph.forms.len(),
            diagnostics = graph.diagnostics.len(),
            "resolved view"
        );
        graph
    }
}
