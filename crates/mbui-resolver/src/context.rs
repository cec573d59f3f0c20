//! State shared by the resolution steps of one view.

use std::collections::HashMap;

use mbui_core::{DescriptorTree, NodeId, ResolvedBindingGraph, ValidationError};
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use crate::config::ResolverConfig;

pub(crate) struct ResolveContext<'a> {
    pub tree: &'a DescriptorTree,
    pub config: &'a ResolverConfig,
    pub expression: &'a Regex,
    /// Every node carrying an `id` attribute, grouped by id in document order.
    pub ids: HashMap<&'a str, SmallVec<[NodeId; 1]>>,
    pub graph: ResolvedBindingGraph,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        tree: &'a DescriptorTree,
        config: &'a ResolverConfig,
        expression: &'a Regex,
    ) -> Self {
        let mut ids: HashMap<&'a str, SmallVec<[NodeId; 1]>> = HashMap::new();
        for node in tree.preorder() {
            if let Some(id) = tree.id(node) {
                ids.entry(id).or_default().push(node);
            }
        }

        Self {
            tree,
            config,
            expression,
            ids,
            graph: ResolvedBindingGraph::default(),
        }
    }

    pub fn nodes_with_id(&self, id: &str) -> &[NodeId] {
        self.ids.get(id).map(|nodes| nodes.as_slice()).unwrap_or(&[])
    }

    /// Record a diagnostic and keep going.
    pub fn report(&mut self, error: impl Into<ValidationError>) {
        let error = error.into();
        debug!(category = ?error.category(), "{error}");
        self.graph.diagnostics.push(error);
    }

    pub fn finish(self) -> ResolvedBindingGraph {
        self.graph
    }
}
