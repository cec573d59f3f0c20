//! Checking MBUI view descriptors from the command line.
//!
//! Wraps the parser and resolver with file loading, diagnostic rendering and
//! logging setup for the `mbui` binary.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mbui_core::{
    BindingDeclaration, DescriptorTree, MbuiError, NodeKind, ResolvedBindingGraph, ValidationError,
};
use mbui_resolver::{Resolver, ResolverConfig};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` to override. Default is `info` for the mbui crates and
/// `warn` for everything else.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,mbui=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A parsed and resolved view.
#[derive(Debug)]
pub struct Checked {
    pub tree: DescriptorTree,
    pub graph: ResolvedBindingGraph,
}

impl Checked {
    /// The graph, or the diagnostics if there are any.
    pub fn into_graph(self) -> Result<ResolvedBindingGraph, MbuiError> {
        Ok(self.graph.into_result()?)
    }
}

pub fn load_view(path: &Path) -> Result<DescriptorTree> {
    let source = read(path)?;
    let tree = mbui_parser::parse_document(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(nodes = tree.len(), "parsed view");
    Ok(tree)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn load_bindings(path: &Path) -> Result<Vec<BindingDeclaration>> {
    let json = read(path)?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid binding declarations in {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    let Some(path) = path else {
        return Ok(ResolverConfig::default());
    };
    let json = read(path)?;
    ResolverConfig::from_json(&json)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Parse and resolve source text. Only a parse failure is an error here;
/// validation problems stay on the graph next to the tree they point into.
pub fn check_source(
    source: &str,
    declarations: &[BindingDeclaration],
    resolver: &Resolver,
) -> Result<Checked, MbuiError> {
    let tree = mbui_parser::parse_document(source)?;
    debug!(nodes = tree.len(), "parsed view");
    let graph = resolver.resolve(&tree, declarations);
    Ok(Checked { tree, graph })
}

/// Parse and resolve a view file against its binding declarations.
pub fn check(view: &Path, bindings: &Path, config: Option<&Path>) -> Result<Checked> {
    let resolver = Resolver::with_config(load_config(config)?)?;
    let source = read(view)?;
    let declarations = load_bindings(bindings)?;
    info!("Checking {} against {} declarations", view.display(), declarations.len());

    check_source(&source, &declarations, &resolver)
        .with_context(|| format!("Failed to parse {}", view.display()))
}

/// Render diagnostics as `error: <message>` lines, followed by the source
/// location of the offending node when there is one.
pub fn format_diagnostics(
    file: &str,
    tree: &DescriptorTree,
    diagnostics: &[ValidationError],
) -> String {
    let mut out = String::new();
    for error in diagnostics {
        let _ = writeln!(out, "error: {error}");
        if let Some(node) = error.node() {
            let _ = writeln!(out, "  --> {file}:{}", tree.span(node));
        }
    }
    out
}

/// Indented outline of the tree, one node per line.
pub fn outline(tree: &DescriptorTree) -> String {
    let mut out = String::new();
    for id in tree.preorder() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let indent = "  ".repeat(tree.ancestors(id).count());

        if node.kind == NodeKind::Text {
            let text = node.text.as_deref().unwrap_or_default();
            let words: Vec<_> = text.split_whitespace().collect();
            let _ = writeln!(out, "{indent}\"{}\"", words.join(" "));
            continue;
        }

        let _ = write!(out, "{indent}{}", node.name);
        if let Some(element_id) = node.id() {
            let _ = write!(out, "#{element_id}");
        }
        let _ = writeln!(out, " ({})", node.span);
    }
    out
}
