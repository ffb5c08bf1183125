//! # CLI Command Implementations
//!
//! Each command has a `render_*` function that builds its output as a
//! string and a thin `cmd_*` wrapper that prints it.

use super::GraphFormat;
use crate::report::{
    LookupKind, LookupReport, ResolvedBinding, StatsReport, ViewReport, ViewSummary,
};
use bindscope_core::{
    ComponentPath, ComponentView, GlobalGraph, GraphError, Key, SerializableGraph, graph_from_bytes,
    graph_to_bytes,
};
use serde::Serialize;
use std::path::Path;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum graph file size (256 MB).
///
/// Matches the payload limit of the binary format so a text graph cannot
/// be larger than its binary encoding would be allowed to be.
pub const MAX_INPUT_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), GraphError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        GraphError::IoError(format!(
            "Cannot read file metadata for '{}': {}",
            path.display(),
            e
        ))
    })?;

    if metadata.len() > max_size {
        return Err(GraphError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

/// How command output is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    /// Pretty JSON instead of text.
    pub json: bool,
    /// Omit text headers.
    pub quiet: bool,
}

fn to_json<T: Serialize>(report: &T) -> Result<String, GraphError> {
    serde_json::to_string_pretty(report).map_err(|e| GraphError::SerializationError(e.to_string()))
}

fn header(out: &mut String, mode: OutputMode, title: &str) {
    if mode.quiet {
        return;
    }
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push('\n');
}

// =============================================================================
// GRAPH FILES
// =============================================================================

/// Decode a graph from `bytes` in the given format.
pub fn decode_graph(bytes: &[u8], format: GraphFormat) -> Result<GlobalGraph, GraphError> {
    match format {
        GraphFormat::Binary => graph_from_bytes(bytes),
        GraphFormat::Json => {
            let sg: SerializableGraph = serde_json::from_slice(bytes)
                .map_err(|e| GraphError::DeserializationError(format!("Invalid JSON: {}", e)))?;
            GlobalGraph::try_from(sg)
        }
        GraphFormat::Toml => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| GraphError::DeserializationError(format!("Invalid UTF-8: {}", e)))?;
            let sg: SerializableGraph = toml::from_str(text)
                .map_err(|e| GraphError::DeserializationError(format!("Invalid TOML: {}", e)))?;
            GlobalGraph::try_from(sg)
        }
    }
}

/// Encode a graph in the given format.
pub fn encode_graph(graph: &GlobalGraph, format: GraphFormat) -> Result<Vec<u8>, GraphError> {
    match format {
        GraphFormat::Binary => graph_to_bytes(graph),
        GraphFormat::Json => to_json(&SerializableGraph::from(graph)).map(String::into_bytes),
        GraphFormat::Toml => toml::to_string_pretty(&SerializableGraph::from(graph))
            .map(String::into_bytes)
            .map_err(|e| GraphError::SerializationError(e.to_string())),
    }
}

/// Read, size-check and decode a graph file.
pub fn load_graph(path: &Path, format: GraphFormat) -> Result<GlobalGraph, GraphError> {
    validate_file_size(path, MAX_INPUT_FILE_SIZE)?;
    let bytes = std::fs::read(path).map_err(|e| {
        GraphError::IoError(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    let graph = decode_graph(&bytes, format)?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// The view for `path`, reached from the root view through `subgraphs()`.
fn find_view<'r, 'g>(
    root: &'r ComponentView<'g>,
    path: &ComponentPath,
) -> Result<&'r ComponentView<'g>, GraphError> {
    root.find(path)?
        .ok_or_else(|| GraphError::MissingComponentNode { path: path.clone() })
}

// =============================================================================
// TREE COMMAND
// =============================================================================

pub fn render_tree(graph: &GlobalGraph, mode: OutputMode) -> Result<String, GraphError> {
    let root = graph.root_view()?;
    let summary = ViewSummary::collect(&root)?;
    if mode.json {
        return to_json(&summary);
    }

    let mut out = String::new();
    header(&mut out, mode, "Component Tree");
    write_tree(&mut out, &summary, 0);
    Ok(out)
}

fn write_tree(out: &mut String, view: &ViewSummary, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if view.subcomponent { " (subcomponent)" } else { "" };
    out.push_str(&format!("{}{}{}\n", indent, view.path, marker));
    if !view.bindings.is_empty() {
        out.push_str(&format!("{}  bindings: {}\n", indent, view.bindings.join(", ")));
    }
    for child in &view.children {
        write_tree(out, child, depth + 1);
    }
}

pub fn cmd_tree(graph: &GlobalGraph, mode: OutputMode) -> Result<(), GraphError> {
    print!("{}", render_tree(graph, mode)?);
    Ok(())
}

// =============================================================================
// VIEW COMMAND
// =============================================================================

pub fn render_view(graph: &GlobalGraph, mode: OutputMode, path: &str) -> Result<String, GraphError> {
    let path: ComponentPath = path.parse()?;
    let root = graph.root_view()?;
    let report = ViewReport::collect(find_view(&root, &path)?)?;
    if mode.json {
        return to_json(&report);
    }

    let mut out = String::new();
    header(&mut out, mode, &format!("Component View: {}", report.path));
    out.push_str(&format!("Subcomponent:   {}\n", report.subcomponent));
    if !report.real_component {
        out.push_str("Real component: false\n");
    }
    if !report.scopes.is_empty() {
        out.push_str(&format!("Scopes:         {}\n", report.scopes.join(", ")));
    }
    if !report.children.is_empty() {
        out.push_str(&format!("Children:       {}\n", report.children.join(", ")));
    }
    if !report.modules.is_empty() {
        out.push_str(&format!("Modules:        {}\n", report.modules.join(", ")));
    }
    if !report.requirements.is_empty() {
        out.push_str(&format!("Requires:       {}\n", report.requirements.join(", ")));
    }
    if let Some(factory) = &report.factory_method {
        out.push_str(&format!(
            "Factory method: {}({})\n",
            factory.name,
            factory.parameters.join(", ")
        ));
    }
    if report.descriptors.len() > 1 {
        out.push_str(&format!("Descriptors:    {}\n", report.descriptors.join(", ")));
    }

    out.push_str(&format!("\nNodes ({}):\n", report.nodes.len()));
    for n in &report.nodes {
        out.push_str(&format!(
            "  [{}] {:<15} {} @ {}\n",
            n.id, n.kind, n.label, n.owner
        ));
    }

    out.push_str(&format!("\nEdges ({}):\n", report.edges.len()));
    for e in &report.edges {
        match &e.label {
            Some(label) => out.push_str(&format!(
                "  [{}] {} -> {} {} {}\n",
                e.id, e.source, e.target, e.kind, label
            )),
            None => out.push_str(&format!(
                "  [{}] {} -> {} {}\n",
                e.id, e.source, e.target, e.kind
            )),
        }
    }

    if !report.missing.is_empty() {
        out.push_str(&format!("\nMissing: {}\n", report.missing.join(", ")));
    }
    Ok(out)
}

pub fn cmd_view(graph: &GlobalGraph, mode: OutputMode, path: &str) -> Result<(), GraphError> {
    print!("{}", render_view(graph, mode, path)?);
    Ok(())
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Resolve `key` in the view at `path`.
///
/// A contribution lookup fails with `MissingBinding` or `AmbiguousBinding`;
/// a members-injection lookup reports `binding: None` when nothing matches.
pub fn lookup(
    graph: &GlobalGraph,
    path: &str,
    key: Key,
    members_injection: bool,
) -> Result<LookupReport, GraphError> {
    let path: ComponentPath = path.parse()?;
    let root = graph.root_view()?;
    let view = find_view(&root, &path)?;
    let candidates = view.binding_nodes_for(&key);

    let (lookup, binding) = if members_injection {
        let found = view.members_injection_binding(&key)?;
        let node = found.and_then(|b| {
            candidates.iter().find(|n| {
                n.binding
                    .as_members_injection()
                    .is_some_and(|m| std::ptr::eq(m, b))
            })
        });
        (LookupKind::MembersInjection, node)
    } else {
        let found = view.contribution_binding(&key)?;
        let node = candidates.iter().find(|n| {
            n.binding
                .as_contribution()
                .is_some_and(|c| std::ptr::eq(c, found))
        });
        (LookupKind::Contribution, node)
    };

    tracing::debug!(path = %path, key = %key, found = binding.is_some(), "lookup");
    Ok(LookupReport {
        path: path.to_string(),
        key: key.to_string(),
        lookup,
        binding: binding.map(|n| ResolvedBinding::new(n)),
    })
}

pub fn render_lookup(report: &LookupReport, mode: OutputMode) -> Result<String, GraphError> {
    if mode.json {
        return to_json(report);
    }

    let mut out = String::new();
    header(&mut out, mode, &format!("Lookup: {} in {}", report.key, report.path));
    let Some(b) = &report.binding else {
        out.push_str("No members-injection binding\n");
        return Ok(out);
    };
    out.push_str(&format!("Kind:         {}\n", b.kind));
    out.push_str(&format!("Owner:        {}\n", b.owner));
    if let Some(scope) = &b.scope {
        out.push_str(&format!("Scope:        {}\n", scope));
    }
    if let Some(module) = &b.module {
        out.push_str(&format!("Module:       {}\n", module));
    }
    if !b.dependencies.is_empty() {
        out.push_str(&format!("Dependencies: {}\n", b.dependencies.join(", ")));
    }
    if !b.injection_sites.is_empty() {
        out.push_str(&format!("Injects:      {}\n", b.injection_sites.join(", ")));
    }
    Ok(out)
}

pub fn cmd_lookup(
    graph: &GlobalGraph,
    mode: OutputMode,
    path: &str,
    type_name: &str,
    qualifier: Option<String>,
    members_injection: bool,
) -> Result<(), GraphError> {
    let key = match qualifier {
        Some(q) => Key::qualified(q, type_name),
        None => Key::new(type_name),
    };
    let report = lookup(graph, path, key, members_injection)?;
    print!("{}", render_lookup(&report, mode)?);
    Ok(())
}

// =============================================================================
// CONVERT COMMAND
// =============================================================================

pub fn cmd_convert(graph: &GlobalGraph, output: &Path, to: GraphFormat) -> Result<(), GraphError> {
    let bytes = encode_graph(graph, to)?;
    std::fs::write(output, &bytes).map_err(|e| {
        GraphError::IoError(format!("Cannot write '{}': {}", output.display(), e))
    })?;
    tracing::info!(
        output = %output.display(),
        format = ?to,
        bytes = bytes.len(),
        "graph converted"
    );
    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

pub fn render_stats(graph: &GlobalGraph, mode: OutputMode) -> Result<String, GraphError> {
    let report = StatsReport::collect(graph);
    if mode.json {
        return to_json(&report);
    }

    let mut out = String::new();
    header(&mut out, mode, "Graph Statistics");
    out.push_str(&format!("Root:          {}\n", report.root));
    out.push_str(&format!("Full graph:    {}\n", report.full_binding_graph));
    out.push_str(&format!("Nodes:         {}\n", report.node_count));
    for (kind, count) in &report.nodes_by_kind {
        out.push_str(&format!("  {:<28} {}\n", kind, count));
    }
    out.push_str(&format!("Edges:         {}\n", report.edge_count));
    for (kind, count) in &report.edges_by_kind {
        out.push_str(&format!("  {:<28} {}\n", kind, count));
    }
    Ok(out)
}

pub fn cmd_stats(graph: &GlobalGraph, mode: OutputMode) -> Result<(), GraphError> {
    print!("{}", render_stats(graph, mode)?);
    Ok(())
}
