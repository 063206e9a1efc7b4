//! Per-entry diagram view.
//!
//! For every requested entry directory, the references whose lowest common
//! ancestor is exactly that directory are collapsed onto the entry's
//! immediate children (`src/a.js → lib/b.js` becomes `src/ → lib/`) and
//! counted. The children are then decomposed and listed with a
//! component-nested index and a reference diagram, followed by the weighted
//! child-level edges:
//!
//! ```text
//! /repo
//! ┌>:1:    bin/
//! └@:2:    src/
//!   2    bin/    src/
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::{MAIN_SEPARATOR, Path};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::diagram::{self, DrawOptions};
use crate::format::{FormatArgs, Template};
use crate::graph::{Component, decompose};
use crate::model::{ModuleGraph, relative, resolve};
use crate::multimap::{self, NestedCounts};

/// One child line of an entry, aligned with its diagram row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryNode {
    /// Child name relative to the entry; directories end with a separator.
    pub path: String,
    pub glyphs: String,
    /// Number of distinct children this child references.
    pub reference_count: usize,
    /// Component-nested index `ci:scci:ni`.
    pub cni: String,
}

/// One weighted child-level edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryEdge {
    pub src: String,
    pub dst: String,
    pub weight: usize,
}

/// Everything printed for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    /// Resolved entry path.
    pub entry: String,
    pub nodes: Vec<EntryNode>,
    pub edges: Vec<EntryEdge>,
}

/// Templates and switches for [`render_entries`].
#[derive(Debug, Clone)]
pub struct EntriesOptions {
    pub node: Template,
    pub edge: Template,
    pub color: bool,
}

/// Build the view for each entry, in the order given.
///
/// Entries are resolved against `base_dir`. An entry no reference forks at
/// gets an empty view.
#[must_use]
#[instrument(skip(graph, entries))]
pub fn entry_views<S: AsRef<str>>(
    graph: &ModuleGraph,
    base_dir: &Path,
    entries: &[S],
    color: bool,
) -> Vec<EntryView> {
    let resolved: Vec<String> = entries
        .iter()
        .map(|entry| resolve(base_dir, entry.as_ref()))
        .collect();
    let wanted: BTreeSet<&str> = resolved.iter().map(String::as_str).collect();

    let mut dirs: BTreeMap<String, NestedCounts<String, String>> = BTreeMap::new();
    for reference in graph.references() {
        let lca = lowest_common_ancestor(&reference.tail, &reference.head, MAIN_SEPARATOR);
        if !wanted.contains(lca.as_str()) {
            continue;
        }
        let src = highest_component(&lca, &reference.tail, MAIN_SEPARATOR);
        let dst = highest_component(&lca, &reference.head, MAIN_SEPARATOR);
        if src.is_empty() || dst.is_empty() || src == dst {
            debug!(tail = %reference.tail, head = %reference.head, "reference does not fork below entry, skipped");
            continue;
        }
        multimap::count_nested(dirs.entry(lca).or_default(), src, dst);
    }

    resolved
        .into_iter()
        .map(|entry| {
            let counts = dirs.remove(&entry).unwrap_or_default();
            view(entry, &counts, color)
        })
        .collect()
}

fn view(entry: String, counts: &NestedCounts<String, String>, color: bool) -> EntryView {
    let refs_of = |node: &str| {
        counts
            .get(node)
            .into_iter()
            .flat_map(|heads| heads.keys().map(String::as_str))
    };
    let nodes: BTreeSet<&str> = counts
        .iter()
        .flat_map(|(src, dsts)| std::iter::once(src.as_str()).chain(dsts.keys().map(String::as_str)))
        .collect();

    let components = decompose(&nodes, refs_of);
    let order: Vec<&str> = components.iter().flat_map(Component::members).collect();
    let glyphs = diagram::draw_with(&order, refs_of, DrawOptions { color });
    let indices = component_nested_indices(&components);

    let nodes = order
        .iter()
        .zip(glyphs)
        .zip(indices)
        .map(|((path, glyphs), cni)| EntryNode {
            path: (*path).to_string(),
            glyphs,
            reference_count: counts.get(*path).map_or(0, BTreeMap::len),
            cni,
        })
        .collect();
    let edges = counts
        .iter()
        .flat_map(|(src, dsts)| {
            dsts.iter().map(move |(dst, weight)| EntryEdge {
                src: src.clone(),
                dst: dst.clone(),
                weight: *weight,
            })
        })
        .collect();

    EntryView { entry, nodes, edges }
}

/// Print every entry view: the entry path, then node lines, then edge lines.
///
/// # Errors
///
/// Returns any error from writing to `w`.
pub fn render_entries<S: AsRef<str>>(
    graph: &ModuleGraph,
    base_dir: &Path,
    entries: &[S],
    options: &EntriesOptions,
    w: &mut dyn Write,
) -> io::Result<()> {
    for view in entry_views(graph, base_dir, entries, options.color) {
        writeln!(w, "{}", view.entry)?;
        for node in &view.nodes {
            let args = FormatArgs {
                src: Some(&node.path),
                cni: Some(&node.cni),
                glyphs: Some(&node.glyphs),
                ..FormatArgs::default()
            };
            writeln!(w, "{}", options.node.render(&args))?;
        }
        for edge in &view.edges {
            let args = FormatArgs {
                src: Some(&edge.src),
                dst: Some(&edge.dst),
                weight: Some(edge.weight),
                ..FormatArgs::default()
            };
            writeln!(w, "{}", options.edge.render(&args))?;
        }
    }
    Ok(())
}

/// `ci:scci:ni` for every node, in emitted order.
///
/// A level is blank when no group at that level has more than one element,
/// and blank for singleton groups otherwise. Indices are 1-based and
/// left-padded to the width of the largest group size.
#[must_use]
pub fn component_nested_indices(components: &[Component]) -> Vec<String> {
    let max_components = components.len();
    let max_sccs = components.iter().map(|c| c.sccs.len()).max().unwrap_or(0);
    let max_nodes = components
        .iter()
        .flat_map(|c| c.sccs.iter().map(|scc| scc.members.len()))
        .max()
        .unwrap_or(0);

    let mut out = Vec::new();
    for (ci, component) in components.iter().enumerate() {
        let fci = format_index(components.len(), ci + 1, max_components);
        for (scci, scc) in component.sccs.iter().enumerate() {
            let fscci = format_index(component.sccs.len(), scci + 1, max_sccs);
            for ni in 0..scc.members.len() {
                let fni = format_index(scc.members.len(), ni + 1, max_nodes);
                out.push(format!("{fci}:{fscci}:{fni}"));
            }
        }
    }
    out
}

fn format_index(group_len: usize, index: usize, max_len: usize) -> String {
    if max_len <= 1 {
        return String::new();
    }
    let width = max_len.to_string().len();
    let value = if group_len == 1 {
        String::new()
    } else {
        index.to_string()
    };
    format!("{value:>width$}")
}

/// Deepest directory shared by `tail` and `head`; the separator for none.
fn lowest_common_ancestor(tail: &str, head: &str, separator: char) -> String {
    let tail: Vec<&str> = tail.split(separator).collect();
    let common = tail
        .iter()
        .zip(head.split(separator))
        .take_while(|(t, h)| **t == *h)
        .count();
    let joined = tail[..common].join(&separator.to_string());
    if joined.is_empty() {
        separator.to_string()
    } else {
        joined
    }
}

/// First segment of `child` below `base`, keeping a trailing separator
/// when more segments follow.
fn highest_component(base: &str, child: &str, separator: char) -> String {
    let rel = relative(base, child, separator);
    match rel.find(separator) {
        Some(i) => rel[..=i].to_string(),
        None => rel,
    }
}
