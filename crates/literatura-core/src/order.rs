//! Document order for a whole directory tree.
//!
//! # Overview
//!
//! The orderer walks the [`DirNode`] tree top-down and assembles the document
//! bottom-up. At each non-trivial directory it decomposes the immediate
//! children (using the directory's own `dependencies` as reference lookup),
//! emits every child's section in that order, and only then emits its own
//! section. Deeper, more specific groupings therefore precede the broader
//! groupings containing them.
//!
//! Single-child chains are collapsed, so a document starts at the first
//! directory with two or more children. Leaves emit nothing.
//!
//! The walk uses an explicit stack, so the depth of the input hierarchy
//! does not bound the call stack.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::{Component, decompose};
use crate::model::{Reference, relative};
use crate::tree::DirNode;

// ---------------------------------------------------------------------------
// Output model
// ---------------------------------------------------------------------------

/// Everything one child references from within its parent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Sibling name of the referenced child.
    pub target: String,
    /// Underlying file-level references, sorted.
    pub edges: Vec<Reference>,
}

impl Dependency {
    /// Number of file-level references behind this dependency.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.edges.len()
    }

    /// `true` when a single file-level reference fully explains this
    /// dependency, i.e. both children are the referencing files themselves.
    #[must_use]
    pub fn is_direct(&self, node: &str, context: &str, separator: char) -> bool {
        match self.edges.as_slice() {
            [edge] => {
                relative(context, &edge.tail, separator) == node
                    && relative(context, &edge.head, separator) == self.target
            }
            _ => false,
        }
    }
}

/// One SCC of a directory's children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SccGroup {
    pub nodes: Vec<String>,
    pub is_cyclic: bool,
    /// Outgoing dependencies per node, targets sorted.
    pub references: BTreeMap<String, Vec<Dependency>>,
}

/// One weak component of a directory's children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionComponent {
    pub sccs: Vec<SccGroup>,
}

/// The listing emitted for one non-trivial directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Full path of the directory.
    pub path: String,
    pub components: Vec<SectionComponent>,
}

impl Section {
    /// Child names in emitted order.
    pub fn children(&self) -> impl Iterator<Item = &str> + '_ {
        self.components
            .iter()
            .flat_map(|c| c.sccs.iter())
            .flat_map(|scc| scc.nodes.iter().map(String::as_str))
    }
}

/// A complete ordered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Full path of the highest non-trivial directory; headings are
    /// expressed relative to it.
    pub base: String,
    pub separator: char,
    pub sections: Vec<Section>,
}

impl Report {
    /// Order the whole tree below `root`.
    ///
    /// An empty or trivial tree yields a report without sections.
    #[must_use]
    #[instrument(skip(root))]
    pub fn build(root: &DirNode, separator: char) -> Self {
        let Some(top) = root.highest_non_trivial() else {
            debug!("tree has no non-trivial directory, empty report");
            return Self {
                base: root.full_name.clone(),
                separator,
                sections: Vec::new(),
            };
        };
        Self {
            base: top.full_name.clone(),
            separator,
            sections: order(top),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Heading for `section`, relative to the report base (`.` for the base).
    #[must_use]
    pub fn heading(&self, section: &Section) -> String {
        let rel = relative(&self.base, &section.path, self.separator);
        if rel.is_empty() { ".".to_string() } else { rel }
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

enum Frame<'a> {
    Enter(&'a DirNode),
    Emit(&'a DirNode, Vec<Component>),
}

/// Sections for every non-trivial directory below `node`, children first.
#[must_use]
pub fn order(node: &DirNode) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut stack = vec![Frame::Enter(node)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(dir) => {
                let Some(dir) = dir.highest_non_trivial() else {
                    continue;
                };
                let components = decompose(dir.subnodes.keys(), |child| dir.heads_of(child));
                let children: Vec<&DirNode> = components
                    .iter()
                    .flat_map(Component::members)
                    .filter_map(|name| dir.subnodes.get(name))
                    .collect();
                stack.push(Frame::Emit(dir, components));
                stack.extend(children.into_iter().rev().map(Frame::Enter));
            }
            Frame::Emit(dir, components) => sections.push(section(dir, &components)),
        }
    }

    sections
}

fn section(dir: &DirNode, components: &[Component]) -> Section {
    let components = components
        .iter()
        .map(|component| SectionComponent {
            sccs: component
                .sccs
                .iter()
                .map(|scc| SccGroup {
                    nodes: scc.members.clone(),
                    is_cyclic: scc.cyclic,
                    references: scc
                        .members
                        .iter()
                        .filter_map(|node| {
                            let deps = dependencies_of(dir, node);
                            (!deps.is_empty()).then(|| (node.clone(), deps))
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Section {
        path: dir.full_name.clone(),
        components,
    }
}

fn dependencies_of(dir: &DirNode, node: &str) -> Vec<Dependency> {
    dir.dependencies
        .get(node)
        .map(|heads| {
            heads
                .iter()
                .map(|(target, edges)| {
                    let mut edges = edges.clone();
                    edges.sort();
                    Dependency {
                        target: target.clone(),
                        edges,
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}
