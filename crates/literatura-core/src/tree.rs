//! Directory tree with references bucketed at their lowest common ancestor.
//!
//! # Overview
//!
//! Every endpoint path is split on the path separator and inserted into a
//! tree of [`DirNode`]s, one node per path segment. Each reference is then
//! walked in lockstep from the root: while tail and head agree the walk
//! descends, and at the first differing pair of segments `(t, h)` the
//! reference is stored in the current node under `dependencies[t][h]`.
//!
//! ```text
//! /a/b/x → /a/c/y     stored at /a    under b → c
//! /a/b/z → /a/b/w     stored at /a/b  under z → w
//! ```
//!
//! A reference is stored at exactly one node. All references reaching the
//! same divergence point are kept (no deduplication at this layer), which is
//! what gives directory-level edges their weight.
//!
//! References without a divergent segment pair (a module referencing itself,
//! or a path that is a strict prefix of the other) are dropped.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use crate::model::Reference;
use crate::multimap::{self, NestedMultiMap};

/// One path segment in the directory hierarchy.
///
/// Dropping a tree walks it with an explicit stack, so depth is bounded only
/// by memory.
#[derive(Debug)]
pub struct DirNode {
    /// Last path segment.
    pub name: String,
    /// Full path up to and including this segment.
    pub full_name: String,
    pub subnodes: BTreeMap<String, DirNode>,
    /// `tail segment → head segment → references` diverging at this node.
    pub dependencies: NestedMultiMap<String, String, Reference>,
}

impl DirNode {
    #[must_use]
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            subnodes: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Build the tree for `references`, splitting paths on `separator`.
    ///
    /// The returned root is named after the separator (`"/"` on Unix).
    #[must_use]
    #[instrument(skip(references))]
    pub fn build<'a, I>(references: I, separator: char) -> Self
    where
        I: IntoIterator<Item = &'a Reference>,
    {
        let mut sorted: Vec<&Reference> = references.into_iter().collect();
        sorted.sort_by(|a, b| (&a.tail, &a.head).cmp(&(&b.tail, &b.head)));

        let root_name = separator.to_string();
        let mut root = Self::new(root_name.clone(), root_name);

        let endpoints: BTreeSet<&str> = sorted
            .iter()
            .flat_map(|r| [r.tail.as_str(), r.head.as_str()])
            .collect();
        for path in endpoints {
            let segments: Vec<&str> = path.split(separator).collect();
            root.descend_or_create(&segments, separator);
        }

        let mut dropped = 0usize;
        for reference in sorted {
            let tail: Vec<&str> = reference.tail.split(separator).collect();
            let head: Vec<&str> = reference.head.split(separator).collect();
            let Some(fork) = tail.iter().zip(&head).position(|(t, h)| t != h) else {
                debug!(tail = %reference.tail, head = %reference.head, "reference has no divergent segment, dropped");
                dropped += 1;
                continue;
            };
            let node = root.descend_or_create(&tail[..fork], separator);
            multimap::push_nested(
                &mut node.dependencies,
                tail[fork].to_string(),
                head[fork].to_string(),
                reference.clone(),
            );
        }

        debug!(dropped, "directory tree built");
        root
    }

    /// Walk `segments` from `self`, creating missing nodes on the way.
    fn descend_or_create(&mut self, segments: &[&str], separator: char) -> &mut Self {
        let mut current = self;
        for (depth, segment) in segments.iter().enumerate() {
            current = current
                .subnodes
                .entry((*segment).to_string())
                .or_insert_with(|| Self::new(*segment, join_prefix(&segments[..=depth], separator)));
        }
        current
    }

    /// A node with zero or one subnode has no structure of its own.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.subnodes.len() <= 1
    }

    /// Descend through single-child chains to the first node with two or
    /// more children. Returns `None` when the chain ends in a leaf.
    #[must_use]
    pub fn highest_non_trivial(&self) -> Option<&Self> {
        let mut current = self;
        loop {
            match current.subnodes.len() {
                0 => return None,
                1 => current = current.subnodes.values().next()?,
                _ => return Some(current),
            }
        }
    }

    /// Look up the node for `path` (split on `separator`) below this root.
    #[must_use]
    pub fn find(&self, path: &str, separator: char) -> Option<&Self> {
        path.split(separator)
            .try_fold(self, |node, segment| node.subnodes.get(segment))
    }

    /// References stored under `tail → head`.
    #[must_use]
    pub fn references_between(&self, tail: &str, head: &str) -> &[Reference] {
        self.dependencies
            .get(tail)
            .and_then(|heads| heads.get(head))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of underlying references collapsed into `tail → head`.
    #[must_use]
    pub fn weight(&self, tail: &str, head: &str) -> usize {
        self.references_between(tail, head).len()
    }

    /// Heads referenced from the child `tail`, sorted.
    pub fn heads_of<'a>(&'a self, tail: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.dependencies
            .get(tail)
            .into_iter()
            .flat_map(|heads| heads.keys().map(String::as_str))
    }
}

impl Drop for DirNode {
    fn drop(&mut self) {
        let mut stack: Vec<Self> = std::mem::take(&mut self.subnodes).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.subnodes).into_values());
        }
    }
}

fn join_prefix(segments: &[&str], separator: char) -> String {
    let joined = segments.join(&separator.to_string());
    if joined.is_empty() {
        separator.to_string()
    } else {
        joined
    }
}
