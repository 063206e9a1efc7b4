//! Module references and the in-memory module graph.
//!
//! A [`ModuleGraph`] maps every referencing module (tail) to the modules it
//! references (heads). Paths are absolute, separator-joined strings; relative
//! input is resolved against an explicit base directory at ingestion time so
//! the engine never consults the process working directory.
//!
//! Raw input is validated here. Anything that reaches [`crate::tree`] or
//! [`crate::graph`] is a well-formed, non-empty path.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::IngestError;
use crate::multimap;

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// A directed "tail references head" edge between two modules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub tail: String,
    pub head: String,
    /// The reference is exercised at runtime, not only for type checking.
    #[serde(default)]
    pub is_runtime: bool,
}

impl Reference {
    #[must_use]
    pub fn new(tail: impl Into<String>, head: impl Into<String>, is_runtime: bool) -> Self {
        Self {
            tail: tail.into(),
            head: head.into(),
            is_runtime,
        }
    }
}

/// Per-reference attributes stored in a [`ModuleGraph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefAttrs {
    pub is_runtime: bool,
}

// ---------------------------------------------------------------------------
// ModuleGraph
// ---------------------------------------------------------------------------

/// Deterministic adjacency map `tail → head → attrs`.
///
/// Modules without outgoing references are kept as keys with an empty map,
/// so the store can round-trip them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleGraph {
    refs: BTreeMap<String, BTreeMap<String, RefAttrs>>,
}

impl ModuleGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module with no references (no-op if already present).
    pub fn add_node(&mut self, path: impl Into<String>) {
        self.refs.entry(path.into()).or_default();
    }

    /// Register `tail → head`. A reference seen once at runtime stays a
    /// runtime reference.
    pub fn add_reference(&mut self, tail: impl Into<String>, head: impl Into<String>, is_runtime: bool) {
        let attrs = multimap::nested_entry(&mut self.refs, tail.into())
            .entry(head.into())
            .or_default();
        attrs.is_runtime |= is_runtime;
    }

    /// Raw adjacency map.
    #[must_use]
    pub const fn adjacency(&self) -> &BTreeMap<String, BTreeMap<String, RefAttrs>> {
        &self.refs
    }

    /// All references sorted by tail, then head.
    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        multimap::flatten(&self.refs).into_iter().map(|(tail, head)| {
            let is_runtime = self.refs[tail][head].is_runtime;
            Reference::new(tail.clone(), head.clone(), is_runtime)
        })
    }

    /// Heads referenced by `tail`, sorted.
    pub fn refs_of<'a>(&'a self, tail: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.refs
            .get(tail)
            .into_iter()
            .flat_map(|heads| heads.keys().map(String::as_str))
    }

    /// A copy keeping only runtime references (every key is kept).
    #[must_use]
    pub fn runtime_only(&self) -> Self {
        let refs = self
            .refs
            .iter()
            .map(|(tail, heads)| {
                let kept = heads
                    .iter()
                    .filter(|(_, attrs)| attrs.is_runtime)
                    .map(|(head, attrs)| (head.clone(), *attrs))
                    .collect();
                (tail.clone(), kept)
            })
            .collect();
        Self { refs }
    }

    /// Number of modules registered as tails.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.refs.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Parse a tab-separated edge list: `tail<TAB>head[<TAB>runtime|type]`.
    ///
    /// Blank lines and lines starting with `#` are skipped. Relative paths
    /// are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MalformedInput`] for lines without a head, with
    /// empty endpoints, or with an unknown reference kind.
    #[instrument(skip(text))]
    pub fn from_edge_list(text: &str, base_dir: &Path) -> Result<Self, IngestError> {
        let mut graph = Self::new();
        for (index, line) in text.lines().enumerate() {
            let entry = index + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let tail = fields.next().unwrap_or_default();
            let Some(head) = fields.next() else {
                return Err(IngestError::malformed(entry, "expected `tail<TAB>head`"));
            };
            let is_runtime = match fields.next().map(str::trim) {
                None | Some("" | "runtime" | "true" | "1") => true,
                Some("type" | "false" | "0") => false,
                Some(other) => {
                    return Err(IngestError::malformed(
                        entry,
                        format!("unknown reference kind `{other}`"),
                    ));
                }
            };
            let tail = validate_endpoint(entry, "tail", tail, base_dir)?;
            let head = validate_endpoint(entry, "head", head, base_dir)?;
            graph.add_reference(tail, head, is_runtime);
        }
        debug!(
            nodes = graph.node_count(),
            references = graph.reference_count(),
            "parsed edge list"
        );
        Ok(graph)
    }

    /// Parse a JSON array of edges.
    ///
    /// Each entry is `[tail, head]`, `[tail, head, is_runtime]`,
    /// `{"tail": .., "head": .., "runtime": ..}` or `{"v": .., "w": ..}`.
    /// A missing runtime flag means runtime.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] when the document is not an array or an entry
    /// has non-string or empty endpoints.
    pub fn from_json(value: &Value, base_dir: &Path) -> Result<Self, IngestError> {
        let Value::Array(entries) = value else {
            return Err(IngestError::NotAnArray(json_kind(value).to_string()));
        };
        let mut graph = Self::new();
        for (index, raw) in entries.iter().enumerate() {
            let entry = index + 1;
            let (tail, head, runtime) = match raw {
                Value::Array(items) => (items.first(), items.get(1), items.get(2)),
                Value::Object(map) => (
                    map.get("tail").or_else(|| map.get("v")),
                    map.get("head").or_else(|| map.get("w")),
                    map.get("runtime"),
                ),
                other => {
                    return Err(IngestError::malformed(
                        entry,
                        format!("expected array or object, got {}", json_kind(other)),
                    ));
                }
            };
            let tail = json_endpoint(entry, "tail", tail, base_dir)?;
            let head = json_endpoint(entry, "head", head, base_dir)?;
            let is_runtime = match runtime {
                None | Some(Value::Null) => true,
                Some(Value::Bool(flag)) => *flag,
                Some(other) => {
                    return Err(IngestError::malformed(
                        entry,
                        format!("runtime flag must be a boolean, got {}", json_kind(other)),
                    ));
                }
            };
            graph.add_reference(tail, head, is_runtime);
        }
        Ok(graph)
    }
}

impl FromIterator<Reference> for ModuleGraph {
    fn from_iter<T: IntoIterator<Item = Reference>>(iter: T) -> Self {
        let mut graph = Self::new();
        for reference in iter {
            graph.add_reference(reference.tail, reference.head, reference.is_runtime);
        }
        graph
    }
}

fn json_endpoint(
    entry: usize,
    role: &str,
    value: Option<&Value>,
    base_dir: &Path,
) -> Result<String, IngestError> {
    match value {
        Some(Value::String(path)) => validate_endpoint(entry, role, path, base_dir),
        Some(other) => Err(IngestError::malformed(
            entry,
            format!("{role} must be a string, got {}", json_kind(other)),
        )),
        None => Err(IngestError::malformed(entry, format!("missing {role}"))),
    }
}

fn validate_endpoint(
    entry: usize,
    role: &str,
    raw: &str,
    base_dir: &Path,
) -> Result<String, IngestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IngestError::malformed(entry, format!("empty {role} path")));
    }
    if trimmed.contains('\0') {
        return Err(IngestError::malformed(entry, format!("{role} path contains NUL")));
    }
    Ok(resolve(base_dir, trimmed))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Resolve `path` against `base`, normalising `.` and `..` lexically.
#[must_use]
pub fn resolve(base: &Path, path: &str) -> String {
    let joined = base.join(path);
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().into_owned()
}

/// Express `path` relative to `base`, both split on `separator`.
///
/// Returns an empty string when the two are equal and climbs with `..`
/// when `path` lies outside `base`.
#[must_use]
pub fn relative(base: &str, path: &str, separator: char) -> String {
    let base_parts: Vec<&str> = base.split(separator).filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split(separator).filter(|s| !s.is_empty()).collect();
    let common = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let sep = separator.to_string();
    std::iter::repeat_n("..", base_parts.len() - common)
        .chain(path_parts[common..].iter().copied())
        .collect::<Vec<_>>()
        .join(&sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PathBuf {
        PathBuf::from("/repo")
    }

    #[test]
    fn edge_list_resolves_relative_paths() {
        let graph = ModuleGraph::from_edge_list("src/a.js\tsrc/b.js\n", &base()).expect("parse");
        let refs: Vec<Reference> = graph.references().collect();
        assert_eq!(refs, vec![Reference::new("/repo/src/a.js", "/repo/src/b.js", true)]);
    }

    #[test]
    fn edge_list_reads_reference_kind_and_skips_comments() {
        let text = "# header\n\n/x/a\t/x/b\ttype\n/x/a\t/x/c\truntime\n";
        let graph = ModuleGraph::from_edge_list(text, &base()).expect("parse");
        assert_eq!(graph.reference_count(), 2);
        assert!(!graph.adjacency()["/x/a"]["/x/b"].is_runtime);
        assert!(graph.adjacency()["/x/a"]["/x/c"].is_runtime);
    }

    #[test]
    fn edge_list_rejects_missing_head() {
        let err = ModuleGraph::from_edge_list("/x/a\n", &base()).expect_err("should fail");
        assert!(matches!(err, IngestError::MalformedInput { entry: 1, .. }));
    }

    #[test]
    fn malformed_entry_is_source_position() {
        let err = ModuleGraph::from_edge_list("# h\n\n/x/a\t/x/b\n/x/c\n", &base())
            .expect_err("line 4 has no head");
        assert!(matches!(err, IngestError::MalformedInput { entry: 4, .. }));

        let value = serde_json::json!([["/x/a", "/x/b"], ["/x/c"]]);
        let err = ModuleGraph::from_json(&value, &base()).expect_err("second entry has no head");
        assert_eq!(err, IngestError::malformed(2, "missing head"));
    }

    #[test]
    fn edge_list_rejects_empty_endpoint() {
        let err = ModuleGraph::from_edge_list("/x/a\t \n", &base()).expect_err("should fail");
        assert_eq!(err, IngestError::malformed(1, "empty head path"));
    }

    #[test]
    fn json_accepts_pairs_and_objects() {
        let value = serde_json::json!([
            ["/x/a", "/x/b"],
            ["/x/a", "/x/c", false],
            {"v": "/x/b", "w": "/x/c"},
            {"tail": "/x/c", "head": "/x/a", "runtime": true},
        ]);
        let graph = ModuleGraph::from_json(&value, &base()).expect("parse");
        assert_eq!(graph.reference_count(), 4);
        assert!(!graph.adjacency()["/x/a"]["/x/c"].is_runtime);
    }

    #[test]
    fn json_rejects_non_string_endpoint() {
        let value = serde_json::json!([["/x/a", 3]]);
        let err = ModuleGraph::from_json(&value, &base()).expect_err("should fail");
        assert_eq!(err, IngestError::malformed(1, "head must be a string, got number"));
    }

    #[test]
    fn json_rejects_non_array_document() {
        let err = ModuleGraph::from_json(&serde_json::json!({}), &base()).expect_err("fail");
        assert_eq!(err, IngestError::NotAnArray("object".to_string()));
    }

    #[test]
    fn runtime_reference_is_sticky() {
        let mut graph = ModuleGraph::new();
        graph.add_reference("/a", "/b", true);
        graph.add_reference("/a", "/b", false);
        assert!(graph.adjacency()["/a"]["/b"].is_runtime);
    }

    #[test]
    fn runtime_only_keeps_keys() {
        let mut graph = ModuleGraph::new();
        graph.add_reference("/a", "/b", false);
        graph.add_reference("/a", "/c", true);
        graph.add_node("/d");

        let runtime = graph.runtime_only();
        assert_eq!(runtime.node_count(), 2);
        assert_eq!(runtime.refs_of("/a").collect::<Vec<_>>(), vec!["/c"]);
    }

    #[test]
    fn resolve_normalizes_dots() {
        assert_eq!(resolve(Path::new("/repo/src"), "../lib/./a.js"), "/repo/lib/a.js");
        assert_eq!(resolve(Path::new("/repo"), "/abs/b.js"), "/abs/b.js");
    }

    #[test]
    fn relative_paths() {
        assert_eq!(relative("/repo", "/repo/src/a.js", '/'), "src/a.js");
        assert_eq!(relative("/repo", "/repo", '/'), "");
        assert_eq!(relative("/repo/src", "/repo/lib/b.js", '/'), "../lib/b.js");
    }
}
