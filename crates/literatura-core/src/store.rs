//! JSON store for a [`ModuleGraph`].
//!
//! ```json
//! {
//!   "version": "0.4.0",
//!   "files": ["src/a.js", "src/b.js"],
//!   "refs": [[0, 1], [1]],
//!   "runtimeRefs": [[0, 1], [1]]
//! }
//! ```
//!
//! `files` are sorted paths relative to the base directory. Each `refs`
//! group is `[tail, ...heads]` (one group per module, including modules with
//! no references); `runtimeRefs` uses the same layout but only lists runtime
//! heads. A store written by another version is rejected, never migrated.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::StoreError;
use crate::model::{ModuleGraph, relative, resolve};

/// Store file name used when none is given.
pub const DEFAULT_STORE_PATH: &str = ".literatura-store.json";

/// Version written to and required from every store.
pub const STORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialized store document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    pub version: String,
    pub files: Vec<String>,
    pub refs: Vec<Vec<usize>>,
    #[serde(default)]
    pub runtime_refs: Vec<Vec<usize>>,
}

/// Resolve the store location: `store_path` (or the default) against `base_dir`.
#[must_use]
pub fn store_path(base_dir: &Path, store_path: Option<&Path>) -> PathBuf {
    base_dir.join(store_path.unwrap_or_else(|| Path::new(DEFAULT_STORE_PATH)))
}

/// Convert `graph` into a store document with paths relative to `base_dir`.
#[must_use]
pub fn serialize(graph: &ModuleGraph, base_dir: &Path) -> StoreDocument {
    let base = base_dir.to_string_lossy();
    let rel = |path: &str| relative(&base, path, MAIN_SEPARATOR);

    let files: Vec<String> = graph
        .adjacency()
        .iter()
        .flat_map(|(tail, heads)| std::iter::once(tail).chain(heads.keys()))
        .map(|path| rel(path))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(i, file)| (file.as_str(), i))
        .collect();
    let idx = |path: &str| index.get(rel(path).as_str()).copied().unwrap_or_default();

    let mut refs = Vec::with_capacity(graph.node_count());
    let mut runtime_refs = Vec::with_capacity(graph.node_count());
    for (tail, heads) in graph.adjacency() {
        let tail_idx = idx(tail);
        let mut all: Vec<usize> = heads.keys().map(|head| idx(head)).collect();
        let mut runtime: Vec<usize> = heads
            .iter()
            .filter(|(_, attrs)| attrs.is_runtime)
            .map(|(head, _)| idx(head))
            .collect();
        all.sort_unstable();
        runtime.sort_unstable();
        refs.push(std::iter::once(tail_idx).chain(all).collect::<Vec<_>>());
        runtime_refs.push(std::iter::once(tail_idx).chain(runtime).collect::<Vec<_>>());
    }
    refs.sort_by_key(|group| group[0]);
    runtime_refs.sort_by_key(|group| group[0]);

    StoreDocument {
        version: STORE_VERSION.to_string(),
        files,
        refs,
        runtime_refs,
    }
}

/// Rebuild a [`ModuleGraph`] from a parsed store document.
///
/// # Errors
///
/// - [`StoreError::VersionMismatch`] when `version` differs from
///   [`STORE_VERSION`].
/// - [`StoreError::InvalidFormat`] for a missing or mistyped field, an empty
///   group, or an index outside `files`.
pub fn deserialize(value: &Value, base_dir: &Path) -> Result<ModuleGraph, StoreError> {
    let found = value
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidFormat("missing string field `version`".to_string()))?;
    if found != STORE_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: STORE_VERSION.to_string(),
            found: found.to_string(),
        });
    }

    let doc = StoreDocument::deserialize(value)
        .map_err(|e| StoreError::InvalidFormat(e.to_string()))?;
    let files: Vec<String> = doc
        .files
        .iter()
        .map(|file| resolve(base_dir, file))
        .collect();
    let file = |i: usize| {
        files
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| {
                StoreError::InvalidFormat(format!(
                    "file index {i} out of range ({} files)",
                    files.len()
                ))
            })
    };

    let mut runtime: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for group in &doc.runtime_refs {
        let (&tail, heads) = group
            .split_first()
            .ok_or_else(|| StoreError::InvalidFormat("empty runtime reference group".to_string()))?;
        let entry = runtime.entry(file(tail)?).or_default();
        for &head in heads {
            entry.insert(file(head)?);
        }
    }

    let mut graph = ModuleGraph::new();
    for group in &doc.refs {
        let (&tail, heads) = group
            .split_first()
            .ok_or_else(|| StoreError::InvalidFormat("empty reference group".to_string()))?;
        let tail = file(tail)?;
        graph.add_node(tail);
        for &head in heads {
            let head = file(head)?;
            let is_runtime = runtime.get(tail).is_some_and(|heads| heads.contains(head));
            graph.add_reference(tail, head, is_runtime);
        }
    }
    Ok(graph)
}

/// Read the store at `store_path` (default [`DEFAULT_STORE_PATH`]) under
/// `base_dir`.
///
/// # Errors
///
/// Returns [`StoreError`] when the file cannot be read, is not JSON, or is
/// not a valid store.
#[instrument(skip(store_path))]
pub fn read(base_dir: &Path, store_path: Option<&Path>) -> Result<ModuleGraph, StoreError> {
    let path = self::store_path(base_dir, store_path);
    let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;
    let graph = deserialize(&value, base_dir)?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        references = graph.reference_count(),
        "store read"
    );
    Ok(graph)
}

/// Write `graph` to `store_path` (default [`DEFAULT_STORE_PATH`]) under
/// `base_dir` and return the written path.
///
/// Parent directories are created automatically.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written.
#[instrument(skip(graph, store_path))]
pub fn write(
    graph: &ModuleGraph,
    base_dir: &Path,
    store_path: Option<&Path>,
) -> Result<PathBuf, StoreError> {
    let path = self::store_path(base_dir, store_path);
    let content = serde_json::to_string(&serialize(graph, base_dir))?;
    let io_err = |source| StoreError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(&path, content).map_err(io_err)?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        references = graph.reference_count(),
        "store written"
    );
    Ok(path)
}
