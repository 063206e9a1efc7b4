//! Graph decomposition for dependency ordering.
//!
//! ## Pipeline
//!
//! ```text
//! node set + reference lookup
//!        ↓  decompose::decompose()
//! DiGraph (nodes and edges inserted in sorted order)
//!        ├─ weak components   (petgraph UnionFind)
//!        └─ SCCs              (petgraph tarjan_scc)
//!        ↓  Kahn pass over each component's condensation
//! Vec<Component>  (referrers before referents, ties sorted)
//! ```

pub mod decompose;

pub use decompose::{Component, Scc, decompose};
