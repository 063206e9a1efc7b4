#![forbid(unsafe_code)]
//! literatura-core library.
//!
//! Turns a flat set of module references (who-imports-whom) into a
//! deterministic document order that follows the directory structure of the
//! code base.
//!
//! ## Pipeline
//!
//! ```text
//! edge list / store
//!        ↓  model::ModuleGraph
//! ModuleGraph (tail → head → attrs)
//!        ↓  tree::DirNode::build()
//! DirNode tree (edges bucketed at their lowest common ancestor)
//!        ↓  order::Report::build()   (graph::decompose per directory)
//! Report (sections in document order, SCC-grouped)
//!        ↓  report::markdown / report::entries (+ diagram::draw)
//! text
//! ```
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern ([`IngestError`],
//!   [`StoreError`], [`FormatError`], [`ConfigError`]). Cycles and trivial trees are data,
//!   never errors.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod diagram;
pub mod error;
pub mod format;
pub mod graph;
pub mod model;
pub mod multimap;
pub mod order;
pub mod report;
pub mod store;
pub mod tree;

pub use error::{ConfigError, FormatError, IngestError, StoreError};
pub use graph::{Component, Scc, decompose};
pub use model::{ModuleGraph, RefAttrs, Reference};
pub use order::{Report, Section};
pub use tree::DirNode;
