pub mod build;
pub mod completions;
pub mod render;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use literatura_core::ModuleGraph;
use literatura_core::config::{ProjectConfig, load_project_config};
use literatura_core::store;

/// Base directory plus the project config found in it.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub base_dir: PathBuf,
    pub config: ProjectConfig,
}

impl Workspace {
    /// Resolve `base_dir` (default: the current directory) to an absolute
    /// path and load `.literatura.toml` from it.
    pub fn open(base_dir: Option<&Path>) -> anyhow::Result<Self> {
        let base_dir = match base_dir {
            Some(dir) => std::path::absolute(dir)
                .with_context(|| format!("resolve base directory {}", dir.display()))?,
            None => std::env::current_dir().context("read current directory")?,
        };
        let config = load_project_config(&base_dir)?;
        Ok(Self { base_dir, config })
    }

    /// Store location: the flag if given, else the configured path.
    pub fn store_path<'a>(&'a self, flag: Option<&'a Path>) -> &'a Path {
        flag.unwrap_or(&self.config.store)
    }

    /// Load the module graph from the store, optionally keeping only
    /// runtime references.
    pub fn load_graph(&self, store_flag: Option<&Path>, runtime_only: bool) -> anyhow::Result<ModuleGraph> {
        let path = self.store_path(store_flag);
        let graph = store::read(&self.base_dir, Some(path)).with_context(|| {
            format!(
                "load store {} (run `lit build` first)",
                self.base_dir.join(path).display()
            )
        })?;
        Ok(if runtime_only || self.config.render.runtime_only {
            graph.runtime_only()
        } else {
            graph
        })
    }
}
