use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::format::{DEFAULT_EDGE_FORMAT, DEFAULT_NODE_FORMAT};
use crate::store::DEFAULT_STORE_PATH;

/// Project config file name, looked up in the base directory.
pub const CONFIG_FILE: &str = ".literatura.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_store")]
    pub store: PathBuf,
    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_node_format")]
    pub node: String,
    #[serde(default = "default_edge_format")]
    pub edge: String,
    #[serde(default)]
    pub runtime_only: bool,
    #[serde(default)]
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node: default_node_format(),
            edge: default_edge_format(),
            runtime_only: false,
            color: false,
        }
    }
}

/// Load `.literatura.toml` from `base_dir`, or defaults when it is absent.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_project_config(base_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = base_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    toml::from_str::<ProjectConfig>(&content).map_err(|source| ConfigError::Parse { path, source })
}

fn default_store() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_node_format() -> String {
    DEFAULT_NODE_FORMAT.to_string()
}

fn default_edge_format() -> String {
    DEFAULT_EDGE_FORMAT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.render.node, "%g%c%t%s");
        assert_eq!(config.store, PathBuf::from(".literatura-store.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[render]\nruntime_only = true\nedge = \"%s -> %d\"\n",
        )
        .expect("write");

        let config = load_project_config(dir.path()).expect("load");
        assert!(config.render.runtime_only);
        assert_eq!(config.render.edge, "%s -> %d");
        assert_eq!(config.render.node, DEFAULT_NODE_FORMAT);
        assert!(!config.render.color);
    }

    #[test]
    fn custom_store_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "store = \"out/graph.json\"\n")
            .expect("write");
        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config.store, PathBuf::from("out/graph.json"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "render = 3").expect("write");
        let err = load_project_config(dir.path()).expect_err("invalid");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
