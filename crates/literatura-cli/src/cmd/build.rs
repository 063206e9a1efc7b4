//! `lit build`: ingest an edge list and write the store.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use literatura_core::{ModuleGraph, store};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cmd::Workspace;
use crate::output::{OutputMode, render};

/// Edge list syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// JSON if the input starts with `[`, TSV otherwise.
    #[default]
    Auto,
    /// `tail<TAB>head[<TAB>runtime|type]` lines.
    Tsv,
    /// Array of `[tail, head, runtime?]` or `{"tail", "head", "runtime"}`.
    Json,
}

/// Arguments for `lit build`.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Edge list to read, or `-` for stdin.
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub edges: PathBuf,

    /// Syntax of the edge list.
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Store path, relative to the base directory.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Output format for the build summary.
    #[arg(long, value_enum, default_value_t = OutputMode::Text)]
    pub format: OutputMode,
}

#[derive(Debug, Serialize)]
struct BuildOutput {
    store: PathBuf,
    modules: usize,
    references: usize,
    runtime_references: usize,
}

/// Execute `lit build`.
#[instrument(skip_all)]
pub fn run_build(args: &BuildArgs, workspace: &Workspace) -> anyhow::Result<()> {
    let text = read_input(&args.edges)?;
    let graph = parse_edges(&text, args.input_format, &workspace.base_dir)
        .with_context(|| format!("parse edge list {}", args.edges.display()))?;

    let store_path = workspace.store_path(args.store.as_deref());
    let written = store::write(&graph, &workspace.base_dir, Some(store_path))?;

    let payload = BuildOutput {
        store: written,
        modules: graph.node_count(),
        references: graph.reference_count(),
        runtime_references: graph.runtime_only().reference_count(),
    };
    render(args.format, &payload, render_build_human)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read edge list from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read edge list {}", path.display()))
}

fn parse_edges(text: &str, format: InputFormat, base_dir: &Path) -> anyhow::Result<ModuleGraph> {
    let format = match format {
        InputFormat::Auto if text.trim_start().starts_with('[') => InputFormat::Json,
        InputFormat::Auto => InputFormat::Tsv,
        explicit => explicit,
    };
    debug!(?format, bytes = text.len(), "parsing edge list");
    let graph = match format {
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(text).context("edge list is not valid JSON")?;
            ModuleGraph::from_json(&value, base_dir)?
        }
        InputFormat::Tsv | InputFormat::Auto => ModuleGraph::from_edge_list(text, base_dir)?,
    };
    Ok(graph)
}

fn render_build_human(payload: &BuildOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "Wrote {} modules, {} references ({} runtime) to {}",
        payload.modules,
        payload.references,
        payload.runtime_references,
        payload.store.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: BuildArgs,
        }

        let parsed = Wrapper::parse_from(["test"]);
        assert_eq!(parsed.args.edges, PathBuf::from("-"));
        assert_eq!(parsed.args.input_format, InputFormat::Auto);
        assert!(parsed.args.store.is_none());
    }

    #[test]
    fn auto_detects_json() {
        let graph = parse_edges(r#"[["a.js", "b.js"]]"#, InputFormat::Auto, Path::new("/r"))
            .expect("json");
        assert_eq!(graph.reference_count(), 1);
    }

    #[test]
    fn auto_falls_back_to_tsv() {
        let graph = parse_edges("a.js\tb.js\n", InputFormat::Auto, Path::new("/r")).expect("tsv");
        assert_eq!(graph.refs_of("/r/a.js").collect::<Vec<_>>(), vec!["/r/b.js"]);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = parse_edges("only-tail\n", InputFormat::Tsv, Path::new("/r")).expect_err("fails");
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn human_summary() {
        let payload = BuildOutput {
            store: PathBuf::from("/r/.literatura-store.json"),
            modules: 3,
            references: 4,
            runtime_references: 2,
        };
        let mut out = Vec::new();
        render_build_human(&payload, &mut out).expect("render");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Wrote 3 modules, 4 references (2 runtime) to /r/.literatura-store.json\n"
        );
    }
}
