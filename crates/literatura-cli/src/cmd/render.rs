//! `lit render`: plain edge list or per-entry diagram view.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use literatura_core::format::Template;
use literatura_core::report::{EntriesOptions, render_entries, write_plain};
use tracing::instrument;

use crate::cmd::Workspace;

/// Arguments for `lit render`.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Entry directories to show, relative to the base directory.
    /// Without entries every reference is printed as `tail<TAB>head`.
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<String>,

    /// Store path, relative to the base directory.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Node line template (`%s` source, `%c` nested index, `%g` glyphs).
    #[arg(short, long, value_name = "PATTERN")]
    pub node: Option<String>,

    /// Edge line template (`%s` source, `%d` destination, `%w` weight).
    #[arg(short, long, value_name = "PATTERN")]
    pub edge: Option<String>,

    /// Ignore type-only references.
    #[arg(long)]
    pub runtime_only: bool,

    /// Colour diagram markers.
    #[arg(long)]
    pub color: bool,
}

/// Execute `lit render`.
#[instrument(skip_all, fields(entries = args.entries.len()))]
pub fn run_render(args: &RenderArgs, workspace: &Workspace) -> anyhow::Result<()> {
    let graph = workspace.load_graph(args.store.as_deref(), args.runtime_only)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.entries.is_empty() {
        write_plain(&graph, &workspace.base_dir, &mut out)?;
    } else {
        let options = entries_options(args, workspace)?;
        render_entries(&graph, &workspace.base_dir, args.entries.as_slice(), &options, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn entries_options(args: &RenderArgs, workspace: &Workspace) -> anyhow::Result<EntriesOptions> {
    let render = &workspace.config.render;
    let node = args.node.as_deref().unwrap_or(&render.node);
    let edge = args.edge.as_deref().unwrap_or(&render.edge);
    Ok(EntriesOptions {
        node: Template::parse(node).with_context(|| format!("node template `{node}`"))?,
        edge: Template::parse(edge).with_context(|| format!("edge template `{edge}`"))?,
        color: args.color || render.color,
    })
}
