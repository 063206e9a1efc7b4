//! `lit report`: the ordered, directory-aware report.

use std::io::Write;
use std::path::{MAIN_SEPARATOR, PathBuf};

use clap::Args;
use literatura_core::report::write_markdown;
use literatura_core::{DirNode, Reference, Report};
use tracing::{info, instrument};

use crate::cmd::Workspace;
use crate::output::{OutputMode, render};

/// Arguments for `lit report`.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Store path, relative to the base directory.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Ignore type-only references.
    #[arg(long)]
    pub runtime_only: bool,

    /// Markdown (`text`) or the structured report (`json`).
    #[arg(long, value_enum, default_value_t = OutputMode::Text)]
    pub format: OutputMode,
}

/// Execute `lit report`.
#[instrument(skip_all)]
pub fn run_report(args: &ReportArgs, workspace: &Workspace) -> anyhow::Result<()> {
    let graph = workspace.load_graph(args.store.as_deref(), args.runtime_only)?;
    let references: Vec<Reference> = graph.references().collect();
    let report = Report::build(&DirNode::build(&references, MAIN_SEPARATOR), MAIN_SEPARATOR);
    if report.is_empty() {
        info!("no directory with more than one child, report is empty");
    }
    render(args.format, &report, render_report_human)
}

fn render_report_human(report: &Report, w: &mut dyn Write) -> std::io::Result<()> {
    write_markdown(report, w)
}
