#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "lit",
    author,
    version,
    about = "literatura: topologically ordered literature from code, with respect for directory structure",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory that relative paths and the store are resolved against.
    /// Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Build the store from an edge list",
        long_about = "Read already-extracted module references (TSV or JSON) and write the literatura store.",
        after_help = "EXAMPLES:\n    # Read a TSV edge list from a file\n    lit build --edges deps.tsv\n\n    # Read JSON edges from stdin\n    cat deps.json | lit build --input-format json"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        about = "Render module references",
        long_about = "Without entries, print every reference as a tab-separated pair. With entries, print the diagram view of each entry directory.",
        after_help = "EXAMPLES:\n    # Plain edge list\n    lit render\n\n    # Diagram view of src/\n    lit render src\n\n    # Custom templates\n    lit render src --node '%g %s' --edge '%s -> %d (%w)'"
    )]
    Render(cmd::render::RenderArgs),

    #[command(
        about = "Print the ordered report",
        long_about = "Print the directory-aware, dependency-ordered report as Markdown or JSON.",
        after_help = "EXAMPLES:\n    # Markdown report\n    lit report\n\n    # Runtime references only, as JSON\n    lit report --runtime-only --format json"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    lit completions bash > ~/.local/share/bash-completion/completions/lit"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LITERATURA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "lit=debug,literatura_core=debug,info"
        } else {
            "lit=info,literatura_core=info,warn"
        })
    });

    let format = env::var("LITERATURA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(ref args) = cli.command {
        return cmd::completions::run_completions(args.shell, &mut Cli::command(), &mut std::io::stdout());
    }

    let workspace = cmd::Workspace::open(cli.base_dir.as_deref())?;
    debug!(base_dir = %workspace.base_dir.display(), "workspace opened");

    match cli.command {
        Commands::Build(ref args) => cmd::build::run_build(args, &workspace),
        Commands::Render(ref args) => cmd::render::run_render(args, &workspace),
        Commands::Report(ref args) => cmd::report::run_report(args, &workspace),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["lit", "report", "--base-dir", "/tmp/x", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.base_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Commands::Report(_)));
    }
}
