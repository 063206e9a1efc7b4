//! Shared output layer for text/JSON parity across CLI commands.
//!
//! Every command handler that supports `--format` receives an
//! [`OutputMode`]. Text output goes through a command-specific closure;
//! JSON output serializes the same payload with `serde_json`.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Output modes supported by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-readable text (Markdown for reports).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; otherwise
/// `text_fn` produces the output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(mode, value, text_fn, &mut out)
}

/// [`render`] into an arbitrary sink.
pub fn render_to<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        name: &'static str,
    }

    #[test]
    fn json_mode_serializes_payload() {
        let mut out = Vec::new();
        render_to(
            OutputMode::Json,
            &Payload { name: "lib" },
            |_, _| unreachable!("text renderer must not run in JSON mode"),
            &mut out,
        )
        .expect("render");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["name"], "lib");
    }

    #[test]
    fn text_mode_uses_closure() {
        let mut out = Vec::new();
        render_to(
            OutputMode::Text,
            &Payload { name: "lib" },
            |p, w| writeln!(w, "name={}", p.name),
            &mut out,
        )
        .expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "name=lib\n");
    }
}
