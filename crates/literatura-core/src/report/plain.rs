use std::io::{self, Write};
use std::path::{MAIN_SEPARATOR, Path};

use crate::model::{ModuleGraph, relative};

/// Write every reference as `tail<TAB>head`, relative to `base_dir`.
///
/// Lines are sorted by tail, then head. Modules without references are
/// skipped.
///
/// # Errors
///
/// Returns any error from writing to `w`.
pub fn write_plain(graph: &ModuleGraph, base_dir: &Path, w: &mut dyn Write) -> io::Result<()> {
    let base = base_dir.to_string_lossy();
    for (tail, heads) in graph.adjacency() {
        if heads.is_empty() {
            continue;
        }
        let tail = relative(&base, tail, MAIN_SEPARATOR);
        for head in heads.keys() {
            writeln!(w, "{tail}\t{}", relative(&base, head, MAIN_SEPARATOR))?;
        }
    }
    Ok(())
}
