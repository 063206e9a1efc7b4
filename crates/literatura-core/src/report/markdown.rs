//! Markdown serialization of an ordered [`Report`].
//!
//! ```markdown
//! # lib
//!
//! - fmt.js
//!   - ↘ util.js
//! - util.js
//!
//! # .
//!
//! - README.md
//!
//! ---
//!
//! - *app* (!)
//!   - ↘ *lib* (!)
//!     - app/main.js → lib/util.js
//! - *lib* (!)
//!   - ↘ *app* (!)
//!     - lib/util.js → app/cli.js
//! ```
//!
//! One heading per section (relative to the report base, `.` for the base
//! itself), one bullet per child in document order, a nested `↘` bullet per
//! referenced sibling, and the underlying file references under it unless
//! the sibling reference is a single file-to-file edge. Weak components are
//! separated by thematic breaks. Members of cyclic SCCs are emphasised and
//! marked `(!)`.

use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::model::relative;
use crate::order::{Report, Section, SectionComponent};

/// Write `report` as Markdown. An empty report writes nothing.
///
/// # Errors
///
/// Returns any error from writing to `w`.
pub fn write_markdown(report: &Report, w: &mut dyn Write) -> io::Result<()> {
    for (i, section) in report.sections.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "# {}", escape(&report.heading(section)))?;
        for (j, component) in section.components.iter().enumerate() {
            if j > 0 {
                writeln!(w)?;
                writeln!(w, "---")?;
            }
            writeln!(w)?;
            write_component(report, section, component, w)?;
        }
    }
    Ok(())
}

/// [`write_markdown`] into a string.
#[must_use]
pub fn to_markdown(report: &Report) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_markdown(report, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

fn write_component(
    report: &Report,
    section: &Section,
    component: &SectionComponent,
    w: &mut dyn Write,
) -> io::Result<()> {
    let cyclic: BTreeSet<&str> = component
        .sccs
        .iter()
        .filter(|scc| scc.is_cyclic)
        .flat_map(|scc| scc.nodes.iter().map(String::as_str))
        .collect();
    let label = |name: &str| {
        if cyclic.contains(name) {
            format!("*{}* (!)", escape(name))
        } else {
            escape(name)
        }
    };
    let context = section.path.as_str();
    let sep = report.separator;

    for scc in &component.sccs {
        for node in &scc.nodes {
            writeln!(w, "- {}", label(node))?;
            let Some(dependencies) = scc.references.get(node) else {
                continue;
            };
            for dependency in dependencies {
                writeln!(w, "  - ↘ {}", label(&dependency.target))?;
                if dependency.is_direct(node, context, sep) {
                    continue;
                }
                for edge in &dependency.edges {
                    writeln!(
                        w,
                        "    - {} → {}",
                        escape(&relative(context, &edge.tail, sep)),
                        escape(&relative(context, &edge.head, sep)),
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '[' | ']' | '`' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reference;
    use crate::tree::DirNode;

    fn report(pairs: &[(&str, &str)]) -> Report {
        let refs: Vec<Reference> = pairs
            .iter()
            .map(|(t, h)| Reference::new(*t, *h, true))
            .collect();
        Report::build(&DirNode::build(&refs, '/'), '/')
    }

    #[test]
    fn empty_report_renders_nothing() {
        assert_eq!(to_markdown(&report(&[])), "");
    }

    #[test]
    fn nested_sections_and_cycles() {
        let text = to_markdown(&report(&[
            ("/p/app/main.js", "/p/lib/util.js"),
            ("/p/lib/util.js", "/p/app/cli.js"),
            ("/p/lib/fmt.js", "/p/lib/util.js"),
            ("/p/README.md", "/p/README.md"),
        ]));
        let expected = "\
# app

- cli.js

---

- main.js

# lib

- fmt.js
  - ↘ util.js
- util.js

# .

- README.md

---

- *app* (!)
  - ↘ *lib* (!)
    - app/main.js → lib/util.js
- *lib* (!)
  - ↘ *app* (!)
    - lib/util.js → app/cli.js
";
        assert_eq!(text, expected);
    }

    #[test]
    fn weighted_dependency_lists_every_edge() {
        let text = to_markdown(&report(&[
            ("/p/a/x.js", "/p/b/y.js"),
            ("/p/a/z.js", "/p/b/y.js"),
            ("/p/a/x.js", "/p/a/z.js"),
            ("/p/b/y.js", "/p/b/w.js"),
        ]));
        assert!(text.contains("- a\n  - ↘ b\n    - a/x.js → b/y.js\n    - a/z.js → b/y.js\n"));
    }

    #[test]
    fn markdown_specials_are_escaped() {
        assert_eq!(escape("__init__.py"), r"\_\_init\_\_.py");
    }
}
