//! Text renderers.
//!
//! - [`markdown`]: the ordered [`crate::Report`] as a Markdown document.
//! - [`plain`]: the raw module graph as tab-separated edges.
//! - [`entries`]: per-directory diagram view with printf-style templates.
//!
//! All renderers write to a caller-supplied sink and never touch the
//! process working directory.

pub mod entries;
pub mod markdown;
pub mod plain;

pub use entries::{EntriesOptions, EntryEdge, EntryNode, EntryView, entry_views, render_entries};
pub use markdown::write_markdown;
pub use plain::write_plain;
