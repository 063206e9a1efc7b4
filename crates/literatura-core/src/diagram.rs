//! Box-drawing reference diagrams for an ordered node sequence.
//!
//! # Overview
//!
//! For a fixed top-to-bottom node order, every node that references other
//! visible nodes gets one vertical *lane* spanning from the first to the last
//! row involved (the node itself and everything it references). Lanes are
//! packed greedily: a node reuses the first existing lane whose drawn length
//! does not reach past the top of its span, otherwise it opens a new lane.
//!
//! ```text
//!     ┌>┌>  a
//!     ├>└@  b
//!   ┌>┟@┌>  c
//!   │ ┣>┟@  d
//!   └@┗>┃   e
//!       ┗>  f
//! ```
//!
//! Each line lists lanes right-to-left by age, so the newest lane sits next
//! to the node name. Rows a lane does not reach are blank.
//!
//! References to nodes outside the sequence are ignored.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use colored::{ColoredString, Colorize};

/// One two-column cell of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Lane has no content on this row.
    Vacuum,
    /// Pass-through above the source row.
    ContBeforeSrc,
    /// Pass-through below the source row.
    ContAfterSrc,
    /// Referenced row above the source, not the first row of the span.
    RefBeforeSrc,
    /// Referenced row opening the span.
    RefMin,
    /// Referenced row below the source, not the last row of the span.
    RefAfterSrc,
    /// Referenced row closing the span.
    RefMax,
    /// Source row inside the span.
    Src,
    /// Source row opening the span.
    SrcMin,
    /// Source row closing the span.
    SrcMax,
}

impl Glyph {
    /// Line-drawing part of the cell.
    #[must_use]
    pub const fn stroke(self) -> char {
        match self {
            Self::Vacuum => ' ',
            Self::ContBeforeSrc => '│',
            Self::ContAfterSrc => '┃',
            Self::RefBeforeSrc => '├',
            Self::RefMin => '┌',
            Self::RefAfterSrc => '┣',
            Self::RefMax => '┗',
            Self::Src => '┟',
            Self::SrcMin => '┎',
            Self::SrcMax => '└',
        }
    }

    /// Marker part of the cell.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Vacuum | Self::ContBeforeSrc | Self::ContAfterSrc => ' ',
            Self::RefBeforeSrc | Self::RefMin | Self::RefAfterSrc | Self::RefMax => '>',
            Self::Src | Self::SrcMin | Self::SrcMax => '@',
        }
    }

    /// Marker coloured by its position relative to the source row.
    fn painted_marker(self) -> ColoredString {
        let marker = self.marker().to_string();
        match self {
            Self::RefBeforeSrc | Self::RefMin => marker.green(),
            Self::RefAfterSrc | Self::RefMax => marker.red(),
            Self::Src | Self::SrcMin | Self::SrcMax => marker.yellow(),
            Self::Vacuum | Self::ContBeforeSrc | Self::ContAfterSrc => marker.normal(),
        }
    }

    /// Write the cell, colouring the marker when `color` is set.
    pub fn write_to(self, out: &mut String, color: bool) {
        out.push(self.stroke());
        if color {
            out.push_str(&self.painted_marker().to_string());
        } else {
            out.push(self.marker());
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stroke(), self.marker())
    }
}

/// Options for [`draw_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOptions {
    /// Colour markers with ANSI escapes.
    pub color: bool,
}

/// Lane grid: `rows[i]` holds row `i`'s glyphs, lanes ordered newest first.
#[must_use]
pub fn draw_glyphs<N, F, R>(nodes: &[N], mut refs_of: F) -> Vec<Vec<Glyph>>
where
    N: AsRef<str>,
    F: FnMut(&str) -> R,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.as_ref(), i))
        .collect();
    let mut lanes: Vec<Vec<Glyph>> = Vec::new();

    for (src, node) in nodes.iter().enumerate() {
        let refs: BTreeSet<usize> = refs_of(node.as_ref())
            .into_iter()
            .filter_map(|r| index.get(r.as_ref()).copied())
            .collect();
        let (Some(&first), Some(&last)) = (refs.first(), refs.last()) else {
            continue;
        };
        let min = src.min(first);
        let max = src.max(last);

        let lane = match lanes.iter().position(|lane| lane.len() <= min) {
            Some(free) => &mut lanes[free],
            None => {
                lanes.push(Vec::new());
                let newest = lanes.len() - 1;
                &mut lanes[newest]
            }
        };
        lane.resize(min, Glyph::Vacuum);
        lane.extend((min..=max).map(|row| span_glyph(row, src, &refs, min, max)));
    }

    (0..nodes.len())
        .map(|row| {
            lanes
                .iter()
                .rev()
                .map(|lane| lane.get(row).copied().unwrap_or(Glyph::Vacuum))
                .collect()
        })
        .collect()
}

fn span_glyph(row: usize, src: usize, refs: &BTreeSet<usize>, min: usize, max: usize) -> Glyph {
    if row == src {
        return if row == min {
            Glyph::SrcMin
        } else if row == max {
            Glyph::SrcMax
        } else {
            Glyph::Src
        };
    }
    let referenced = refs.contains(&row);
    if row < src {
        match (referenced, row == min) {
            (false, _) => Glyph::ContBeforeSrc,
            (true, true) => Glyph::RefMin,
            (true, false) => Glyph::RefBeforeSrc,
        }
    } else {
        match (referenced, row == max) {
            (false, _) => Glyph::ContAfterSrc,
            (true, true) => Glyph::RefMax,
            (true, false) => Glyph::RefAfterSrc,
        }
    }
}

/// One diagram line per node, same order and length as `nodes`.
#[must_use]
pub fn draw<N, F, R>(nodes: &[N], refs_of: F) -> Vec<String>
where
    N: AsRef<str>,
    F: FnMut(&str) -> R,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    draw_with(nodes, refs_of, DrawOptions::default())
}

/// Like [`draw`], with explicit [`DrawOptions`].
#[must_use]
pub fn draw_with<N, F, R>(nodes: &[N], refs_of: F, options: DrawOptions) -> Vec<String>
where
    N: AsRef<str>,
    F: FnMut(&str) -> R,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    draw_glyphs(nodes, refs_of)
        .into_iter()
        .map(|row| {
            let mut line = String::new();
            for glyph in row {
                glyph.write_to(&mut line, options.color);
            }
            line
        })
        .collect()
}

/// Largest number of spans open on any single row.
///
/// A lower bound for the number of lanes any packing needs.
#[must_use]
pub fn max_concurrent_spans<N, F, R>(nodes: &[N], mut refs_of: F) -> usize
where
    N: AsRef<str>,
    F: FnMut(&str) -> R,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.as_ref(), i))
        .collect();
    let mut open = vec![0usize; nodes.len()];
    for (src, node) in nodes.iter().enumerate() {
        let refs: Vec<usize> = refs_of(node.as_ref())
            .into_iter()
            .filter_map(|r| index.get(r.as_ref()).copied())
            .collect();
        let (Some(&lo), Some(&hi)) = (refs.iter().min(), refs.iter().max()) else {
            continue;
        };
        for row in src.min(lo)..=src.max(hi) {
            open[row] += 1;
        }
    }
    open.into_iter().max().unwrap_or(0)
}
