//! printf-style templates for node and edge lines.
//!
//! | token | expands to |
//! | --- | --- |
//! | `%%` | `%` |
//! | `%t` | tab |
//! | `%n` | newline |
//! | `%[-][width]s` | source (node or edge tail) |
//! | `%[-][width]d` | destination (edge head) |
//! | `%[-][width]w` | edge weight |
//! | `%[-][width]c` | component-nested index `ci:scci:ni` |
//! | `%[-][width]g` | diagram glyphs |
//!
//! A width pads on the right; with `-` it pads on the left. Widths above
//! [`MAX_WIDTH`] are rejected. Any other `%` sequence is copied through
//! unchanged. Missing values expand to nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FormatError;

/// Default template for node lines.
pub const DEFAULT_NODE_FORMAT: &str = "%g%c%t%s";

/// Default template for edge lines.
pub const DEFAULT_EDGE_FORMAT: &str = "%-3w%t%s%t%d";

/// Largest accepted field width.
pub const MAX_WIDTH: usize = 65_535;

static TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"%(?:%|t|n|(-)?(\d+)?([sdwcg]))"));

/// Values a template may reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatArgs<'a> {
    pub src: Option<&'a str>,
    pub dst: Option<&'a str>,
    pub weight: Option<usize>,
    pub cni: Option<&'a str>,
    pub glyphs: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Src,
    Dst,
    Weight,
    Cni,
    Glyphs,
}

impl Key {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Src),
            'd' => Some(Self::Dst),
            'w' => Some(Self::Weight),
            'c' => Some(Self::Cni),
            'g' => Some(Self::Glyphs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field {
        key: Key,
        width: Option<usize>,
        pad_left: bool,
    },
}

/// A parsed template, reusable across lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Split `template` into literal text and fields.
    ///
    /// # Errors
    ///
    /// - [`FormatError::Pattern`] if the token pattern failed to compile.
    /// - [`FormatError::Width`] if a field width exceeds [`MAX_WIDTH`].
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let token = TOKEN.as_ref().map_err(|e| FormatError::Pattern(e.to_string()))?;
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in token.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&template[last..whole.start()]);
            last = whole.end();

            let key = caps
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .and_then(Key::from_char);
            let Some(key) = key else {
                match whole.as_str() {
                    "%%" => literal.push('%'),
                    "%t" => literal.push('\t'),
                    "%n" => literal.push('\n'),
                    other => literal.push_str(other),
                }
                continue;
            };
            let width = match caps.get(2) {
                None => None,
                Some(digits) => match digits.as_str().parse::<usize>() {
                    Ok(width) if width <= MAX_WIDTH => Some(width),
                    _ => {
                        return Err(FormatError::Width {
                            token: whole.as_str().to_string(),
                            max: MAX_WIDTH,
                        });
                    }
                },
            };
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Field {
                key,
                width,
                pad_left: caps.get(1).is_some(),
            });
        }
        literal.push_str(&template[last..]);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Expand the template with `args`.
    #[must_use]
    pub fn render(&self, args: &FormatArgs<'_>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field {
                    key,
                    width,
                    pad_left,
                } => {
                    let value = match key {
                        Key::Src => args.src.unwrap_or_default().to_string(),
                        Key::Dst => args.dst.unwrap_or_default().to_string(),
                        Key::Weight => args.weight.map(|w| w.to_string()).unwrap_or_default(),
                        Key::Cni => args.cni.unwrap_or_default().to_string(),
                        Key::Glyphs => args.glyphs.unwrap_or_default().to_string(),
                    };
                    let padding = width.unwrap_or(0).saturating_sub(value.chars().count());
                    if *pad_left {
                        out.extend(std::iter::repeat_n(' ', padding));
                        out.push_str(&value);
                    } else {
                        out.push_str(&value);
                        out.extend(std::iter::repeat_n(' ', padding));
                    }
                }
            }
        }
        out
    }
}

/// Parse and expand `template` in one step.
///
/// # Errors
///
/// See [`Template::parse`].
pub fn sprintf(template: &str, args: &FormatArgs<'_>) -> Result<String, FormatError> {
    Ok(Template::parse(template)?.render(args))
}
