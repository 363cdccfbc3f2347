//! Finding the value literal under a caret.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::dialect::scalar;
use crate::dialect::{DialectKind, Registry, RuleId};

/// Grapheme column of a byte offset into `line`.
pub fn byte_to_col(line: &str, byte: usize) -> u32 {
    let byte = byte.min(line.len());
    line.get(..byte)
        .map_or(0, |prefix| prefix.graphemes(true).count() as u32)
}

/// Byte offset of a grapheme column; columns past the end map to `line.len()`.
pub fn col_to_byte(line: &str, col: u32) -> usize {
    line.grapheme_indices(true)
        .nth(col as usize)
        .map_or(line.len(), |(byte, _)| byte)
}

/// One regex match over a line, in both byte and column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub start: u32,
    pub end: u32,
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
}

impl Found {
    pub fn from_bytes(line: &str, byte_start: usize, byte_end: usize) -> Option<Self> {
        let text = line.get(byte_start..byte_end)?;
        Some(Self {
            start: byte_to_col(line, byte_start),
            end: byte_to_col(line, byte_end),
            byte_start,
            byte_end,
            text: text.to_string(),
        })
    }

    /// Byte offset of `caret` relative to the start of the match.
    pub fn caret_offset(&self, line: &str, caret: u32) -> usize {
        col_to_byte(line, caret).saturating_sub(self.byte_start)
    }
}

/// First match of `regex` whose range contains `caret`, both ends inclusive.
pub fn find_at(regex: &Regex, line: &str, caret: u32) -> Option<Found> {
    let caret_byte = col_to_byte(line, caret);
    regex
        .find_iter(line)
        .find(|m| m.start() <= caret_byte && caret_byte <= m.end())
        .and_then(|m| Found::from_bytes(line, m.start(), m.end()))
}

/// Which structured dialects give way to a bare number under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub numbers_over_colors: bool,
    pub numbers_over_filters: bool,
}

/// A match together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub rule: RuleId,
    pub kind: DialectKind,
    pub found: Found,
}

/// Walks a rule registry in priority order.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    registry: &'a Registry,
    precedence: Precedence,
}

impl<'a> Locator<'a> {
    pub fn new(registry: &'a Registry, precedence: Precedence) -> Self {
        Self {
            registry,
            precedence,
        }
    }

    /// The first rule of `kind` matching at `caret`.
    pub fn locate(&self, line: &str, caret: u32, kind: DialectKind) -> Option<Located> {
        self.registry
            .iter()
            .filter(|(_, rule)| rule.kind() == kind)
            .find_map(|(id, rule)| {
                rule.locate(line, caret).map(|found| Located {
                    rule: id,
                    kind,
                    found,
                })
            })
    }

    /// The highest-priority match at `caret` across every dialect.
    ///
    /// Structured dialects are tried before bare numbers; a rule that defers
    /// under the current [`Precedence`] is skipped when a number also sits
    /// under the caret.
    pub fn classify(&self, line: &str, caret: u32) -> Option<Located> {
        let number_here = scalar::number_at(line, caret).is_some();
        self.registry.iter().find_map(|(id, rule)| {
            if number_here && rule.defers_to_numbers(self.precedence) {
                return None;
            }
            rule.locate(line, caret).map(|found| Located {
                rule: id,
                kind: rule.kind(),
                found,
            })
        })
    }
}
