use unicode_segmentation::UnicodeSegmentation;

/// A position within a text buffer.
///
/// Positions are zero-indexed and column values are counted in grapheme clusters,
/// not bytes or chars. This ensures correct handling of emoji and combining characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column position in grapheme clusters.
    pub col: u32,
}

impl Position {
    /// The origin position (0, 0).
    pub const ZERO: Position = Position { line: 0, col: 0 };

    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A range of text defined by start and end positions.
///
/// Ranges are half-open intervals [start, end). Host selections may arrive
/// with `end` before `start`; [`Range::ordered`] puts them back in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// The start position (inclusive).
    pub start: Position,
    /// The end position (exclusive).
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A collapsed range: a plain caret.
    pub fn caret(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn ordered(self) -> Self {
        if self.end < self.start {
            Self {
                start: self.end,
                end: self.start,
            }
        } else {
            self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A located value literal: a half-open column range on one line plus the
/// text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: u32,
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Span {
    pub fn range(&self) -> Range {
        Range {
            start: Position::new(self.line, self.start),
            end: Position::new(self.line, self.end),
        }
    }
}

/// Width of `text` in grapheme columns.
pub fn text_width(text: &str) -> u32 {
    text.graphemes(true).count() as u32
}

/// Text to write over a range of the pre-edit document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub range: Range,
    pub text: String,
}

/// Outcome of editing one selection in a batch.
///
/// `original` is in pre-edit coordinates, `updated` and `selection` are in
/// coordinates after every replacement of the batch has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub original: Span,
    pub updated: Span,
    pub selection: Range,
}

impl EditResult {
    pub fn replacement(&self) -> Replacement {
        Replacement {
            range: self.original.range(),
            text: self.updated.text.clone(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.original.text == self.updated.text
    }
}

/// Groups one batch's replacement and selection update for the host's undo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// The value shown on the device overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackValue {
    Value(String),
    /// Selections changed by visibly different amounts.
    Unresolved,
}

/// A `{displayName, displayValue}` pair for the host's feedback overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub name: String,
    pub value: FeedbackValue,
}

impl Feedback {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FeedbackValue::Value(value.into()),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FeedbackValue::Unresolved,
        }
    }

    /// Clears the overlay.
    pub fn blank() -> Self {
        Self::new("", "")
    }
}

/// Commands emitted by the engine for the host to execute.
///
/// The host applies them in order: replacements first, then the new
/// selections, then feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace every range atomically; ranges are in pre-edit coordinates.
    ReplaceSpans {
        edits: Vec<Replacement>,
        transaction: TransactionId,
    },
    /// Select the edited values; ranges are in post-edit coordinates.
    SetSelections {
        selections: Vec<Range>,
        transaction: TransactionId,
    },
    /// Update the dial overlay.
    UpdateFeedback(Feedback),
}
