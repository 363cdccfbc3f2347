//! Folds per-selection replacements into one atomic batch.

use std::collections::HashMap;

use crate::dialect::Rendered;
use crate::types::{Command, EditResult, Position, Range, Span, TransactionId, text_width};

/// Replacements for one input event.
///
/// Spans must be pushed left to right within each line: every push is
/// shifted by the net width change of the earlier pushes on its line.
#[derive(Debug, Default)]
pub struct Batch {
    shifts: HashMap<u32, i64>,
    results: Vec<EditResult>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the replacement of `original` and returns where it ends up.
    pub fn push(&mut self, original: Span, rendered: Rendered) -> &EditResult {
        let shift = self.shifts.entry(original.line).or_insert(0);
        let start = (i64::from(original.start) + *shift).max(0) as u32;
        let new_width = text_width(&rendered.text);
        let old_width = original.end.saturating_sub(original.start);
        *shift += i64::from(new_width) - i64::from(old_width);

        let line = original.line;
        let selection = match rendered.hint {
            Some((from, to)) => Range::new(
                Position::new(line, start + from),
                Position::new(line, start + to),
            ),
            None => Range::new(
                Position::new(line, start),
                Position::new(line, start + new_width),
            ),
        };
        let updated = Span {
            line,
            start,
            end: start + new_width,
            text: rendered.text,
        };

        tracing::trace!(line, from = original.start, to = start, text = %updated.text, "span replaced");
        self.results.push(EditResult {
            original,
            updated,
            selection,
        });
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[EditResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The spans as they read once the batch is applied: what the next
    /// event will locate if the user keeps the same selections.
    pub fn fingerprint(&self) -> Vec<Span> {
        self.results
            .iter()
            .map(|result| result.updated.clone())
            .collect()
    }

    /// Replace then select, under one transaction. Nothing at all when no
    /// text changed.
    pub fn commands(&self, transaction: TransactionId) -> Vec<Command> {
        let edits: Vec<_> = self
            .results
            .iter()
            .filter(|result| !result.is_noop())
            .map(EditResult::replacement)
            .collect();
        if edits.is_empty() {
            return Vec::new();
        }

        vec![
            Command::ReplaceSpans { edits, transaction },
            Command::SetSelections {
                selections: self.results.iter().map(|result| result.selection).collect(),
                transaction,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32, start: u32, text: &str) -> Span {
        Span {
            line,
            start,
            end: start + text_width(text),
            text: text.to_string(),
        }
    }

    #[test]
    fn later_spans_on_a_line_shift() {
        let mut batch = Batch::new();
        batch.push(span(0, 0, "9"), Rendered::plain("100"));
        let second = batch.push(span(0, 4, "5"), Rendered::plain("6")).clone();

        assert_eq!(second.updated.start, 6);
        assert_eq!(second.selection.start, Position::new(0, 6));
    }

    #[test]
    fn other_lines_do_not_shift() {
        let mut batch = Batch::new();
        batch.push(span(0, 0, "9"), Rendered::plain("100"));
        let other = batch.push(span(1, 4, "5"), Rendered::plain("6")).clone();
        assert_eq!(other.updated.start, 4);
    }

    #[test]
    fn unchanged_batch_emits_nothing() {
        let mut batch = Batch::new();
        batch.push(span(0, 0, "red"), Rendered::plain("red"));
        assert!(batch.commands(TransactionId(1)).is_empty());
        assert_eq!(batch.fingerprint(), vec![span(0, 0, "red")]);
    }
}
