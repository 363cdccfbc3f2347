use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use value_dial::traits::{EditSink, TextSource};
use value_dial::types::{Feedback, Position, Range, Replacement, TransactionId};

/// A rope-backed host: applies replacements, tracks selections and records
/// every feedback update.
pub struct MockBuffer {
    rope: Rope,
    selections: Vec<Range>,
    pub feedback: Vec<Feedback>,
    pub transactions: Vec<TransactionId>,
}

impl MockBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selections: vec![Range::caret(Position::ZERO)],
            feedback: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Places carets at `(line, col)` pairs.
    pub fn with_carets(mut self, carets: &[(u32, u32)]) -> Self {
        self.selections = carets
            .iter()
            .map(|&(line, col)| Range::caret(Position::new(line, col)))
            .collect();
        self
    }

    pub fn with_selections(mut self, selections: &[Range]) -> Self {
        self.selections = selections.to_vec();
        self
    }

    pub fn select(&mut self, selections: &[Range]) {
        self.selections = selections.to_vec();
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn line_str(&self, line: u32) -> String {
        if line as usize >= self.rope.len_lines() {
            return String::new();
        }
        let mut s = self.rope.line(line as usize).to_string();
        // Remove trailing newline if present
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    pub fn current_selections(&self) -> &[Range] {
        &self.selections
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.feedback.last()
    }

    fn char_index(&self, pos: Position) -> usize {
        let line = self.line_str(pos.line);
        let chars_before: usize = line
            .graphemes(true)
            .take(pos.col as usize)
            .map(|g| g.chars().count())
            .sum();
        self.rope.line_to_char(pos.line as usize) + chars_before
    }
}

impl TextSource for MockBuffer {
    fn line(&self, line: u32) -> Option<String> {
        if line as usize >= self.rope.len_lines() {
            return None;
        }
        Some(self.line_str(line))
    }

    fn selections(&self) -> Vec<Range> {
        self.selections.clone()
    }
}

impl EditSink for MockBuffer {
    fn replace_spans(&mut self, edits: &[Replacement], transaction: TransactionId) {
        // ranges are pre-edit, so apply from the end backwards
        let mut ordered: Vec<_> = edits.iter().collect();
        ordered.sort_by_key(|edit| std::cmp::Reverse(edit.range.start));
        for edit in ordered {
            let start = self.char_index(edit.range.start);
            let end = self.char_index(edit.range.end);
            self.rope.remove(start..end);
            self.rope.insert(start, &edit.text);
        }
        self.transactions.push(transaction);
    }

    fn set_selections(&mut self, selections: &[Range], _transaction: TransactionId) {
        self.selections = selections.to_vec();
    }

    fn update_feedback(&mut self, feedback: &Feedback) {
        self.feedback.push(feedback.clone());
    }
}
