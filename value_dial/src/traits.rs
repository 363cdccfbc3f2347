use crate::types::{Command, Feedback, Range, Replacement, TransactionId};

/// Read access to the host's document.
pub trait TextSource {
    /// Contents of `line` without its line terminator.
    fn line(&self, line: u32) -> Option<String>;

    /// Current selections in document order. Carets are empty ranges.
    fn selections(&self) -> Vec<Range>;
}

/// Write access to the host's document.
pub trait EditSink {
    /// Apply every replacement as one atomic edit; ranges are pre-edit.
    fn replace_spans(&mut self, edits: &[Replacement], transaction: TransactionId);

    fn set_selections(&mut self, selections: &[Range], transaction: TransactionId);

    // hosts without an overlay can ignore feedback
    fn update_feedback(&mut self, _feedback: &Feedback) {}
}

/// Run engine commands against a host.
pub fn apply_commands<S: EditSink + ?Sized>(sink: &mut S, commands: &[Command]) {
    for command in commands {
        match command {
            Command::ReplaceSpans { edits, transaction } => {
                sink.replace_spans(edits, *transaction);
            }
            Command::SetSelections {
                selections,
                transaction,
            } => sink.set_selections(selections, *transaction),
            Command::UpdateFeedback(feedback) => sink.update_feedback(feedback),
        }
    }
}
