//! State kept between input events of one continuous interaction.

use std::time::{Duration, Instant};

use crate::dialect::{DialectKind, ValueKind};
use crate::key::Modifiers;
use crate::tool::Target;
use crate::types::{Span, TransactionId};

/// A cancel-and-reschedule deadline. At most one is pending at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clears the timer and returns `true` once its deadline has passed.
    #[must_use]
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What one selection decoded to. `value` is `None` when the span had no
/// number the rule could move.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub kind: DialectKind,
    pub value: Option<ValueKind>,
}

/// Per-interaction state: decoded values per selection slot, the
/// fingerprint guarding them, palette position and the two timers.
///
/// Owned by the host and handed to the engine with every event.
#[derive(Debug, Default)]
pub struct EditSession {
    slots: Vec<Option<Slot>>,
    fingerprint: Option<Vec<Span>>,
    palette_index: Option<usize>,
    last_transaction: u64,
    target: Option<Target>,
    modifiers: Modifiers,
    pub feedback_timer: Timer,
    pub forget_timer: Timer,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the decoded state only if `spans` is exactly what the previous
    /// batch left behind. Returns whether it was kept.
    pub fn sync(&mut self, spans: &[Span]) -> bool {
        let same = self.fingerprint.as_deref() == Some(spans);
        if !same {
            if self.fingerprint.is_some() {
                tracing::debug!(spans = spans.len(), "selection changed, dropping decoded values");
            }
            self.slots.clear();
            self.palette_index = None;
        }
        self.slots.resize(spans.len(), None);
        same
    }

    pub fn store_fingerprint(&mut self, spans: Vec<Span>) {
        self.fingerprint = Some(spans);
    }

    pub fn fingerprint(&self) -> Option<&[Span]> {
        self.fingerprint.as_deref()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The slot at `index` if it holds a value of `kind`; anything else is
    /// dropped and rebuilt by `decode`. A color that changed lexical family
    /// (hex rendered as `rgba(...)`) keeps its slot.
    pub fn slot_or_insert_with(
        &mut self,
        index: usize,
        kind: DialectKind,
        decode: impl FnOnce() -> Option<ValueKind>,
    ) -> &mut Slot {
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        let entry = &mut self.slots[index];
        if entry.as_ref().is_none_or(|slot| slot.kind != kind) {
            *entry = Some(Slot {
                kind,
                value: decode(),
            });
        }
        entry.get_or_insert_with(|| Slot { kind, value: None })
    }

    pub fn palette_index(&self) -> Option<usize> {
        self.palette_index
    }

    pub fn set_palette_index(&mut self, index: usize) {
        self.palette_index = Some(index);
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    /// The tool option the device currently reports.
    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn next_transaction(&mut self) -> TransactionId {
        self.last_transaction += 1;
        TransactionId(self.last_transaction)
    }

    pub fn has_state(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Drops decoded values; the next event decodes from the text again.
    pub fn forget(&mut self) {
        if self.fingerprint.is_some() {
            tracing::debug!("forgetting decoded values");
        }
        self.slots.clear();
        self.fingerprint = None;
        self.palette_index = None;
    }

    /// Interaction over: drop everything and stop both timers.
    pub fn end(&mut self) {
        self.forget();
        self.feedback_timer.cancel();
        self.forget_timer.cancel();
        self.target = None;
    }
}
