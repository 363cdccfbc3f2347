use crate::tool::Target;

bitflags::bitflags! {
    /// Keyboard modifier flags held while the dial turns.
    ///
    /// These can be combined; step tables pick their magnitude from the
    /// combination that is held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

/// Which way a value moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Increase => Direction::Decrease,
            Direction::Decrease => Direction::Increase,
        }
    }

    /// `1` or `-1`, for scaling a step.
    pub fn signum(self) -> i64 {
        match self {
            Direction::Increase => 1,
            Direction::Decrease => -1,
        }
    }
}

/// One turn report from the dial.
///
/// `notch_delta` counts physical detents, `raw_delta` is the continuous
/// rotation. Only reports carrying both move a value; anything else is a
/// refresh signal the engine ignores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub raw_delta: f64,
    pub notch_delta: i32,
    /// Modifier snapshot valid at the moment of the turn.
    pub modifiers: Modifiers,
    /// What the active tool option edits.
    pub target: Target,
}

impl InputEvent {
    pub fn new(target: Target, notch_delta: i32, raw_delta: f64) -> Self {
        Self {
            raw_delta,
            notch_delta,
            modifiers: Modifiers::empty(),
            target,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The direction of a value-changing report, `None` for refresh-only ones.
    pub fn direction(&self) -> Option<Direction> {
        if self.notch_delta == 0 || self.raw_delta == 0.0 || self.raw_delta.is_nan() {
            return None;
        }
        Some(if self.notch_delta > 0 {
            Direction::Increase
        } else {
            Direction::Decrease
        })
    }
}
