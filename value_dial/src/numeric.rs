//! Exact decimal helpers, clamp combinators and the modifier-keyed step tables.
//!
//! Every number the engine writes back into text goes through [`Decimal`] so
//! that a hundred `0.0001` steps land exactly on `0.01` instead of drifting.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::key::Modifiers;

/// Parses a CSS-style number (`12`, `-3.5`, `.5`, `4.`) into an exact decimal.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let dots = digits.bytes().filter(|&b| b == b'.').count();
    if dots > 1
        || !digits.bytes().any(|b| b.is_ascii_digit())
        || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + 2);
    if negative {
        normalized.push('-');
    }
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits.strip_suffix('.').unwrap_or(digits));
    Decimal::from_str(&normalized).ok()
}

/// Shortest text that parses back to the same value: no trailing zeros, no `-0`.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Rounds half away from zero, the way `Math.round` behaves for the
/// non-negative channel values colors use.
pub fn round_to(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

pub fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(6))
        .unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Post-processing applied to a mutated number before it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clamp {
    /// No bounds.
    #[default]
    Free,
    /// Two-sided bound.
    Range { min: Decimal, max: Decimal },
    /// Modular wrap into `[0, period)`.
    Wrap(Decimal),
    /// Floor at zero, no ceiling.
    NonNegative,
}

impl Clamp {
    pub fn range(min: i64, max: i64) -> Self {
        Clamp::Range {
            min: Decimal::from(min),
            max: Decimal::from(max),
        }
    }

    pub fn unit() -> Self {
        Clamp::range(0, 1)
    }

    pub fn wrap(period: i64) -> Self {
        Clamp::Wrap(Decimal::from(period))
    }

    pub fn apply(self, value: Decimal) -> Decimal {
        match self {
            Clamp::Free => value,
            Clamp::Range { min, max } => value.max(min).min(max),
            Clamp::NonNegative => value.max(Decimal::ZERO),
            Clamp::Wrap(period) if period.is_zero() => value,
            Clamp::Wrap(period) => {
                let wrapped = if value < Decimal::ZERO {
                    value % period + period
                } else {
                    value % period
                };
                // -360 wraps to 360 by the formula; keep the result inside [0, period)
                if wrapped == period {
                    Decimal::ZERO
                } else {
                    wrapped
                }
            }
        }
    }
}

/// One entry of a step table. Steps like ⅓ are not finite decimals, so a
/// ratio is kept and divided out on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Exact(i64, u32),
    Ratio(i64, i64),
}

impl Step {
    pub fn value(self) -> Decimal {
        match self {
            Step::Exact(mantissa, scale) => Decimal::new(mantissa, scale),
            Step::Ratio(num, den) => Decimal::from(num) / Decimal::from(den),
        }
    }
}

/// Ordered modifier combinations; the first row whose modifiers are all held
/// wins, so combinations must come before their parts.
#[derive(Debug)]
pub struct StepTable {
    rows: &'static [(Modifiers, Step)],
    fallback: Step,
}

impl StepTable {
    pub const fn new(rows: &'static [(Modifiers, Step)], fallback: Step) -> Self {
        Self { rows, fallback }
    }

    pub fn step(&self, mods: Modifiers) -> Decimal {
        self.rows
            .iter()
            .find(|(required, _)| mods.contains(*required))
            .map_or(self.fallback, |(_, step)| *step)
            .value()
    }
}

const SHIFT: Modifiers = Modifiers::SHIFT;
const CTRL: Modifiers = Modifiers::CTRL;
const ALT: Modifiers = Modifiers::ALT;
const SHIFT_CTRL: Modifiers = SHIFT.union(CTRL);
const SHIFT_ALT: Modifiers = SHIFT.union(ALT);
const CTRL_ALT: Modifiers = CTRL.union(ALT);
const SHIFT_CTRL_ALT: Modifiers = SHIFT_CTRL.union(ALT);

/// Bare numbers.
pub static NUMBER_STEPS: StepTable = StepTable::new(
    &[
        (SHIFT_CTRL_ALT, Step::Exact(1, 4)),
        (SHIFT_CTRL, Step::Exact(1000, 0)),
        (SHIFT_ALT, Step::Exact(1, 3)),
        (SHIFT, Step::Exact(100, 0)),
        (CTRL_ALT, Step::Exact(1, 2)),
        (CTRL, Step::Exact(10, 0)),
        (ALT, Step::Exact(1, 1)),
    ],
    Step::Exact(1, 0),
);

/// Hue, in degrees.
pub static HUE_STEPS: StepTable = StepTable::new(
    &[
        (CTRL_ALT, Step::Exact(25, 2)),
        (SHIFT, Step::Exact(20, 0)),
        (CTRL, Step::Exact(10, 0)),
        (ALT, Step::Exact(1, 0)),
    ],
    Step::Exact(5, 0),
);

/// Saturation and lightness, in percentage points.
pub static PERCENT_STEPS: StepTable = StepTable::new(
    &[
        (SHIFT_ALT, Step::Exact(2, 1)),
        (CTRL_ALT, Step::Ratio(1, 3)),
        (SHIFT, Step::Exact(20, 0)),
        (CTRL, Step::Exact(10, 0)),
        (ALT, Step::Exact(1, 0)),
    ],
    Step::Exact(5, 0),
);

/// Alpha, as a fraction of one.
pub static ALPHA_STEPS: StepTable = StepTable::new(
    &[
        (CTRL_ALT, Step::Exact(1, 3)),
        (SHIFT, Step::Exact(2, 1)),
        (CTRL, Step::Exact(1, 1)),
        (ALT, Step::Exact(1, 2)),
    ],
    Step::Exact(5, 2),
);

/// Filter arguments in `deg`, `grad` or `%`.
pub static FILTER_ANGLE_STEPS: StepTable = StepTable::new(
    &[
        (SHIFT_ALT, Step::Exact(1, 1)),
        (CTRL_ALT, Step::Exact(5, 1)),
        (SHIFT, Step::Exact(20, 0)),
        (CTRL, Step::Exact(10, 0)),
        (ALT, Step::Exact(1, 0)),
    ],
    Step::Exact(5, 0),
);

/// Filter arguments in `px`-sized units.
pub static FILTER_LENGTH_STEPS: StepTable = StepTable::new(
    &[
        (SHIFT_ALT, Step::Exact(1, 3)),
        (CTRL_ALT, Step::Exact(1, 2)),
        (SHIFT, Step::Exact(20, 0)),
        (CTRL, Step::Exact(10, 0)),
        (ALT, Step::Exact(1, 1)),
    ],
    Step::Exact(1, 0),
);

/// Filter arguments in large units (`rem`, `cm`, `rad`, ...).
pub static FILTER_LARGE_UNIT_STEPS: StepTable = StepTable::new(
    &[
        (CTRL_ALT, Step::Exact(1, 3)),
        (SHIFT, Step::Exact(10, 0)),
        (CTRL, Step::Exact(1, 0)),
        (ALT, Step::Exact(1, 2)),
    ],
    Step::Exact(1, 1),
);

/// Unitless filter arguments (`brightness(1.2)`).
pub static FILTER_UNITLESS_STEPS: StepTable = StepTable::new(
    &[
        (CTRL_ALT, Step::Exact(1, 3)),
        (SHIFT, Step::Exact(2, 1)),
        (CTRL, Step::Exact(1, 1)),
        (ALT, Step::Exact(1, 2)),
    ],
    Step::Exact(5, 2),
);
