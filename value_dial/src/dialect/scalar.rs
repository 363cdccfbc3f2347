//! Bare numbers with an optional unit, and the constructs around them that
//! decide how far and how far only they may move.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::{Context, DialectKind, Mutation, Reading, Rendered, ValueKind, ValueRule};
use crate::config::Config;
use crate::key::{Direction, Modifiers};
use crate::locate::{self, Found};
use crate::numeric::{Clamp, NUMBER_STEPS, format_decimal, parse_decimal};
use crate::tool::Target;

static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();
static CONSTRUCTS: OnceLock<Vec<(Construct, Regex)>> = OnceLock::new();
static PERCENT_VALUES: OnceLock<Regex> = OnceLock::new();
static UNIT_VALUES: OnceLock<Regex> = OnceLock::new();
static SMALL_UNIT: OnceLock<Regex> = OnceLock::new();
static LIST_SEPARATOR: OnceLock<Regex> = OnceLock::new();

fn number_regex() -> &'static Regex {
    NUMBER_REGEX.get_or_init(|| {
        Regex::new(r"-?[0-9]*\.?[0-9]+[a-zA-Z%]*").expect("Invalid number regex")
    })
}

fn leading_number() -> &'static Regex {
    LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^\s*(-?[0-9]*\.?[0-9]+)([a-zA-Z%]*)").expect("Invalid leading number regex")
    })
}

fn percent_values() -> &'static Regex {
    PERCENT_VALUES.get_or_init(|| Regex::new(r"[0-9.]+%?").expect("Invalid value list regex"))
}

fn unit_values() -> &'static Regex {
    UNIT_VALUES.get_or_init(|| Regex::new(r"(?i)[0-9.]+[a-z]+").expect("Invalid unit list regex"))
}

fn small_unit() -> &'static Regex {
    SMALL_UNIT.get_or_init(|| {
        Regex::new(r"(?i)-?[0-9]*\.?[0-9]+(?:em|rem|cm|pc|turn|rad)")
            .expect("Invalid small unit regex")
    })
}

fn list_separator() -> &'static Regex {
    LIST_SEPARATOR.get_or_init(|| Regex::new(r"\s*,\s*|\s+").expect("Invalid separator regex"))
}

/// The number literal under `caret`, unit included.
pub fn number_at(line: &str, caret: u32) -> Option<Found> {
    locate::find_at(number_regex(), line, caret)
}

/// Whether `line` holds any number at all.
pub fn has_number(line: &str) -> bool {
    number_regex().is_match(line)
}

/// How a notch step is rescaled for a number in some construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepScale {
    #[default]
    Plain,
    /// A tenth of the step, kept within `[0.0001, 1]`.
    Small,
    /// A tenth of the step.
    Tenth,
    TimesTen,
}

impl StepScale {
    pub fn apply(self, step: Decimal) -> Decimal {
        let ten = Decimal::TEN;
        match self {
            StepScale::Plain => step,
            StepScale::Small => (step / ten).min(Decimal::ONE).max(Decimal::new(1, 4)),
            StepScale::Tenth => step / ten,
            StepScale::TimesTen => step * ten,
        }
    }
}

/// Which config switch turns a construct's step scaling off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScaleClass {
    Units,
    Other,
}

/// Clamp and step scaling picked from the surrounding construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalarPolicy {
    pub clamp: Clamp,
    pub scale: StepScale,
}

impl ScalarPolicy {
    pub fn step(&self, modifiers: Modifiers) -> Decimal {
        self.scale.apply(NUMBER_STEPS.step(modifiers))
    }

    /// The policy for the number at `caret`.
    pub fn at(line: &str, caret: u32, config: &Config) -> Self {
        constructs()
            .iter()
            .find_map(|(construct, regex)| {
                locate::find_at(regex, line, caret)
                    .map(|found| construct.policy(&found, found.caret_offset(line, caret), config))
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct {
    Rgb,
    Hsl,
    CubicBezier,
    Linear,
    LengthFilter,
    SmallUnit,
    Milliseconds,
    Seconds,
    SingleFilter,
    Transform,
    Rotate3d,
}

fn constructs() -> &'static [(Construct, Regex)] {
    CONSTRUCTS.get_or_init(|| {
        [
            (Construct::Rgb, r"(?i)rgba?\([0-9, %.]+\)"),
            (Construct::Hsl, r"(?i)hsla?\([0-9, %.\-]+\)"),
            (Construct::CubicBezier, r"(?i)cubic-bezier\([0-9, .\-]+\)"),
            (Construct::Linear, r"(?i)linear\([0-9, %.\-]+\)"),
            (
                Construct::LengthFilter,
                r"(?i)blur\(\s*[0-9.]+[^)]+\)|drop-shadow\([^)]+\)\s*\)?",
            ),
            (
                Construct::SmallUnit,
                r"(?i)-?[0-9]*\.?[0-9]+(?:em|rem|cm|pc|turn|rad)",
            ),
            (Construct::Milliseconds, r"(?i)-?[0-9]*\.?[0-9]+ms"),
            (Construct::Seconds, r"(?i)-?[0-9]*\.?[0-9]+s"),
            (
                Construct::SingleFilter,
                r"(?i)(?:brightness|contrast|grayscale|invert|opacity|saturate|sepia)\(\s*[0-9.]+%?\s*\)",
            ),
            (
                Construct::Transform,
                r"(?i)(?:scale|scalex|scaley|scalez|scale3d|matrix|matrix3d)\([0-9, .\-]+\)",
            ),
            (
                Construct::Rotate3d,
                r"(?i)rotate3d\([0-9, .\-]+(?:turn|deg|rad|grad)\s*\)",
            ),
        ]
        .into_iter()
        .map(|(construct, pattern)| {
            (
                construct,
                Regex::new(pattern).expect("Invalid number context regex"),
            )
        })
        .collect()
    })
}

/// Index of the list item at `offset`: separators that start before it.
fn position_before(offset: usize, separators: impl Iterator<Item = usize>) -> usize {
    separators.filter(|&index| index < offset).count()
}

fn comma_position(text: &str, offset: usize) -> usize {
    position_before(offset, text.match_indices(',').map(|(i, _)| i))
}

fn is_percent_at(text: &str, position: usize) -> bool {
    percent_values()
        .find_iter(text)
        .nth(position)
        .is_some_and(|m| m.as_str().ends_with('%'))
}

impl Construct {
    fn class(self) -> ScaleClass {
        match self {
            Construct::SmallUnit | Construct::Milliseconds | Construct::Seconds => {
                ScaleClass::Units
            }
            _ => ScaleClass::Other,
        }
    }

    fn policy(self, found: &Found, offset: usize, config: &Config) -> ScalarPolicy {
        let text = found.text.as_str();
        let position = comma_position(text, offset);
        let percent = is_percent_at(text, position);
        let percent_or = |otherwise: Clamp| {
            if percent {
                Clamp::range(0, 100)
            } else {
                otherwise
            }
        };
        let small_unless_percent = if percent {
            StepScale::Plain
        } else {
            StepScale::Small
        };

        let (clamp, scale) = match self {
            Construct::Rgb if position < 3 => (percent_or(Clamp::range(0, 255)), StepScale::Plain),
            Construct::Rgb => (percent_or(Clamp::unit()), small_unless_percent),
            Construct::Hsl => match position {
                0 => (Clamp::wrap(360), StepScale::Plain),
                3 => (percent_or(Clamp::unit()), small_unless_percent),
                _ => (Clamp::range(0, 100), StepScale::Plain),
            },
            Construct::CubicBezier => {
                let clamp = if position == 0 || position == 2 {
                    Clamp::unit()
                } else {
                    Clamp::Free
                };
                (clamp, StepScale::Small)
            }
            Construct::Linear => {
                let position = position_before(
                    offset,
                    list_separator().find_iter(text).map(|m| m.start()),
                );
                let scale = if is_percent_at(text, position) {
                    StepScale::Plain
                } else {
                    StepScale::Tenth
                };
                (Clamp::Free, scale)
            }
            Construct::LengthFilter => length_filter_policy(text, offset),
            Construct::SmallUnit | Construct::Seconds => (Clamp::Free, StepScale::Tenth),
            Construct::Milliseconds => (Clamp::Free, StepScale::TimesTen),
            Construct::SingleFilter => {
                let lower = text.to_ascii_lowercase();
                let bounded = ["sepia", "opacity", "grayscale", "invert"]
                    .iter()
                    .any(|name| lower.starts_with(name));
                let clamp = if bounded {
                    percent_or(Clamp::unit())
                } else {
                    Clamp::NonNegative
                };
                (clamp, small_unless_percent)
            }
            Construct::Transform => (Clamp::Free, StepScale::Small),
            Construct::Rotate3d => {
                let lower = text.to_ascii_lowercase();
                let scale = match position {
                    0..=2 => StepScale::Small,
                    3 if lower.contains("turn") || lower.contains("rad") => StepScale::Tenth,
                    _ => StepScale::Plain,
                };
                (Clamp::Free, scale)
            }
        };

        let enabled = match self.class() {
            ScaleClass::Units => config.units_step,
            ScaleClass::Other => config.other_step,
        };
        ScalarPolicy {
            clamp,
            scale: if enabled { scale } else { StepScale::Plain },
        }
    }
}

/// `blur(r)` never goes negative; in `drop-shadow(x y r color)` only the
/// blur radius is floored. Small units step by a tenth.
fn length_filter_policy(text: &str, offset: usize) -> (Clamp, StepScale) {
    let is_small = |index: usize| {
        unit_values()
            .find_iter(text)
            .nth(index)
            .is_some_and(|m| small_unit().is_match(m.as_str()))
    };

    if text.trim_start().to_ascii_lowercase().starts_with("drop-shadow") {
        let values_start = text.find(|c: char| c.is_ascii_digit()).unwrap_or(0);
        let position = position_before(
            offset,
            text.match_indices(' ')
                .map(|(i, _)| i)
                .filter(|&i| i >= values_start),
        );
        let clamp = if position == 2 {
            Clamp::NonNegative
        } else {
            Clamp::Free
        };
        let scale = if is_small(position) {
            StepScale::Tenth
        } else {
            StepScale::Plain
        };
        return (clamp, scale);
    }

    let scale = if is_small(0) {
        StepScale::Tenth
    } else {
        StepScale::Plain
    };
    (Clamp::NonNegative, scale)
}

/// A decoded number.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue {
    /// `None` when the text does not start with a number.
    pub number: Option<Decimal>,
    pub unit: String,
    /// Whatever followed the unit in a hand-made selection, kept as-is.
    suffix: String,
    pub policy: ScalarPolicy,
    /// Negative when first decoded; cross mode moves it away from zero.
    pub negative_at_start: bool,
    source: String,
    edited: bool,
}

impl ScalarValue {
    pub fn parse(text: &str, policy: ScalarPolicy) -> Self {
        let captures = leading_number().captures(text);
        let number = captures
            .as_ref()
            .and_then(|c| c.get(1))
            .and_then(|m| parse_decimal(m.as_str()));
        let (unit, suffix) = match captures.as_ref().and_then(|c| c.get(0).zip(c.get(2))) {
            Some((whole, unit)) => (unit.as_str().to_string(), text[whole.end()..].to_string()),
            None => (String::new(), String::new()),
        };

        Self {
            number,
            unit,
            suffix,
            policy,
            negative_at_start: text.trim_start().starts_with('-'),
            source: text.to_string(),
            edited: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// One notch; `cross` turns the direction around for numbers that
    /// started out negative.
    pub fn apply(&mut self, direction: Direction, modifiers: Modifiers, cross: bool) {
        let Some(number) = self.number else {
            return;
        };
        let direction = if cross && self.negative_at_start {
            direction.flipped()
        } else {
            direction
        };
        let delta = self.policy.step(modifiers) * Decimal::from(direction.signum());
        let Some(moved) = number.checked_add(delta) else {
            return;
        };
        let updated = self.policy.clamp.apply(moved);

        self.number = Some(updated);
        self.edited |= updated != number;
    }

    pub fn render(&self) -> String {
        match self.number {
            Some(number) if self.edited => {
                let leading = &self.source[..self.source.len() - self.source.trim_start().len()];
                format!(
                    "{leading}{}{}{}",
                    format_decimal(number),
                    self.unit,
                    self.suffix
                )
            }
            _ => self.source.clone(),
        }
    }
}

/// Bare numbers, the fallback dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarRule;

impl ValueRule for ScalarRule {
    fn name(&self) -> &'static str {
        "number"
    }

    fn kind(&self) -> DialectKind {
        DialectKind::Number
    }

    fn locate(&self, line: &str, caret: u32) -> Option<Found> {
        number_at(line, caret)
    }

    fn decompose(&self, found: &Found, context: &Context<'_>) -> Option<ValueKind> {
        let policy = ScalarPolicy::at(context.line, context.caret, context.config);
        Some(ValueKind::Scalar(ScalarValue::parse(&found.text, policy)))
    }

    fn mutate(&self, value: &mut ValueKind, mutation: &Mutation<'_>) {
        if let (ValueKind::Scalar(scalar), Target::Number(options)) = (value, mutation.target) {
            scalar.apply(mutation.direction, mutation.modifiers, options.cross);
        }
    }

    fn serialize(&self, value: &ValueKind) -> Rendered {
        match value {
            ValueKind::Scalar(scalar) => Rendered::plain(scalar.render()),
            ValueKind::Color(color) => Rendered::plain(color.source().to_string()),
            ValueKind::FunctionChain(chain) => Rendered::plain(chain.source().to_string()),
        }
    }

    fn read(&self, value: &ValueKind, mutation: &Mutation<'_>) -> Option<Reading> {
        let ValueKind::Scalar(scalar) = value else {
            return None;
        };
        let step = format_decimal(scalar.policy.step(mutation.modifiers));
        Some(Reading {
            name: String::new(),
            value: format!("\u{00B1}{step}"),
            key: step,
        })
    }
}
