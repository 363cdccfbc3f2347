//! Value dialects: each one knows how to find, decode, move and re-render
//! one family of literals.

pub mod color;
pub mod filter;
pub mod names;
pub mod scalar;

use std::fmt;

use crate::config::Config;
use crate::key::{Direction, Modifiers};
use crate::locate::{Found, Precedence};
use crate::tool::Target;

pub use color::{ColorFormat, ColorRule, ColorValue};
pub use filter::{FilterChain, FilterFunction, FilterRule};
pub use scalar::{ScalarRule, ScalarValue};

/// The coarse family a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Color,
    FilterChain,
    Number,
}

/// A decoded literal, ready to be moved and re-rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Color(ColorValue),
    FunctionChain(FilterChain),
    Scalar(ScalarValue),
}

impl ValueKind {
    /// Start of an edit cycle: forget which components the last one touched.
    pub fn begin_cycle(&mut self) {
        if let ValueKind::FunctionChain(chain) = self {
            chain.clear_changed();
        }
    }
}

/// Where the decoder is looking.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub line: &'a str,
    pub caret: u32,
    pub config: &'a Config,
}

/// One input step, as seen by a rule.
#[derive(Debug, Clone, Copy)]
pub struct Mutation<'a> {
    pub direction: Direction,
    pub modifiers: Modifiers,
    pub target: &'a Target,
}

/// Re-rendered text plus an optional selection hint, in columns relative to
/// the start of `text`. Without a hint the whole replacement is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub hint: Option<(u32, u32)>,
}

impl Rendered {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hint: None,
        }
    }
}

/// One selection's contribution to the feedback overlay. Selections agree
/// when their `key`s are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub name: String,
    pub value: String,
    pub key: String,
}

/// A dialect: locate, decompose, mutate, serialize.
pub trait ValueRule: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> DialectKind;

    fn locate(&self, line: &str, caret: u32) -> Option<Found>;

    /// `None` when the span carries no number this rule can move.
    fn decompose(&self, found: &Found, context: &Context<'_>) -> Option<ValueKind>;

    /// Total: out-of-range results are clamped or wrapped, never rejected.
    fn mutate(&self, value: &mut ValueKind, mutation: &Mutation<'_>);

    fn serialize(&self, value: &ValueKind) -> Rendered;

    fn read(&self, value: &ValueKind, mutation: &Mutation<'_>) -> Option<Reading>;

    /// Whether a bare number under the caret wins over this rule.
    fn defers_to_numbers(&self, _precedence: Precedence) -> bool {
        false
    }
}

/// Index of a rule inside its [`Registry`].
pub type RuleId = usize;

/// Rules in priority order.
#[derive(Debug)]
pub struct Registry {
    rules: Vec<Box<dyn ValueRule>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Hex colors, functional colors, filter chains, named colors, then
    /// bare numbers as the fallback.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Box::new(ColorRule::hex()),
                Box::new(ColorRule::functional()),
                Box::new(FilterRule),
                Box::new(ColorRule::named()),
                Box::new(ScalarRule),
            ],
        }
    }

    pub fn get(&self, id: RuleId) -> Option<&dyn ValueRule> {
        self.rules.get(id).map(|rule| &**rule as &dyn ValueRule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &dyn ValueRule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(id, rule)| (id, &**rule as &dyn ValueRule))
    }

    pub fn first_of(&self, kind: DialectKind) -> Option<RuleId> {
        self.iter()
            .find(|(_, rule)| rule.kind() == kind)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
