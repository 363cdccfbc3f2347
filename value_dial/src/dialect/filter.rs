//! CSS `filter` chains: `filter: brightness(120%) blur(2px)`.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::{Context, DialectKind, Mutation, Reading, Rendered, ValueKind, ValueRule};
use crate::key::{Direction, Modifiers};
use crate::locate::{self, Found, Precedence};
use crate::numeric::{
    Clamp, FILTER_ANGLE_STEPS, FILTER_LARGE_UNIT_STEPS, FILTER_LENGTH_STEPS,
    FILTER_UNITLESS_STEPS, StepTable, format_decimal, parse_decimal,
};
use crate::tool::Target;
use crate::types::text_width;

static CHAIN_REGEX: OnceLock<Regex> = OnceLock::new();
static LEAD_REGEX: OnceLock<Regex> = OnceLock::new();

fn chain_regex() -> &'static Regex {
    CHAIN_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)(?:-[a-z\-]+-)?filter(?:[: ]\s?|\s*$)(?:(?:\s*(?:none|initial|inherit|unset))|(?:\s*[a-z\-]+\(([^)]*)\)\s*\)?\s*)*)",
        )
        .expect("Invalid filter chain regex")
    })
}

fn lead_regex() -> &'static Regex {
    LEAD_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^(?:-[a-z\-]+-)?filter[: ]?\s*").expect("Invalid filter keyword regex")
    })
}

const EMPTY_KEYWORDS: [&str; 4] = ["none", "initial", "inherit", "unset"];

/// The filter functions the dial can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterFunction {
    Brightness,
    Contrast,
    Saturate,
    HueRotate,
    Opacity,
    Blur,
}

impl FilterFunction {
    pub const ALL: [FilterFunction; 6] = [
        FilterFunction::Brightness,
        FilterFunction::Contrast,
        FilterFunction::Saturate,
        FilterFunction::HueRotate,
        FilterFunction::Opacity,
        FilterFunction::Blur,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            FilterFunction::Brightness => "brightness",
            FilterFunction::Contrast => "contrast",
            FilterFunction::Saturate => "saturate",
            FilterFunction::HueRotate => "hue-rotate",
            FilterFunction::Opacity => "opacity",
            FilterFunction::Blur => "blur",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|function| function.css_name().eq_ignore_ascii_case(name))
    }

    /// The device's option name for this function.
    pub fn tool_option(self) -> &'static str {
        match self {
            FilterFunction::Brightness => "BrightnessCSSFilter",
            FilterFunction::Contrast => "ContrastCSSFilter",
            FilterFunction::Saturate => "SaturateCSSFilter",
            FilterFunction::HueRotate => "HueRotateCSSFilter",
            FilterFunction::Opacity => "OpacityCSSFilter",
            FilterFunction::Blur => "BlurCSSFilter",
        }
    }

    pub fn from_tool_option(option: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.tool_option() == option)
    }

    /// Argument a freshly inserted call starts from.
    pub fn initial(self) -> (Decimal, &'static str) {
        match self {
            FilterFunction::HueRotate => (Decimal::ZERO, "deg"),
            FilterFunction::Blur => (Decimal::ZERO, "px"),
            _ => (Decimal::ONE_HUNDRED, "%"),
        }
    }

    /// Whether `name(number unit)` is equivalent to leaving the call out.
    pub fn is_identity(self, number: Decimal, unit: &str) -> bool {
        match self {
            FilterFunction::HueRotate | FilterFunction::Blur => number.is_zero(),
            _ if unit == "%" => number == Decimal::ONE_HUNDRED,
            _ => number == Decimal::ONE,
        }
    }

    pub fn clamp(self, unit: &str) -> Clamp {
        match self {
            FilterFunction::HueRotate => Clamp::Free,
            FilterFunction::Opacity if unit == "%" => Clamp::range(0, 100),
            FilterFunction::Opacity => Clamp::unit(),
            _ => Clamp::NonNegative,
        }
    }
}

fn steps_for_unit(unit: &str) -> &'static StepTable {
    match unit.to_ascii_lowercase().as_str() {
        "deg" | "grad" | "%" => &FILTER_ANGLE_STEPS,
        "mm" | "ex" | "pt" | "ch" | "px" => &FILTER_LENGTH_STEPS,
        "rad" | "in" | "cm" | "pc" | "em" | "rem" => &FILTER_LARGE_UNIT_STEPS,
        _ => &FILTER_UNITLESS_STEPS,
    }
}

/// Step for one notch on an argument written in `unit`.
pub fn step_for_unit(unit: &str, modifiers: Modifiers) -> Decimal {
    steps_for_unit(unit).step(modifiers)
}

/// One call in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    /// `None` for functions the dial does not know; those are kept verbatim.
    pub function: Option<FilterFunction>,
    pub name: String,
    /// The call exactly as written.
    pub source: String,
    /// `None` when the argument does not parse.
    pub number: Option<Decimal>,
    pub unit: String,
    /// Touched during the current edit cycle.
    pub changed: bool,
}

impl FilterNode {
    fn parse(call: &str) -> Self {
        let open = call.find('(').unwrap_or(call.len());
        let name = call[..open].trim().to_string();
        let args = call
            .get(open + 1..)
            .map(|rest| rest.strip_suffix(')').unwrap_or(rest).trim())
            .unwrap_or_default();

        let split = args
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(args.len());
        let (digits, unit) = args.split_at(split);
        let unit_ok = unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%');
        let number = if unit_ok { parse_decimal(digits) } else { None };

        Self {
            function: FilterFunction::from_css_name(&name),
            name,
            source: call.to_string(),
            number,
            unit: if number.is_some() {
                unit.to_string()
            } else {
                String::new()
            },
            changed: false,
        }
    }

    fn synthesized(function: FilterFunction) -> Self {
        let (number, unit) = function.initial();
        let source = format!("{}({}{unit})", function.css_name(), format_decimal(number));
        Self {
            function: Some(function),
            name: function.css_name().to_string(),
            source,
            number: Some(number),
            unit: unit.to_string(),
            changed: false,
        }
    }

    fn is_identity(&self) -> bool {
        match (self.function, self.number) {
            (Some(function), Some(number)) => function.is_identity(number, &self.unit),
            _ => false,
        }
    }

    fn render(&self) -> String {
        match (self.function, self.number) {
            (Some(_), Some(number)) => {
                format!("{}({}{})", self.name, format_decimal(number), self.unit)
            }
            _ => self.source.clone(),
        }
    }

    /// Unitless arguments compare against percentages at one hundred to one.
    fn comparison_key(&self) -> Option<String> {
        let number = self.number?;
        Some(if self.unit.is_empty() {
            format!("{}%", format_decimal(number.checked_mul(Decimal::ONE_HUNDRED)?))
        } else {
            format!("{}{}", format_decimal(number), self.unit)
        })
    }
}

/// A decoded `filter` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    /// Property keyword and separator, verbatim.
    lead: String,
    /// Whether a space must be added after `lead` before the first call.
    pad_lead: bool,
    pub nodes: Vec<FilterNode>,
    trailing: String,
    source: String,
    edited: bool,
}

impl FilterChain {
    pub fn parse(text: &str) -> Self {
        let lead_len = lead_regex().find(text).map_or(0, |m| m.end());
        let (lead, rest) = text.split_at(lead_len);
        let body = rest.trim_end();
        let trailing = &rest[body.len()..];

        let is_keyword = EMPTY_KEYWORDS
            .iter()
            .any(|keyword| body.eq_ignore_ascii_case(keyword));
        let nodes = if is_keyword {
            Vec::new()
        } else {
            split_calls(body).into_iter().map(FilterNode::parse).collect()
        };

        Self {
            lead: lead.to_string(),
            pad_lead: !lead.ends_with(char::is_whitespace)
                && (!lead.ends_with(':') || body.is_empty()),
            nodes,
            trailing: trailing.to_string(),
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

    pub fn clear_changed(&mut self) {
        for node in &mut self.nodes {
            node.changed = false;
        }
    }

    pub fn changed_node(&self) -> Option<&FilterNode> {
        self.nodes.iter().find(|node| node.changed)
    }

    /// Moves `function` by one step, appending it at its initial value first
    /// when the chain does not contain it.
    pub fn apply(&mut self, function: FilterFunction, direction: Direction, modifiers: Modifiers) {
        let index = match self
            .nodes
            .iter()
            .position(|node| node.function == Some(function))
        {
            Some(index) => index,
            None => {
                self.nodes.push(FilterNode::synthesized(function));
                self.nodes.len() - 1
            }
        };

        let node = &mut self.nodes[index];
        let Some(number) = node.number else {
            return;
        };
        let delta = step_for_unit(&node.unit, modifiers) * Decimal::from(direction.signum());
        let Some(moved) = number.checked_add(delta) else {
            return;
        };
        let updated = function.clamp(&node.unit).apply(moved);

        node.number = Some(updated);
        node.changed = true;
        self.edited |= updated != number;
    }

    /// Keyword followed by every non-identity call; `none` when nothing
    /// remains. The hint covers the first edited call still shown, else the
    /// first shown call, else sits right after the keyword.
    pub fn render(&self) -> Rendered {
        if !self.edited {
            return Rendered::plain(self.source.clone());
        }

        let mut text = self.lead.clone();
        if self.pad_lead {
            text.push(' ');
        }
        let body_start = text_width(&text);

        let mut first_shown = None;
        let mut first_changed = None;
        let mut shown = 0usize;
        for node in self.nodes.iter().filter(|node| !node.is_identity()) {
            if shown > 0 {
                text.push(' ');
            }
            let start = text_width(&text);
            text.push_str(&node.render());
            let span = (start, text_width(&text));
            first_shown.get_or_insert(span);
            if node.changed {
                first_changed.get_or_insert(span);
            }
            shown += 1;
        }

        if shown == 0 {
            text.push_str("none");
        }
        text.push_str(&self.trailing);

        let hint = first_changed
            .or(first_shown)
            .unwrap_or((body_start, body_start));
        Rendered {
            text,
            hint: Some(hint),
        }
    }
}

/// Splits `a(1) b(c(2) 3)` into top-level calls.
fn split_calls(body: &str) -> Vec<&str> {
    let mut calls = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(from) = start.take()
                {
                    calls.push(&body[from..=i]);
                }
            }
            c if depth == 0 && c.is_whitespace() => {}
            _ if start.is_none() && depth == 0 => start = Some(i),
            _ => {}
        }
    }
    if let Some(from) = start {
        calls.push(body[from..].trim_end());
    }
    calls
}

/// The `filter` declaration dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterRule;

impl ValueRule for FilterRule {
    fn name(&self) -> &'static str {
        "filter-chain"
    }

    fn kind(&self) -> DialectKind {
        DialectKind::FilterChain
    }

    fn locate(&self, line: &str, caret: u32) -> Option<Found> {
        locate::find_at(chain_regex(), line, caret)
    }

    fn decompose(&self, found: &Found, _context: &Context<'_>) -> Option<ValueKind> {
        Some(ValueKind::FunctionChain(FilterChain::parse(&found.text)))
    }

    fn mutate(&self, value: &mut ValueKind, mutation: &Mutation<'_>) {
        if let (ValueKind::FunctionChain(chain), Target::Filter(function)) =
            (value, mutation.target)
        {
            chain.apply(*function, mutation.direction, mutation.modifiers);
        }
    }

    fn serialize(&self, value: &ValueKind) -> Rendered {
        match value {
            ValueKind::FunctionChain(chain) => chain.render(),
            ValueKind::Color(color) => Rendered::plain(color.source().to_string()),
            ValueKind::Scalar(scalar) => Rendered::plain(scalar.source().to_string()),
        }
    }

    fn read(&self, value: &ValueKind, _mutation: &Mutation<'_>) -> Option<Reading> {
        let ValueKind::FunctionChain(chain) = value else {
            return None;
        };
        let node = chain.changed_node()?;
        let function = node.function?;
        Some(Reading {
            name: function.tool_option().to_string(),
            value: format_decimal(node.number?),
            key: node.comparison_key()?,
        })
    }

    fn defers_to_numbers(&self, precedence: Precedence) -> bool {
        precedence.numbers_over_filters
    }
}
