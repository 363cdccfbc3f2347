//! Color literals: hex, `rgb[a]()`, `hsl[a]()`, keywords and `transparent`.
//!
//! Internally a color is hue/saturation/lightness/alpha. Hue and saturation
//! each carry a [`Channel`] that keeps their last meaningful value while the
//! live color cannot express it (lightness at 0 or 1, saturation at 0).

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::names::{self, TRANSPARENT};
use super::{Context, DialectKind, Mutation, Reading, Rendered, ValueKind, ValueRule};
use crate::key::Direction;
use crate::locate::{self, Found, Precedence};
use crate::numeric::{
    ALPHA_STEPS, Clamp, HUE_STEPS, PERCENT_STEPS, format_decimal, from_f64, parse_decimal,
    round_to, to_f64,
};
use crate::tool::{ColorChannel, Target};

static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
static FUNCTIONAL_REGEX: OnceLock<Regex> = OnceLock::new();

fn hex_regex() -> &'static Regex {
    HEX_REGEX.get_or_init(|| {
        Regex::new(r"(?i)#[0-9a-f]{8}|#[0-9a-f]{6}|#[0-9a-f]{4}|#[0-9a-f]{3}")
            .expect("Invalid hex color regex")
    })
}

fn functional_regex() -> &'static Regex {
    FUNCTIONAL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)rgba?\([0-9, %.]+\)|hsla?\([0-9, %.\-]+\)")
            .expect("Invalid functional color regex")
    })
}

/// The lexical shape a color was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Hex3,
    Hex4,
    Hex6,
    Hex8,
    Rgb,
    Rgba,
    Hsl,
    Hsla,
    Named,
}

/// Hue or saturation, with memory of the value the live color lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    value: Decimal,
    degenerate: bool,
}

impl Channel {
    fn new(value: Decimal, degenerate: bool) -> Self {
        Self { value, degenerate }
    }

    /// The value edits start from.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// What the color itself currently expresses for this channel.
    pub fn live(&self) -> Decimal {
        if self.degenerate {
            Decimal::ZERO
        } else {
            self.value
        }
    }

    /// The value held on to while the live color cannot express it.
    pub fn remembered(&self) -> Option<Decimal> {
        self.degenerate.then_some(self.value)
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Style {
    uppercase: bool,
    separator: &'static str,
}

/// A decoded color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorValue {
    pub hue: Channel,
    pub saturation: Channel,
    /// In `[0, 1]`.
    pub lightness: Decimal,
    /// Floors at zero; values above one are kept and clamped when rendered.
    pub alpha: Decimal,
    pub format: ColorFormat,
    style: Style,
    source: String,
    edited: bool,
}

fn is_boundary(lightness: Decimal) -> bool {
    lightness.is_zero() || lightness == Decimal::ONE
}

impl ColorValue {
    /// Decodes any supported color literal. `None` when a required channel
    /// does not parse.
    pub fn decode(text: &str) -> Option<Self> {
        let lower = text.trim().to_ascii_lowercase();

        if lower == TRANSPARENT {
            return Some(Self::from_rgb(
                [0.0; 3],
                Decimal::ZERO,
                ColorFormat::Named,
                text,
            ));
        }
        if let Some(digits) = lower.strip_prefix('#') {
            return decode_hex(digits, text);
        }
        if let Some((name, args)) = split_call(&lower) {
            return match name {
                "rgb" | "rgba" => decode_rgb(name, args, text),
                "hsl" | "hsla" => decode_hsl(name, args, text),
                _ => None,
            };
        }
        let (_, rgb) = names::lookup(&lower)?;
        Some(Self::from_rgb(
            unpack(rgb),
            Decimal::ONE,
            ColorFormat::Named,
            text,
        ))
    }

    /// `literal` marks hue and saturation as written in an `hsl()` literal;
    /// those are remembered as-is even when the live color drops them.
    fn from_hsl(
        (hue, saturation, lightness): (Decimal, Decimal, Decimal),
        alpha: Decimal,
        literal: bool,
        format: ColorFormat,
        source: &str,
    ) -> Self {
        let boundary = is_boundary(lightness);
        let hue_degenerate = boundary || hue.is_zero();
        let saturation_degenerate = boundary || saturation.is_zero();
        let forget = |value: Decimal, degenerate: bool| {
            if degenerate && !literal {
                Decimal::ZERO
            } else {
                value
            }
        };

        Self {
            hue: Channel::new(forget(hue, hue_degenerate), hue_degenerate),
            saturation: Channel::new(
                forget(saturation, saturation_degenerate),
                saturation_degenerate,
            ),
            lightness,
            alpha,
            format,
            style: detect_style(source, format),
            source: source.to_string(),
            edited: false,
        }
    }

    fn from_rgb(rgb: [f64; 3], alpha: Decimal, format: ColorFormat, source: &str) -> Self {
        Self::from_hsl(rgb_to_hsl(rgb[0], rgb[1], rgb[2]), alpha, false, format, source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// 8-bit RGB of the live color.
    pub fn to_rgb(&self) -> [u8; 3] {
        let (r, g, b) = hsl_to_rgb(
            to_f64(self.hue.value),
            to_f64(self.saturation.live()),
            to_f64(self.lightness),
        );
        [r, g, b].map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    /// Whether two literals denote the same visible color.
    pub fn same_color(&self, other: &ColorValue) -> bool {
        self.to_rgb() == other.to_rgb()
            && round_to(self.rendered_alpha(), 2) == round_to(other.rendered_alpha(), 2)
    }

    fn rendered_alpha(&self) -> Decimal {
        self.alpha.min(Decimal::ONE).max(Decimal::ZERO)
    }

    /// Moves one channel by one step. Predefined is handled by the engine.
    pub fn apply(&mut self, channel: ColorChannel, direction: Direction, delta: Decimal) {
        let before = (
            self.hue.value,
            self.saturation.value,
            self.lightness,
            self.alpha,
        );
        let delta = delta * Decimal::from(direction.signum());

        match channel {
            ColorChannel::Hue => {
                self.hue.value = Clamp::wrap(360).apply(self.hue.value + delta);
                self.settle();
            }
            ColorChannel::Saturation => {
                self.saturation.value =
                    Clamp::unit().apply(self.saturation.value + delta / Decimal::ONE_HUNDRED);
                self.settle();
            }
            ColorChannel::Lightness => {
                self.lightness = Clamp::unit().apply(self.lightness + delta / Decimal::ONE_HUNDRED);
                self.settle();
            }
            ColorChannel::Alpha => {
                self.alpha = Clamp::NonNegative.apply(self.alpha + delta);
            }
            ColorChannel::Predefined => {}
        }

        let after = (
            self.hue.value,
            self.saturation.value,
            self.lightness,
            self.alpha,
        );
        self.edited |= before != after;
    }

    /// Re-derives degeneracy from the current channels.
    fn settle(&mut self) {
        let boundary = is_boundary(self.lightness);
        self.saturation.degenerate = boundary || self.saturation.value.is_zero();
        self.hue.degenerate =
            boundary || self.saturation.value.is_zero() || self.hue.value.is_zero();
    }

    /// The literal in its original format. Unedited values render as the
    /// exact source text.
    pub fn render(&self) -> String {
        if !self.edited {
            return self.source.clone();
        }
        let text = match self.format {
            ColorFormat::Hex3 | ColorFormat::Hex6 if self.rendered_alpha() < Decimal::ONE => {
                // Hex digit case does not carry over to `rgba(`.
                return self.rgb_string(false);
            }
            ColorFormat::Hex3 => self.hex_string(false, true),
            ColorFormat::Hex6 => self.hex_string(false, false),
            ColorFormat::Hex4 => self.hex_string(true, true),
            ColorFormat::Hex8 => self.hex_string(true, false),
            ColorFormat::Rgb => self.rgb_string(false),
            ColorFormat::Rgba => self.rgb_string(true),
            ColorFormat::Hsl => self.hsl_string(false),
            ColorFormat::Hsla => self.hsl_string(true),
            ColorFormat::Named => return self.named_string(),
        };
        if self.style.uppercase {
            text.to_ascii_uppercase()
        } else {
            text
        }
    }

    fn hex_string(&self, with_alpha: bool, allow_short: bool) -> String {
        let [r, g, b] = self.to_rgb();
        let mut bytes = vec![r, g, b];
        if with_alpha {
            let alpha = to_f64(self.rendered_alpha());
            bytes.push((alpha * 255.0).round() as u8);
        }
        let doubled = bytes.iter().all(|byte| byte >> 4 == byte & 0x0f);
        let digits: String = if allow_short && doubled {
            bytes.iter().map(|byte| format!("{:x}", byte & 0x0f)).collect()
        } else {
            bytes.iter().map(|byte| format!("{byte:02x}")).collect()
        };
        format!("#{digits}")
    }

    fn alpha_text(&self) -> String {
        format_decimal(round_to(self.rendered_alpha(), 3))
    }

    fn rgb_string(&self, force_alpha: bool) -> String {
        let [r, g, b] = self.to_rgb();
        let sep = self.style.separator;
        if force_alpha || self.rendered_alpha() < Decimal::ONE {
            format!("rgba({r}{sep}{g}{sep}{b}{sep}{})", self.alpha_text())
        } else {
            format!("rgb({r}{sep}{g}{sep}{b})")
        }
    }

    fn hsl_string(&self, force_alpha: bool) -> String {
        let hundred = Decimal::ONE_HUNDRED;
        // numerals the live color can express, falling back to memory when
        // the live value collapsed to zero
        let numeral = |channel: &Channel, scale: Decimal| {
            let live = round_to(channel.live() * scale, 0);
            match channel.remembered() {
                Some(kept) if live.is_zero() && !kept.is_zero() => round_to(kept * scale, 0),
                _ => live,
            }
        };
        let h = numeral(&self.hue, Decimal::ONE);
        let s = numeral(&self.saturation, hundred);
        let l = round_to(self.lightness * hundred, 0);
        let sep = self.style.separator;
        let (h, s, l) = (format_decimal(h), format_decimal(s), format_decimal(l));
        if force_alpha || self.rendered_alpha() < Decimal::ONE {
            format!("hsla({h}{sep}{s}%{sep}{l}%{sep}{})", self.alpha_text())
        } else {
            format!("hsl({h}{sep}{s}%{sep}{l}%)")
        }
    }

    fn named_string(&self) -> String {
        let alpha = self.rendered_alpha();
        if alpha == Decimal::ONE {
            let [r, g, b] = self.to_rgb();
            let rgb = u32::from_be_bytes([0, r, g, b]);
            if let Some(name) = names::name_for(rgb, Some(&self.source)) {
                return name.to_string();
            }
        }
        if alpha.is_zero() {
            return TRANSPARENT.to_string();
        }
        self.rgb_string(false)
    }

    fn reading(&self, channel: ColorChannel) -> String {
        let hundred = Decimal::ONE_HUNDRED;
        let value = match channel {
            ColorChannel::Hue => round_to(self.hue.value, 0),
            ColorChannel::Saturation => round_to(self.saturation.value * hundred, 0),
            ColorChannel::Lightness => round_to(self.lightness * hundred, 0),
            ColorChannel::Alpha => round_to(self.alpha, 2),
            ColorChannel::Predefined => return String::new(),
        };
        format_decimal(value)
    }
}

fn detect_style(source: &str, format: ColorFormat) -> Style {
    let letters = match format {
        ColorFormat::Named => "",
        ColorFormat::Rgb | ColorFormat::Rgba | ColorFormat::Hsl | ColorFormat::Hsla => {
            source.split('(').next().unwrap_or_default()
        }
        _ => source,
    };
    let uppercase = letters.chars().any(|c| c.is_ascii_uppercase())
        && !letters.chars().any(|c| c.is_ascii_lowercase());
    let separator = if source.contains(',') && !source.contains(", ") {
        ","
    } else {
        ", "
    };
    Style {
        uppercase,
        separator,
    }
}

fn unpack(rgb: u32) -> [f64; 3] {
    let [_, r, g, b] = rgb.to_be_bytes();
    [r, g, b].map(f64::from)
}

fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    Some((&text[..open], inner))
}

fn arguments(inner: &str) -> Vec<&str> {
    inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect()
}

fn decode_hex(digits: &str, source: &str) -> Option<ColorValue> {
    let nibble = |i: usize| u8::from_str_radix(digits.get(i..=i)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();

    let (bytes, alpha, format) = match digits.len() {
        3 | 4 => {
            let expand = |i| nibble(i).map(|n| n * 17);
            let rgb = [expand(0)?, expand(1)?, expand(2)?];
            if digits.len() == 4 {
                (rgb, Some(expand(3)?), ColorFormat::Hex4)
            } else {
                (rgb, None, ColorFormat::Hex3)
            }
        }
        6 | 8 => {
            let rgb = [pair(0)?, pair(2)?, pair(4)?];
            if digits.len() == 8 {
                (rgb, Some(pair(6)?), ColorFormat::Hex8)
            } else {
                (rgb, None, ColorFormat::Hex6)
            }
        }
        _ => return None,
    };
    let alpha = alpha.map_or(Decimal::ONE, |byte| from_f64(f64::from(byte) / 255.0));
    Some(ColorValue::from_rgb(
        bytes.map(f64::from),
        alpha,
        format,
        source,
    ))
}

/// Alpha never disqualifies a color: anything unreadable means opaque.
fn parse_alpha(token: Option<&&str>) -> Decimal {
    let Some(token) = token else {
        return Decimal::ONE;
    };
    let value = match token.strip_suffix('%') {
        Some(pct) => parse_decimal(pct).map(|v| v / Decimal::ONE_HUNDRED),
        None => parse_decimal(token),
    };
    value.map_or(Decimal::ONE, |v| Clamp::unit().apply(v))
}

fn decode_rgb(name: &str, inner: &str, source: &str) -> Option<ColorValue> {
    let args = arguments(inner);
    if args.len() < 3 {
        return None;
    }
    let channel = |token: &str| -> Option<f64> {
        let value = match token.strip_suffix('%') {
            Some(pct) => to_f64(parse_decimal(pct)?) * 2.55,
            None => to_f64(parse_decimal(token)?),
        };
        Some(value.clamp(0.0, 255.0))
    };
    let rgb = [channel(args[0])?, channel(args[1])?, channel(args[2])?];
    let format = if name == "rgba" {
        ColorFormat::Rgba
    } else {
        ColorFormat::Rgb
    };
    Some(ColorValue::from_rgb(
        rgb,
        parse_alpha(args.get(3)),
        format,
        source,
    ))
}

fn decode_hsl(name: &str, inner: &str, source: &str) -> Option<ColorValue> {
    let args = arguments(inner);
    if args.len() < 3 {
        return None;
    }
    let hue = Clamp::wrap(360).apply(parse_decimal(args[0])?);
    // bare fractions up to 1 read as ratios, anything else as percentages
    let fraction = |token: &str| -> Option<Decimal> {
        let value = match token.strip_suffix('%') {
            Some(pct) => parse_decimal(pct)? / Decimal::ONE_HUNDRED,
            None => {
                let bare = parse_decimal(token)?;
                if bare <= Decimal::ONE {
                    bare
                } else {
                    bare / Decimal::ONE_HUNDRED
                }
            }
        };
        Some(Clamp::unit().apply(value))
    };
    let saturation = fraction(args[1])?;
    let lightness = fraction(args[2])?;
    let format = if name == "hsla" {
        ColorFormat::Hsla
    } else {
        ColorFormat::Hsl
    };
    Some(ColorValue::from_hsl(
        (hue, saturation, lightness),
        parse_alpha(args.get(3)),
        true,
        format,
        source,
    ))
}

/// Channels in `[0, 255]`; returns hue in degrees, saturation and lightness
/// as fractions.
fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (Decimal, Decimal, Decimal) {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (Decimal::ZERO, Decimal::ZERO, from_f64(l));
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (
        Clamp::wrap(360).apply(from_f64(h * 60.0)),
        from_f64(s),
        from_f64(l),
    )
}

/// Hue in degrees, the rest as fractions; channels come back in `[0, 1]`.
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let h = h / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Hex,
    Functional,
    Named,
}

/// Locates and edits one lexical family of colors.
#[derive(Debug, Clone, Copy)]
pub struct ColorRule {
    shape: Shape,
}

impl ColorRule {
    pub fn hex() -> Self {
        Self { shape: Shape::Hex }
    }

    pub fn functional() -> Self {
        Self {
            shape: Shape::Functional,
        }
    }

    pub fn named() -> Self {
        Self {
            shape: Shape::Named,
        }
    }
}

impl ValueRule for ColorRule {
    fn name(&self) -> &'static str {
        match self.shape {
            Shape::Hex => "hex-color",
            Shape::Functional => "functional-color",
            Shape::Named => "named-color",
        }
    }

    fn kind(&self) -> DialectKind {
        DialectKind::Color
    }

    fn locate(&self, line: &str, caret: u32) -> Option<Found> {
        let regex = match self.shape {
            Shape::Hex => hex_regex(),
            Shape::Functional => functional_regex(),
            Shape::Named => names::name_regex(),
        };
        locate::find_at(regex, line, caret)
    }

    fn decompose(&self, found: &Found, _context: &Context<'_>) -> Option<ValueKind> {
        ColorValue::decode(&found.text).map(ValueKind::Color)
    }

    fn mutate(&self, value: &mut ValueKind, mutation: &Mutation<'_>) {
        let (ValueKind::Color(color), Target::Color(channel)) = (value, mutation.target) else {
            return;
        };
        let delta = match channel {
            ColorChannel::Hue => HUE_STEPS.step(mutation.modifiers),
            ColorChannel::Saturation | ColorChannel::Lightness => {
                PERCENT_STEPS.step(mutation.modifiers)
            }
            ColorChannel::Alpha => ALPHA_STEPS.step(mutation.modifiers),
            ColorChannel::Predefined => return,
        };
        color.apply(*channel, mutation.direction, delta);
    }

    fn serialize(&self, value: &ValueKind) -> Rendered {
        match value {
            ValueKind::Color(color) => Rendered::plain(color.render()),
            ValueKind::FunctionChain(chain) => Rendered::plain(chain.source().to_string()),
            ValueKind::Scalar(scalar) => Rendered::plain(scalar.source().to_string()),
        }
    }

    fn read(&self, value: &ValueKind, mutation: &Mutation<'_>) -> Option<Reading> {
        let (ValueKind::Color(color), Target::Color(channel)) = (value, mutation.target) else {
            return None;
        };
        let value = color.reading(*channel);
        Some(Reading {
            name: channel.display_name().to_string(),
            key: value.clone(),
            value,
        })
    }

    fn defers_to_numbers(&self, precedence: Precedence) -> bool {
        self.shape == Shape::Functional && precedence.numbers_over_colors
    }
}
