//! What the active dial tool edits, and the device's names for it.

use serde::{Deserialize, Serialize};

use crate::dialect::filter::FilterFunction;

pub const COLOR_TOOL: &str = "ChangeColor";
pub const COLOR_WITH_PREDEFINED_TOOL: &str = "ChangeColorWithPredefined";
pub const FILTERS_TOOL: &str = "CSSFilters";
pub const NUMBER_TOOL: &str = "IncOrDecNumber";
pub const NUMBER_RATCHET_TOOL: &str = "IncOrDecNumberRatchet";
pub const NUMBER_NO_RATCHET_TOOL: &str = "IncOrDecNumberWithoutRatchet";

/// A color component the dial moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Hue,
    Saturation,
    Lightness,
    Alpha,
    /// Step through the configured palette instead of moving a channel.
    Predefined,
}

impl ColorChannel {
    pub fn display_name(self) -> &'static str {
        match self {
            ColorChannel::Hue => "Hue",
            ColorChannel::Saturation => "Saturation",
            ColorChannel::Lightness => "Lightness",
            ColorChannel::Alpha => "Alpha",
            ColorChannel::Predefined => "Predefined",
        }
    }

    pub fn from_option(option: &str) -> Option<Self> {
        match option {
            "Hue" => Some(ColorChannel::Hue),
            "Saturation" => Some(ColorChannel::Saturation),
            "Lightness" => Some(ColorChannel::Lightness),
            "Alpha" => Some(ColorChannel::Alpha),
            "Predefined" => Some(ColorChannel::Predefined),
            _ => None,
        }
    }
}

/// Options of the number tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberOptions {
    /// Numbers that were negative when first touched move away from zero
    /// on a positive turn.
    pub cross: bool,
    /// Edit the selected text itself rather than the number at the caret.
    pub selection: bool,
}

/// The component an input event edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Color(ColorChannel),
    Filter(FilterFunction),
    Number(NumberOptions),
}

impl Target {
    /// Maps a device `(tool id, tool option)` pair onto a target.
    pub fn from_tool_option(tool: &str, option: &str) -> Option<Self> {
        match tool {
            COLOR_TOOL | COLOR_WITH_PREDEFINED_TOOL => {
                ColorChannel::from_option(option).map(Target::Color)
            }
            FILTERS_TOOL => FilterFunction::from_tool_option(option).map(Target::Filter),
            NUMBER_TOOL | NUMBER_RATCHET_TOOL | NUMBER_NO_RATCHET_TOOL => {
                let lower = option.to_ascii_lowercase();
                Some(Target::Number(NumberOptions {
                    cross: lower.contains("numbercross"),
                    selection: lower.ends_with("plusselection"),
                }))
            }
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Target::Number(_))
    }
}

/// Device variants of the number tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberToolVariant {
    #[default]
    Ratchet,
    NoRatchet,
    Both,
}

impl NumberToolVariant {
    pub fn tool_id(self) -> &'static str {
        match self {
            NumberToolVariant::Ratchet => NUMBER_RATCHET_TOOL,
            NumberToolVariant::NoRatchet => NUMBER_NO_RATCHET_TOOL,
            NumberToolVariant::Both => NUMBER_TOOL,
        }
    }
}
