use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dialect::ColorValue;
use crate::error::ConfigError;
use crate::locate::Precedence;
use crate::tool::NumberToolVariant;

/// Longest delay either timer accepts.
pub const MAX_DELAY_MS: u64 = 60_000;

/// User options. Every key is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// A bare number under the caret wins over `rgb()`/`hsl()` around it.
    pub numbers_over_colors: bool,
    /// A bare number under the caret wins over a `filter` chain around it.
    pub numbers_over_filters: bool,
    /// Scale steps for units that usually hold small or large values.
    pub units_step: bool,
    /// Scale steps inside alpha channels, easing curves, transforms, filters.
    pub other_step: bool,
    pub number_tool: NumberToolVariant,
    pub predefined_colors: Vec<String>,
    pub feedback_delay_ms: u64,
    pub forget_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            numbers_over_colors: true,
            numbers_over_filters: true,
            units_step: true,
            other_step: true,
            number_tool: NumberToolVariant::Ratchet,
            predefined_colors: Vec::new(),
            feedback_delay_ms: 150,
            forget_delay_ms: 3000,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("feedback-delay-ms", self.feedback_delay_ms),
            ("forget-delay-ms", self.forget_delay_ms),
        ] {
            if value == 0 || value > MAX_DELAY_MS {
                return Err(ConfigError::InvalidDelay {
                    field,
                    value,
                    max: MAX_DELAY_MS,
                });
            }
        }
        Ok(())
    }

    pub fn precedence(&self) -> Precedence {
        Precedence {
            numbers_over_colors: self.numbers_over_colors,
            numbers_over_filters: self.numbers_over_filters,
        }
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn forget_delay(&self) -> Duration {
        Duration::from_millis(self.forget_delay_ms)
    }

    pub fn number_tool_id(&self) -> &'static str {
        self.number_tool.tool_id()
    }
}

/// The predefined-data document: `{"colors": ["#fff", "tomato", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Palette {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Entries that decode as colors, with their text. Anything else is
    /// skipped with a warning.
    pub fn decode(colors: &[String]) -> Vec<(String, ColorValue)> {
        colors
            .iter()
            .filter_map(|text| match ColorValue::decode(text) {
                Some(color) => Some((text.clone(), color)),
                None => {
                    tracing::warn!(entry = %text, "skipping palette entry that is not a color");
                    None
                }
            })
            .collect()
    }
}
