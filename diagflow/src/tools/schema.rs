//! Declarative config schemas for tool inputs.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The kind of input a config option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Any finite number, optionally bounded.
    Number,
    /// A number that must lie within `[min, max]`.
    Slider,
    /// One string out of a fixed set of values.
    Select,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Slider => write!(f, "slider"),
            Self::Select => write!(f, "select"),
        }
    }
}

/// Converts a numeric default to JSON, keeping whole numbers integral so
/// `8.0` normalizes to `8`.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> serde_json::Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::json!(n)
    }
}

/// A single declared input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Field name in the input object.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Accepted input kind.
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Lower bound (sliders, optionally numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound (sliders, optionally numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values (selects).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Value substituted when the field is absent.
    pub default: serde_json::Value,
}

impl ConfigOption {
    /// Creates a number option.
    #[must_use]
    pub fn number(id: impl Into<String>, label: impl Into<String>, default: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            option_type: OptionType::Number,
            min: None,
            max: None,
            values: None,
            default: number_value(default),
        }
    }

    /// Creates a slider option.
    #[must_use]
    pub fn slider(
        id: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            option_type: OptionType::Slider,
            min: Some(min),
            max: Some(max),
            values: None,
            default: number_value(default),
        }
    }

    /// Creates a select option.
    #[must_use]
    pub fn select<I, S>(
        id: impl Into<String>,
        label: impl Into<String>,
        values: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            label: label.into(),
            option_type: OptionType::Select,
            min: None,
            max: None,
            values: Some(values.into_iter().map(Into::into).collect()),
            default: serde_json::Value::String(default.into()),
        }
    }

    /// Sets the lower bound.
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Returns the allowed values, empty for non-select options.
    #[must_use]
    pub fn allowed_values(&self) -> &[String] {
        self.values.as_deref().unwrap_or_default()
    }

    fn check(&self, tool: &str) -> Result<(), ConfigurationError> {
        let fail = |reason: String| ConfigurationError::invalid_schema(tool, &self.id, reason);

        if self.id.trim().is_empty() {
            return Err(fail("option id cannot be empty".to_string()));
        }

        match self.option_type {
            OptionType::Number | OptionType::Slider => {
                if self.option_type == OptionType::Slider && (self.min.is_none() || self.max.is_none()) {
                    return Err(fail("slider requires both min and max".to_string()));
                }
                if let (Some(min), Some(max)) = (self.min, self.max) {
                    if min > max {
                        return Err(fail(format!("min {min} is greater than max {max}")));
                    }
                }
                let default = self
                    .default
                    .as_f64()
                    .ok_or_else(|| fail(format!("default {} is not a number", self.default)))?;
                if let Some(min) = self.min {
                    if default < min {
                        return Err(fail(format!("default {default} is below min {min}")));
                    }
                }
                if let Some(max) = self.max {
                    if default > max {
                        return Err(fail(format!("default {default} is above max {max}")));
                    }
                }
            }
            OptionType::Select => {
                let values = self.allowed_values();
                if values.is_empty() {
                    return Err(fail("select requires at least one value".to_string()));
                }
                let in_values = self
                    .default
                    .as_str()
                    .is_some_and(|d| values.iter().any(|v| v == d));
                if !in_values {
                    return Err(fail(format!(
                        "default {} is not one of [{}]",
                        self.default,
                        values.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Ordered set of config options describing a tool's accepted input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    options: Vec<ConfigOption>,
}

impl ConfigSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option.
    #[must_use]
    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    /// Returns the options in declaration order.
    #[must_use]
    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Looks up an option by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConfigOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Checks the schema's invariants for the tool registered under `tool`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError::InvalidSchema`] for duplicate ids, a
    /// slider default outside `[min, max]`, or a select default outside its
    /// values.
    pub fn check(&self, tool: &str) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(ConfigurationError::invalid_schema(
                    tool,
                    &option.id,
                    "duplicate option id",
                ));
            }
            option.check(tool)?;
        }
        Ok(())
    }
}

impl FromIterator<ConfigOption> for ConfigSchema {
    fn from_iter<T: IntoIterator<Item = ConfigOption>>(iter: T) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}
