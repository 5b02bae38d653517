//! Config-schema validation of raw tool input.
//!
//! Validation is all-or-nothing: every declared option is checked, every
//! violation is collected, and the normalized input is only returned when
//! there are none. Out-of-range numbers are rejected, never clamped.

use super::{ConfigOption, ConfigSchema, OptionType};
use crate::errors::{Constraint, FieldViolation, ValidationError};
use serde_json::{Map, Value};

/// Field name used for violations that concern the whole input.
pub const INPUT_FIELD: &str = "$input";

/// Validates and normalizes `raw` against a tool's schema.
///
/// Without a schema the input is returned verbatim. With one, the input must
/// be an object (`null` counts as `{}`); absent or `null` fields receive
/// their declared default and undeclared fields pass through unchanged.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every field-level violation.
pub fn validate(tool: &str, schema: Option<&ConfigSchema>, raw: Value) -> Result<Value, ValidationError> {
    let Some(schema) = schema else {
        return Ok(raw);
    };

    let mut fields = match raw {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::new(
                tool,
                vec![FieldViolation::new(
                    INPUT_FIELD,
                    format!("input must be a JSON object, got {}", type_name(&other)),
                    Constraint::NotAnObject,
                )],
            ));
        }
    };

    let mut violations = Vec::new();
    for option in schema.options() {
        match fields.get(&option.id).filter(|v| !v.is_null()) {
            None => {
                fields.insert(option.id.clone(), option.default.clone());
            }
            Some(value) => {
                if let Err(violation) = check_value(option, value) {
                    violations.push(violation);
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(Value::Object(fields))
    } else {
        Err(ValidationError::new(tool, violations))
    }
}

fn check_value(option: &ConfigOption, value: &Value) -> Result<(), FieldViolation> {
    let id = &option.id;
    match option.option_type {
        OptionType::Number | OptionType::Slider => {
            let number = value.as_f64().filter(|n| n.is_finite()).ok_or_else(|| {
                FieldViolation::new(
                    id,
                    format!("'{id}' must be a number, got {value}"),
                    Constraint::NotNumeric,
                )
            })?;
            if let Some(min) = option.min {
                if number < min {
                    return Err(FieldViolation::new(
                        id,
                        format!("'{id}' must be >= {min} (min), got {number}"),
                        Constraint::BelowMin { min },
                    ));
                }
            }
            if let Some(max) = option.max {
                if number > max {
                    return Err(FieldViolation::new(
                        id,
                        format!("'{id}' must be <= {max} (max), got {number}"),
                        Constraint::AboveMax { max },
                    ));
                }
            }
            Ok(())
        }
        OptionType::Select => {
            let allowed = option.allowed_values();
            let member = value.as_str().is_some_and(|s| allowed.iter().any(|a| a == s));
            if member {
                Ok(())
            } else {
                Err(FieldViolation::new(
                    id,
                    format!("'{id}' must be one of [{}], got {value}", allowed.join(", ")),
                    Constraint::NotAllowed {
                        allowed: allowed.to_vec(),
                    },
                ))
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ping_schema() -> ConfigSchema {
        ConfigSchema::new()
            .option(ConfigOption::slider("count", "Ping count", 1.0, 20.0, 8.0))
            .option(ConfigOption::select("band", "Band", ["A", "B"], "A"))
            .option(ConfigOption::number("timeout", "Timeout", 2.5))
    }

    #[test]
    fn test_no_schema_passes_raw_input() {
        let raw = json!(["not", "an", "object"]);
        assert_eq!(validate("raw", None, raw.clone()).unwrap(), raw);
    }

    #[test]
    fn test_defaults_substituted_for_missing_fields() {
        let normalized = validate("ping", Some(&ping_schema()), json!({})).unwrap();
        assert_eq!(normalized, json!({"count": 8, "band": "A", "timeout": 2.5}));
        assert_eq!(normalized["count"].as_u64(), Some(8));
    }

    #[test]
    fn test_null_body_and_null_fields_use_defaults() {
        let normalized = validate("ping", Some(&ping_schema()), Value::Null).unwrap();
        assert_eq!(normalized["count"], json!(8));

        let normalized = validate("ping", Some(&ping_schema()), json!({"band": null})).unwrap();
        assert_eq!(normalized["band"], json!("A"));
    }

    #[test]
    fn test_slider_above_max_is_rejected_not_clamped() {
        let err = validate("ping", Some(&ping_schema()), json!({"count": 25})).unwrap_err();

        assert_eq!(err.violations.len(), 1);
        let violation = err.violation("count").unwrap();
        assert_eq!(violation.constraint, Constraint::AboveMax { max: 20.0 });
        assert!(violation.message.contains("'count'"));
        assert!(violation.message.contains("<= 20 (max)"));
    }

    #[test]
    fn test_slider_below_min() {
        let err = validate("ping", Some(&ping_schema()), json!({"count": 0})).unwrap_err();
        assert_eq!(err.violation("count").unwrap().constraint, Constraint::BelowMin { min: 1.0 });
    }

    #[test]
    fn test_slider_bounds_are_inclusive() {
        let normalized = validate("ping", Some(&ping_schema()), json!({"count": 20})).unwrap();
        assert_eq!(normalized["count"], json!(20));
    }

    #[test]
    fn test_select_outside_values_lists_allowed_set() {
        let err = validate("ping", Some(&ping_schema()), json!({"band": "C"})).unwrap_err();
        let violation = err.violation("band").unwrap();

        assert_eq!(
            violation.constraint,
            Constraint::NotAllowed {
                allowed: vec!["A".to_string(), "B".to_string()]
            }
        );
        assert!(violation.message.contains("[A, B]"));
    }

    #[test]
    fn test_select_rejects_non_string() {
        let err = validate("ping", Some(&ping_schema()), json!({"band": 1})).unwrap_err();
        assert!(err.violation("band").is_some());
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        let err = validate("ping", Some(&ping_schema()), json!({"timeout": "soon"})).unwrap_err();
        assert_eq!(err.violation("timeout").unwrap().constraint, Constraint::NotNumeric);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let err = validate(
            "ping",
            Some(&ping_schema()),
            json!({"count": 99, "band": "Z", "timeout": true}),
        )
        .unwrap_err();

        let fields: Vec<_> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["count", "band", "timeout"]);
    }

    #[test]
    fn test_undeclared_fields_pass_through() {
        let normalized = validate("ping", Some(&ping_schema()), json!({"host": "10.0.0.1"})).unwrap();
        assert_eq!(normalized["host"], json!("10.0.0.1"));
    }

    #[test]
    fn test_non_object_input_with_schema() {
        let err = validate("ping", Some(&ping_schema()), json!("hello")).unwrap_err();
        let violation = err.violation(INPUT_FIELD).unwrap();
        assert_eq!(violation.constraint, Constraint::NotAnObject);
        assert!(violation.message.contains("a string"));
    }
}
