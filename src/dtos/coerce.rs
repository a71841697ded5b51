//! Lenient field readers for form-style payloads.
//!
//! Numbers arrive as JSON numbers, numeric strings, empty strings, `null`
//! or plain garbage. Anything that does not read as a finite number is 0.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(true) => Some(1.0),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_f64).unwrap_or(0.0))
}

/// `None` when the field is `null` or a blank string; coerced otherwise.
/// Used by partial updates and optional overrides.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => Ok(Some(coerce_f64(&value))),
    }
}

pub fn whole_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    number(deserializer).map(|v| v.trunc() as i32)
}

pub fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number(deserializer).map(|v| v.map(|n| n.trunc() as i32))
}

/// Select boxes post `""` for "none".
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid id '{s}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "number")]
        weight: f64,
        #[serde(default, deserialize_with = "whole_number")]
        minutes: i32,
        #[serde(default, deserialize_with = "optional_number")]
        margin: Option<f64>,
        #[serde(default, deserialize_with = "optional_id")]
        marketplace_id: Option<Uuid>,
    }

    fn parse(v: serde_json::Value) -> Form {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn numbers_and_numeric_strings() {
        let form = parse(json!({ "weight": "12.5", "minutes": 45, "margin": " 30 " }));
        assert_eq!(form.weight, 12.5);
        assert_eq!(form.minutes, 45);
        assert_eq!(form.margin, Some(30.0));
    }

    #[test]
    fn malformed_numbers_become_zero() {
        for bad in [json!(""), json!("abc"), json!(null), json!([1]), json!({}), json!("1,5")] {
            let form = parse(json!({ "weight": bad.clone(), "minutes": bad }));
            assert_eq!(form.weight, 0.0);
            assert_eq!(form.minutes, 0);
        }
    }

    #[test]
    fn missing_fields_default() {
        let form = parse(json!({}));
        assert_eq!(form.weight, 0.0);
        assert_eq!(form.margin, None);
        assert_eq!(form.marketplace_id, None);
    }

    #[test]
    fn blank_optional_number_is_absent() {
        assert_eq!(parse(json!({ "margin": "" })).margin, None);
        assert_eq!(parse(json!({ "margin": "  " })).margin, None);
        assert_eq!(parse(json!({ "margin": null })).margin, None);
        assert_eq!(parse(json!({ "margin": 0 })).margin, Some(0.0));
        assert_eq!(parse(json!({ "margin": "0" })).margin, Some(0.0));
    }

    #[test]
    fn fractional_minutes_are_truncated() {
        assert_eq!(parse(json!({ "minutes": "12.9" })).minutes, 12);
    }

    #[test]
    fn empty_select_is_no_id() {
        assert_eq!(parse(json!({ "marketplace_id": "" })).marketplace_id, None);
        let id = Uuid::new_v4();
        assert_eq!(
            parse(json!({ "marketplace_id": id.to_string() })).marketplace_id,
            Some(id)
        );
    }

    #[test]
    fn invalid_id_is_rejected() {
        let res: Result<Form, _> = serde_json::from_value(json!({ "marketplace_id": "nope" }));
        assert!(res.is_err());
    }
}
