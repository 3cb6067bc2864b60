//! Lenient accessors over API JSON.
//!
//! The statistics API is loosely typed: numbers sometimes arrive as strings,
//! ids as either strings or integers, and "empty" can be `null`, `[]` or `{}`.

use serde_json::Value;

/// Truthiness of a JSON value: null, false, 0, "", [] and {} are all empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether `obj[key]` exists and is truthy.
pub fn has_truthy(obj: &Value, key: &str) -> bool {
    obj.get(key).map_or(false, truthy)
}

pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

pub fn get_f64(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(as_f64)
}

pub fn get_i64(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(as_i64)
}

pub fn get_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(|v| v.as_str())
}

/// Render an id that may be encoded as a string or a number.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!([1])));
        assert!(truthy(&json!({"a": null})));
        assert!(truthy(&json!(0.1)));
    }

    #[test]
    fn test_numeric_coercion() {
        let obj = json!({"a": "12", "b": 3.6, "c": " 0.25 ", "d": "x", "e": null});
        assert_eq!(get_i64(&obj, "a"), Some(12));
        assert_eq!(get_i64(&obj, "b"), Some(4));
        assert_eq!(get_f64(&obj, "c"), Some(0.25));
        assert_eq!(get_f64(&obj, "d"), None);
        assert_eq!(get_f64(&obj, "e"), None);
        assert_eq!(get_f64(&obj, "missing"), None);
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&json!(2304400)), Some("2304400".to_string()));
        assert_eq!(id_string(&json!("2304400")), Some("2304400".to_string()));
        assert_eq!(id_string(&json!(null)), None);
    }
}
