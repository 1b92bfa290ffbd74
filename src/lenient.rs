//! Field decoders that never fail a record: a value of the wrong shape
//! decodes to `None` / the neutral default instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_i64))
}

pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v
        .as_ref()
        .and_then(value_to_i64)
        .and_then(|n| u64::try_from(n).ok()))
}

pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v
        .as_ref()
        .and_then(value_to_i64)
        .and_then(|n| u32::try_from(n).ok()))
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

pub fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

pub fn bool_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(v, Some(Value::Bool(true))))
}

/// Arrays keep their string members; anything else is an empty list.
pub fn string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = v else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Non-arrays decode as empty. Each element goes through `T::from`, which
/// must not fail, so the list keeps its length.
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Value>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = v else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().map(T::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_coerce_like_numeric_strings() {
        assert_eq!(value_to_i64(&json!(7)), Some(7));
        assert_eq!(value_to_i64(&json!(7.0)), Some(7));
        assert_eq!(value_to_i64(&json!(" 42 ")), Some(42));
        assert_eq!(value_to_i64(&json!(7.5)), None);
        assert_eq!(value_to_i64(&json!("abc")), None);
        assert_eq!(value_to_i64(&json!(null)), None);
        assert_eq!(value_to_i64(&json!(true)), None);
    }

    #[derive(Debug, Deserialize, Default)]
    struct Sample {
        #[serde(default, deserialize_with = "string_vec")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "bool_or_default")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_u32")]
        rank: Option<u32>,
    }

    #[test]
    fn wrong_shapes_fall_back() {
        let sample: Sample =
            serde_json::from_value(json!({"tags": "x", "flag": "yes", "rank": -3})).unwrap();
        assert!(sample.tags.is_empty());
        assert!(!sample.flag);
        assert_eq!(sample.rank, None);

        let sample: Sample =
            serde_json::from_value(json!({"tags": ["a", 1, "b"], "flag": true, "rank": "12"}))
                .unwrap();
        assert_eq!(sample.tags, vec!["a".to_string(), "b".to_string()]);
        assert!(sample.flag);
        assert_eq!(sample.rank, Some(12));
    }
}
