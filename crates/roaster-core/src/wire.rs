//! Lenient field decoders for payloads we do not produce ourselves.
//!
//! The page extractor and the generation backend both send `null` where a
//! value is unknown, and numbers without a fixed representation.

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads any JSON number as a percentage, rounded into `0..=100`.
pub(crate) fn percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(clamp_percentage(value))
}

pub(crate) fn clamp_percentage(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_default")]
        flag: bool,
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
        #[serde(default, deserialize_with = "percentage")]
        score: u8,
    }

    #[test]
    fn test_null_reads_as_default() {
        let sample: Sample =
            serde_json::from_value(json!({"flag": null, "items": null, "score": null})).unwrap();
        assert!(!sample.flag);
        assert!(sample.items.is_empty());
        assert_eq!(sample.score, 0);
    }

    #[test]
    fn test_missing_fields_read_as_default() {
        let sample: Sample = serde_json::from_value(json!({})).unwrap();
        assert!(!sample.flag);
        assert_eq!(sample.score, 0);
    }

    #[test]
    fn test_percentage_rounds_and_clamps() {
        let score = |value: serde_json::Value| {
            serde_json::from_value::<Sample>(json!({ "score": value }))
                .unwrap()
                .score
        };
        assert_eq!(score(json!(150)), 100);
        assert_eq!(score(json!(-5)), 0);
        assert_eq!(score(json!(72.6)), 73);
        assert_eq!(score(json!(40)), 40);
    }

    #[test]
    fn test_percentage_rejects_non_numbers() {
        assert!(serde_json::from_value::<Sample>(json!({"score": "high"})).is_err());
    }
}
