use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// Durations written the human way ("300ms", "5s") in files and payloads.
pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize, Serialize)]
    struct Sample {
        #[serde_as(as = "Option<HumantimeDuration>")]
        duration: Option<Duration>,
    }

    #[test]
    fn humantime_duration_parses_strings() {
        let sample: Sample = match serde_json::from_str(r#"{"duration":"300ms"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(sample.duration, Some(Duration::from_millis(300)));
    }

    #[test]
    fn humantime_duration_serializes_compactly() {
        let sample = Sample {
            duration: Some(Duration::from_millis(1500)),
        };
        let json = match serde_json::to_string(&sample) {
            Ok(json) => json,
            Err(err) => panic!("failed to serialize sample: {err}"),
        };
        assert_eq!(json, r#"{"duration":"1s 500ms"}"#);
    }
}
