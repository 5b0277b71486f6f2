//! Serializes a `Duration` as whole milliseconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timed {
        #[serde(with = "super")]
        interval: Duration,
    }

    #[test]
    fn writes_plain_milliseconds() {
        let json = serde_json::to_string(&Timed {
            interval: Duration::from_millis(195),
        })
        .unwrap();
        assert_eq!(json, r#"{"interval":195}"#);

        let back: Timed = serde_json::from_str(r#"{"interval":1000}"#).unwrap();
        assert_eq!(back.interval, Duration::from_secs(1));
    }
}
