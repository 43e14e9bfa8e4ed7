use irv_common::human_time::parse_clock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Urgency rating attached to each event by the analysis backend.
///
/// Only used to break ties between events that share a room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Missing or unrecognized rating
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Tie-break rank: high=3 > medium=2 > low=1 > unknown=0
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Unknown => 0,
            Urgency::Low => 1,
            Urgency::Medium => 2,
            Urgency::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Unknown => "unknown",
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    /// Case-insensitive; anything unrecognized is `Unknown`
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "low" => Urgency::Low,
            "medium" => Urgency::Medium,
            "high" => Urgency::High,
            _ => Urgency::Unknown,
        }
    }
}

/// One incident fact extracted from the audio. Immutable once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Offset into the audio track. `None` when missing, negative or not a
    /// number; such events stay in the store but never reach the timeline.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp_sec: Option<f64>,
    /// Display label only, never parsed for seeking
    #[serde(default, deserialize_with = "lenient_text")]
    pub time_raw: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub event_summary: String,
    /// Room identifier. Blank locations are treated as absent.
    #[serde(default, deserialize_with = "lenient_location")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_urgency")]
    pub urgency: Urgency,
    /// Units or personnel involved (e.g. "Unit 714", "Dispatch")
    #[serde(default, deserialize_with = "lenient_entities")]
    pub entities: Vec<String>,
}

impl Event {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            timestamp_sec: None,
            time_raw: String::new(),
            event_summary: summary.into(),
            location: None,
            urgency: Urgency::Unknown,
            entities: Vec::new(),
        }
    }

    pub fn at(mut self, seconds: f64) -> Self {
        self.timestamp_sec = usable_timestamp(seconds);
        self
    }

    pub fn in_room(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn labelled(mut self, time_raw: impl Into<String>) -> Self {
        self.time_raw = time_raw.into();
        self
    }

    /// True when the event can be placed on the timeline track
    pub fn is_seekable(&self) -> bool {
        self.timestamp_sec.is_some()
    }

    /// False when the display label holds a clock more than a second away
    /// from `timestamp_sec`. Labels without a clock and events without a
    /// usable timestamp are not checked.
    pub fn label_agrees(&self) -> bool {
        match (parse_clock(&self.time_raw), self.timestamp_sec) {
            (Some(label), Some(seconds)) => (f64::from(label) - seconds.floor()).abs() <= 1.0,
            _ => true,
        }
    }
}

fn usable_timestamp(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(seconds.and_then(usable_timestamp))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_location<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

fn lenient_urgency<'de, D>(deserializer: D) -> Result<Urgency, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Urgency::parse(&s),
        _ => Urgency::Unknown,
    })
}

fn lenient_entities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_agreement() {
        assert!(Event::new("a").at(118.4).labelled("01:58").label_agrees());
        assert!(Event::new("a").at(119.0).labelled("at 1:58").label_agrees());
        assert!(!Event::new("a").at(58.0).labelled("01:58").label_agrees());
        // Nothing to compare
        assert!(Event::new("a").labelled("01:58").label_agrees());
        assert!(Event::new("a").at(58.0).labelled("shortly after").label_agrees());
        assert!(Event::new("a").at(58.0).label_agrees());
    }

    #[test]
    fn test_urgency_rank_order() {
        assert!(Urgency::High.rank() > Urgency::Medium.rank());
        assert!(Urgency::Medium.rank() > Urgency::Low.rank());
        assert!(Urgency::Low.rank() > Urgency::Unknown.rank());
    }

    #[test]
    fn test_urgency_parse_case_insensitive() {
        assert_eq!(Urgency::parse("HIGH"), Urgency::High);
        assert_eq!(Urgency::parse(" Medium "), Urgency::Medium);
        assert_eq!(Urgency::parse("critical"), Urgency::Unknown);
    }

    #[test]
    fn test_well_formed_event() {
        let event: Event = serde_json::from_str(
            r#"{
                "time_raw": "01:58",
                "timestamp_sec": 118,
                "location": "bedroom-1",
                "event_summary": "Forced entry at rear door",
                "entities": ["Unit 714", "Dispatch"],
                "urgency": "high"
            }"#,
        )
        .unwrap();

        assert_eq!(event.timestamp_sec, Some(118.0));
        assert_eq!(event.location.as_deref(), Some("bedroom-1"));
        assert_eq!(event.urgency, Urgency::High);
        assert_eq!(event.entities, vec!["Unit 714", "Dispatch"]);
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let event: Event = serde_json::from_str(
            r#"{
                "timestamp_sec": "soon",
                "location": "  ",
                "event_summary": "Radio check",
                "urgency": 7,
                "entities": "Unit 9"
            }"#,
        )
        .unwrap();

        assert_eq!(event.timestamp_sec, None);
        assert!(!event.is_seekable());
        assert_eq!(event.location, None);
        assert_eq!(event.urgency, Urgency::Unknown);
        assert!(event.entities.is_empty());
    }

    #[test]
    fn test_negative_timestamp_unusable() {
        let event: Event = serde_json::from_str(r#"{"timestamp_sec": -3}"#).unwrap();
        assert_eq!(event.timestamp_sec, None);
        assert_eq!(Event::new("x").at(f64::NAN).timestamp_sec, None);
    }

    #[test]
    fn test_numeric_string_timestamp_accepted() {
        let event: Event = serde_json::from_str(r#"{"timestamp_sec": "42.5"}"#).unwrap();
        assert_eq!(event.timestamp_sec, Some(42.5));
    }

    #[test]
    fn test_missing_fields_default() {
        let event: Event = serde_json::from_str("{}").unwrap();
        assert_eq!(event, Event::new(""));
    }
}
