use crate::model::Event;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Analysis result as returned by the backend for one submission.
///
/// `incident_summary` and `officer_contributions` are carried verbatim;
/// only `events` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_events")]
    pub events: Vec<Event>,
    #[serde(default)]
    pub incident_summary: String,
    #[serde(default)]
    pub officer_contributions: Value,
}

impl AnalysisResult {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Keeps every event that is a JSON object. Anything else is logged and
/// dropped so one bad entry cannot blank the whole result.
fn lenient_events<'de, D>(deserializer: D) -> std::result::Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Analysis events field is not a list: {}", other);
            return Ok(Vec::new());
        }
    };

    let mut events = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Event>(item) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping malformed event #{}: {}", i, e),
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Urgency;

    #[test]
    fn test_parse_full_result() {
        let result = AnalysisResult::from_json(
            r#"{
                "events": [
                    {"time_raw": "00:31", "timestamp_sec": 31, "location": "entrance",
                     "event_summary": "Units arrive at front door", "urgency": "medium",
                     "entities": ["Unit 714"]}
                ],
                "incidentSummary": "Units responded to a burglary.",
                "officerContributions": {"Unit 714": ["Units arrive at front door"]}
            }"#,
        )
        .unwrap();

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].urgency, Urgency::Medium);
        assert_eq!(result.incident_summary, "Units responded to a burglary.");
        assert_eq!(
            result.officer_contributions["Unit 714"][0],
            "Units arrive at front door"
        );
    }

    #[test]
    fn test_non_object_event_skipped() {
        let result = AnalysisResult::from_json(
            r#"{"events": [42, {"event_summary": "ok"}, "junk"]}"#,
        )
        .unwrap();
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].event_summary, "ok");
    }

    #[test]
    fn test_missing_sections_default() {
        let result = AnalysisResult::from_json("{}").unwrap();
        assert!(result.events.is_empty());
        assert!(result.incident_summary.is_empty());
        assert!(result.officer_contributions.is_null());
    }

    #[test]
    fn test_events_not_a_list() {
        let result = AnalysisResult::from_json(r#"{"events": {"a": 1}}"#).unwrap();
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(AnalysisResult::from_json("{events").is_err());
    }
}
