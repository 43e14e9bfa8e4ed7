//! Integration tests for the analysis session lifecycle

use irv_common::{ReviewConfig, RoomTimestampMap};
use irv_engine::model::{EventIndex, Urgency};
use irv_engine::projector::{Rect, StaticLayout};
use irv_engine::session::MISSING_FILES_MESSAGE;
use irv_engine::transport::SimulatedTransport;
use irv_engine::{
    Error, InteractionCoordinator, ReviewSession, SubmissionFiles, SubmissionStatus,
};
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

const ANALYSIS: &str = r#"{
    "events": [
        {
            "timestamp_sec": 12.5,
            "time_raw": "00:12",
            "event_summary": "Rear door forced open",
            "location": "bathroom",
            "urgency": "high",
            "entities": ["Unit 714"]
        },
        {
            "timestamp_sec": "not a number",
            "event_summary": "Caller reports noise",
            "location": "  ",
            "urgency": "urgent"
        },
        42,
        {
            "timestamp_sec": 61,
            "event_summary": "Bedroom ransacked",
            "location": "bedroom-1",
            "urgency": "Medium"
        }
    ],
    "incidentSummary": "Burglary at a residential apartment",
    "officerContributions": { "Unit 714": ["Cleared bathroom"] }
}"#;

fn session() -> ReviewSession<SimulatedTransport> {
    ReviewSession::new(InteractionCoordinator::new(
        SimulatedTransport::new(),
        RoomTimestampMap::default_apartment(),
    ))
}

fn submitted() -> ReviewSession<SimulatedTransport> {
    let mut session = session();
    session
        .begin_submission(&SubmissionFiles::new("call.mp3", "plan.svg"))
        .unwrap();
    session
}

#[test]
fn test_missing_files_rejected_without_state_change() {
    let mut session = session();
    let files = SubmissionFiles {
        audio: None,
        floor_plan: Some("plan.svg".into()),
    };

    match session.begin_submission(&files) {
        Err(Error::Validation(message)) => assert_eq!(message, MISSING_FILES_MESSAGE),
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert_eq!(session.status(), &SubmissionStatus::Idle);
}

#[test]
fn test_complete_installs_events_leniently() {
    let mut session = submitted();
    assert_eq!(session.status(), &SubmissionStatus::Pending);

    session.complete_json(ANALYSIS).unwrap();

    assert_eq!(session.status(), &SubmissionStatus::Ready);
    assert_eq!(session.incident_summary(), "Burglary at a residential apartment");
    assert_eq!(
        session.officer_contributions()["Unit 714"][0],
        "Cleared bathroom"
    );

    let store = session.coordinator().store();
    // The bare number is dropped, the degraded event is kept
    assert_eq!(store.len(), 3);

    let degraded = store.get(EventIndex(1)).unwrap();
    assert_eq!(degraded.timestamp_sec, None);
    assert_eq!(degraded.location, None);
    assert_eq!(degraded.urgency, Urgency::Unknown);

    let first = store.get(EventIndex(0)).unwrap();
    assert_eq!(first.entities, vec!["Unit 714".to_string()]);
    assert_eq!(store.get(EventIndex(2)).unwrap().urgency, Urgency::Medium);
}

#[test]
fn test_completed_session_drives_overlay_and_timeline() {
    let mut session = submitted();
    session.complete_json(ANALYSIS).unwrap();

    let coordinator = session.coordinator_mut();
    coordinator.set_floor_plan(Box::new(
        StaticLayout::new(Rect::new(0.0, 0.0, 500.0, 500.0))
            .with_marker("bathroom", Rect::new(10.0, 10.0, 10.0, 10.0))
            .with_marker("bedroom-1", Rect::new(100.0, 100.0, 10.0, 10.0)),
    ));
    coordinator.timeline_mut().transport_mut().load(90.0);
    coordinator.sync_transport();

    assert_eq!(coordinator.overlay().len(), 2);

    let view = coordinator.timeline_view().unwrap();
    let labels: Vec<&str> = view.markers.iter().map(|m| m.label.as_str()).collect();
    // The unseekable event stays off the track
    assert_eq!(labels, vec!["00:12", "1:01"]);
}

#[test]
fn test_failure_clears_previous_result() {
    let mut session = submitted();
    session.complete_json(ANALYSIS).unwrap();
    session.coordinator_mut().click_room("bathroom");
    assert!(session.coordinator().selected_event().is_some());

    session.begin_submission(&SubmissionFiles::new("call2.mp3", "plan.svg")).unwrap();
    session.fail("Analysis service unavailable");

    assert!(session.coordinator().store().is_empty());
    assert!(session.coordinator().selected_event().is_none());
    assert_eq!(session.incident_summary(), "");
    assert_eq!(session.officer_contributions(), &Value::Null);
    assert!(session.coordinator_mut().overlay().is_empty());

    match session.failure() {
        Some(Error::Submission(message)) => assert_eq!(message, "Analysis service unavailable"),
        other => panic!("Expected submission failure, got {:?}", other),
    }
}

#[test]
fn test_unreadable_result_marks_failure() {
    let mut session = submitted();

    let result = session.complete_json("<html>502 Bad Gateway</html>");

    assert!(matches!(result, Err(Error::Malformed(_))));
    assert!(matches!(session.status(), SubmissionStatus::Failed { .. }));
    assert!(session.failure().is_some());
}

#[test]
fn test_session_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
highlight_window_sec = 4.0

[room_timestamps]
bathroom = 20.0

[[classifier_rules]]
category = "all-clear"
keywords = ["forced"]
"#
    )
    .unwrap();

    let config = ReviewConfig::load_file(file.path()).unwrap();
    let coordinator =
        InteractionCoordinator::from_config(SimulatedTransport::new(), &config).unwrap();
    let mut session = ReviewSession::new(coordinator);
    session.complete_json(ANALYSIS).unwrap();

    let coordinator = session.coordinator_mut();
    coordinator.timeline_mut().transport_mut().load(90.0);
    coordinator.sync_transport();

    let click = coordinator.click_room("bathroom");
    assert_eq!(click.target, 20.0);
    // 20s is more than 4s past the 12.5s event
    assert!(coordinator.active_events().is_empty());

    let event = coordinator.selected_event().unwrap().clone();
    assert_eq!(
        coordinator.classify(&event),
        irv_engine::classify::Category::AllClear
    );
}
