//! Interaction coordinator
//!
//! Binds user gestures and transport events to the rest of the engine:
//! - room click: select the room's owning event and seek to the room's time
//! - marker click: select that event and seek to its timestamp
//! - track click: seek to the clicked fraction of the track
//! - transport events: update playback state and the active-event set
//!
//! Resolved rooms and screen coordinates are memoized on the identity of
//! the event store and the floor-plan layout.

use crate::classify::{Category, Classifier};
use crate::memo::Memo;
use crate::model::{Event, EventIndex, EventStore, Urgency};
use crate::projector::{project, FloorPlan, MarkerLayout, ScreenCoordinates};
use crate::rooms::{resolve_rooms, ResolvedRooms};
use crate::timeline::{
    fraction_at, timeline_view, EventSchedule, PlaybackState, TimelineController, TimelineView,
};
use crate::transport::MediaTransport;
use irv_common::{ReviewConfig, RoomTimestampMap};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

type CoordinateKey = (Uuid, Option<Uuid>);

/// One overlay icon for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayItem {
    pub location: String,
    pub category: Category,
    pub icon: &'static str,
    /// Offset from the floor-plan container's top-left corner
    pub x: f64,
    pub y: f64,
    pub event: EventIndex,
    pub urgency: Urgency,
    pub summary: String,
    /// Owning event is active at the current playback position
    pub active: bool,
    pub selected: bool,
}

/// Outcome of a room click
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomClick {
    pub location: String,
    /// Owning event of the room, now the selection
    pub selected: Option<EventIndex>,
    /// Seek target before clamping
    pub target: f64,
    /// Position actually sought to; `None` while no duration is known
    pub sought: Option<f64>,
}

pub struct InteractionCoordinator<T: MediaTransport> {
    room_timestamps: RoomTimestampMap,
    classifier: Classifier,
    highlight_window: Option<f64>,
    store: EventStore,
    floor_plan: Option<FloorPlan>,
    timeline: TimelineController<T>,
    schedule: EventSchedule,
    resolved: Memo<Uuid, ResolvedRooms>,
    coordinates: Memo<CoordinateKey, ScreenCoordinates>,
    selected: Option<EventIndex>,
}

impl<T: MediaTransport> InteractionCoordinator<T> {
    pub fn new(transport: T, room_timestamps: RoomTimestampMap) -> Self {
        let store = EventStore::empty();
        let schedule = EventSchedule::new(&store, None);
        Self {
            room_timestamps,
            classifier: Classifier::default(),
            highlight_window: None,
            store,
            floor_plan: None,
            timeline: TimelineController::new(transport),
            schedule,
            resolved: Memo::new(),
            coordinates: Memo::new(),
            selected: None,
        }
    }

    /// Build from a resolved configuration
    pub fn from_config(transport: T, config: &ReviewConfig) -> irv_common::Result<Self> {
        let classifier = match &config.classifier_rules {
            Some(rules) => Classifier::from_config(rules)?,
            None => Classifier::default(),
        };
        Ok(Self::new(transport, config.room_timestamps.clone())
            .with_classifier(classifier)
            .with_highlight_window(config.highlight_window_sec))
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_highlight_window(mut self, window: Option<f64>) -> Self {
        self.highlight_window = window;
        self.rebuild_schedule();
        self
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Replace the event store wholesale with a new analysis result's events.
    /// Clears the selection.
    pub fn load_events(&mut self, events: Vec<Event>) {
        self.store = EventStore::new(events);
        self.selected = None;
        self.rebuild_schedule();
        info!(
            "Loaded {} events (store {})",
            self.store.len(),
            self.store.generation()
        );
    }

    /// Drop all events and the selection
    pub fn clear_events(&mut self) {
        self.load_events(Vec::new());
    }

    /// Install a newly rendered floor plan; previous coordinates are invalid
    pub fn set_floor_plan(&mut self, layout: Box<dyn MarkerLayout>) {
        let plan = FloorPlan::new(layout);
        debug!("Floor plan installed, generation {}", plan.generation());
        self.floor_plan = Some(plan);
    }

    pub fn clear_floor_plan(&mut self) {
        self.floor_plan = None;
    }

    /// The floor-plan layout changed (container resize, re-render)
    pub fn notify_layout_changed(&mut self) {
        match self.floor_plan.as_mut() {
            Some(plan) => plan.invalidate(),
            None => debug!("Layout change with no floor plan installed"),
        }
    }

    /// Apply pending transport events and update the active-event set.
    ///
    /// Returns true when the active set changed.
    pub fn sync_transport(&mut self) -> bool {
        let applied = self.timeline.pump();
        let crossed = self.refresh_active();
        if applied > 0 {
            debug!(
                "Applied {} transport events, position {:.2}s",
                applied,
                self.timeline.current_time()
            );
        }
        crossed
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Room marker clicked on the floor plan.
    ///
    /// Seek target preference: the room's canonical time, then the owning
    /// event's timestamp, then 0.
    pub fn click_room(&mut self, location: &str) -> RoomClick {
        let owner = self.resolved_rooms().get(location);
        let event_time = owner
            .and_then(|index| self.store.get(index))
            .and_then(|event| event.timestamp_sec);

        let target = self
            .room_timestamps
            .get(location)
            .or(event_time)
            .unwrap_or(0.0);

        self.select(owner);
        let sought = self.timeline.seek_to(target);
        self.refresh_active();

        info!(
            "Room '{}' clicked: selected {:?}, target {:.1}s",
            location, owner, target
        );
        RoomClick {
            location: location.to_string(),
            selected: owner,
            target,
            sought,
        }
    }

    /// Timeline marker clicked. Unknown indices are ignored.
    pub fn click_marker(&mut self, index: EventIndex) -> Option<f64> {
        let Some(event) = self.store.get(index) else {
            warn!("Marker click for unknown event {:?}", index);
            return None;
        };
        let timestamp = event.timestamp_sec;

        self.select(Some(index));
        let sought = timestamp.and_then(|ts| self.timeline.seek_to(ts));
        self.refresh_active();
        sought
    }

    /// Scrub track clicked `offset_x` pixels from its left edge
    pub fn click_track(&mut self, offset_x: f64, track_width: f64) -> Option<f64> {
        let fraction = fraction_at(offset_x, track_width)?;
        let sought = self.timeline.seek_to_fraction(fraction);
        self.refresh_active();
        sought
    }

    pub fn request_play(&mut self) {
        self.timeline.request_play();
    }

    pub fn request_pause(&mut self) {
        self.timeline.request_pause();
    }

    pub fn toggle_play(&mut self) {
        self.timeline.toggle_play();
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn room_timestamps(&self) -> &RoomTimestampMap {
        &self.room_timestamps
    }

    pub fn playback(&self) -> PlaybackState {
        self.timeline.playback()
    }

    pub fn timeline(&self) -> &TimelineController<T> {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineController<T> {
        &mut self.timeline
    }

    pub fn selected_index(&self) -> Option<EventIndex> {
        self.selected
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected.and_then(|index| self.store.get(index))
    }

    /// Events active at the current position, in store order
    pub fn active_events(&self) -> &[EventIndex] {
        self.schedule.current()
    }

    pub fn classify(&self, event: &Event) -> Category {
        self.classifier.classify(&event.event_summary)
    }

    /// Owning event per room (memoized on the event store)
    pub fn resolved_rooms(&mut self) -> &ResolvedRooms {
        let store = &self.store;
        self.resolved
            .get_or_compute(store.generation(), || resolve_rooms(store))
    }

    /// Screen position per room (memoized on event store and floor plan)
    pub fn screen_coordinates(&mut self) -> &ScreenCoordinates {
        let (_, coordinates) = refresh_derived(
            &self.store,
            self.floor_plan.as_ref(),
            &mut self.resolved,
            &mut self.coordinates,
        );
        coordinates
    }

    /// Overlay render input: one item per room with both an owning event
    /// and a screen position, in location order
    pub fn overlay(&mut self) -> Vec<OverlayItem> {
        let (resolved, coordinates) = refresh_derived(
            &self.store,
            self.floor_plan.as_ref(),
            &mut self.resolved,
            &mut self.coordinates,
        );
        let active = self.schedule.current();

        coordinates
            .iter()
            .filter_map(|(location, point)| {
                let index = resolved.get(location)?;
                let event = self.store.get(index)?;
                let category = self.classifier.classify(&event.event_summary);
                Some(OverlayItem {
                    location: location.to_string(),
                    category,
                    icon: category.icon(),
                    x: point.x,
                    y: point.y,
                    event: index,
                    urgency: event.urgency,
                    summary: event.event_summary.clone(),
                    active: active.contains(&index),
                    selected: self.selected == Some(index),
                })
            })
            .collect()
    }

    /// Scrub-track render input; `None` while the duration is unknown
    pub fn timeline_view(&self) -> Option<TimelineView> {
        timeline_view(&self.store, &self.timeline.playback(), self.schedule.current())
    }

    /// Detach from the transport
    pub fn teardown(&mut self) {
        self.timeline.detach();
    }

    // ------------------------------------------------------------------

    fn select(&mut self, index: Option<EventIndex>) {
        if self.selected != index {
            debug!("Selection {:?} -> {:?}", self.selected, index);
        }
        self.selected = index;
    }

    fn rebuild_schedule(&mut self) {
        self.schedule = EventSchedule::new(&self.store, self.highlight_window);
        self.schedule.check_boundary(self.timeline.current_time());
    }

    fn refresh_active(&mut self) -> bool {
        let (crossed, active) = self.schedule.check_boundary(self.timeline.current_time());
        if crossed {
            info!(
                "Active events at {:.1}s: {:?}",
                self.timeline.current_time(),
                active
            );
        }
        crossed
    }
}

/// Bring both memoized derivations up to date and borrow them
fn refresh_derived<'a>(
    store: &'a EventStore,
    floor_plan: Option<&'a FloorPlan>,
    resolved: &'a mut Memo<Uuid, ResolvedRooms>,
    coordinates: &'a mut Memo<CoordinateKey, ScreenCoordinates>,
) -> (&'a ResolvedRooms, &'a ScreenCoordinates) {
    let store_generation = store.generation();
    let rooms = resolved.get_or_compute(store_generation, || resolve_rooms(store));

    let key = (store_generation, floor_plan.map(FloorPlan::generation));
    let points = coordinates.get_or_compute(key, || match floor_plan {
        Some(plan) => project(rooms, plan.layout()),
        None => ScreenCoordinates::default(),
    });
    (rooms, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{Rect, StaticLayout};
    use crate::transport::SimulatedTransport;

    fn coordinator() -> InteractionCoordinator<SimulatedTransport> {
        InteractionCoordinator::new(SimulatedTransport::new(), RoomTimestampMap::default())
    }

    fn layout() -> Box<StaticLayout> {
        Box::new(
            StaticLayout::new(Rect::new(0.0, 0.0, 400.0, 300.0))
                .with_marker("bathroom", Rect::new(10.0, 10.0, 20.0, 20.0))
                .with_marker("kitchen", Rect::new(100.0, 100.0, 20.0, 20.0)),
        )
    }

    #[test]
    fn test_resolved_rooms_memoized_on_store() {
        let mut coordinator = coordinator();
        coordinator.load_events(vec![Event::new("a").in_room("bathroom")]);

        coordinator.resolved_rooms();
        coordinator.resolved_rooms();
        assert_eq!(coordinator.resolved.computations(), 1);

        coordinator.load_events(vec![Event::new("b").in_room("bathroom")]);
        coordinator.resolved_rooms();
        assert_eq!(coordinator.resolved.computations(), 2);
    }

    #[test]
    fn test_coordinates_recomputed_on_layout_change() {
        let mut coordinator = coordinator();
        coordinator.load_events(vec![Event::new("a").in_room("bathroom")]);
        coordinator.set_floor_plan(layout());

        coordinator.screen_coordinates();
        coordinator.overlay();
        assert_eq!(coordinator.coordinates.computations(), 1);

        coordinator.notify_layout_changed();
        coordinator.screen_coordinates();
        assert_eq!(coordinator.coordinates.computations(), 2);
        // Store unchanged, rooms not re-resolved
        assert_eq!(coordinator.resolved.computations(), 1);
    }

    #[test]
    fn test_no_floor_plan_no_coordinates() {
        let mut coordinator = coordinator();
        coordinator.load_events(vec![Event::new("a").in_room("bathroom")]);
        assert!(coordinator.screen_coordinates().is_empty());
        assert!(coordinator.overlay().is_empty());
    }

    #[test]
    fn test_marker_selection_replaces() {
        let mut coordinator = coordinator();
        coordinator.load_events(vec![Event::new("a"), Event::new("b")]);
        coordinator.click_marker(EventIndex(0));
        coordinator.click_marker(EventIndex(1));
        assert_eq!(coordinator.selected_index(), Some(EventIndex(1)));
        coordinator.clear_selection();
        assert!(coordinator.selected_event().is_none());
    }

    #[test]
    fn test_unknown_marker_ignored() {
        let mut coordinator = coordinator();
        coordinator.load_events(vec![Event::new("a").at(3.0)]);
        coordinator.click_marker(EventIndex(0));
        assert_eq!(coordinator.click_marker(EventIndex(9)), None);
        assert_eq!(coordinator.selected_index(), Some(EventIndex(0)));
    }
}
