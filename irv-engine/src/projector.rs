//! Coordinate projection onto the rendered floor plan
//!
//! The core never queries a render tree. The presentation layer supplies a
//! [`MarkerLayout`] that answers "where is the marker for this room?"; the
//! projector turns each resolved room into a point relative to the
//! floor-plan container's top-left corner, so overlay icons can be absolutely
//! positioned inside that same container.

use crate::rooms::ResolvedRooms;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Axis-aligned bounding box in page coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Visual center of the box
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn is_usable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Pixel offset from the floor-plan container origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Layout queries supplied by the presentation layer
pub trait MarkerLayout {
    /// Bounds of the floor-plan container, in the same space as marker bounds
    fn container_bounds(&self) -> Rect;

    /// Bounds of the marker whose identifier equals `location_id`, if rendered
    fn marker_bounds(&self, location_id: &str) -> Option<Rect>;
}

/// A rendered floor plan and its layout identity.
///
/// A new floor plan, or any layout-affecting change such as a container
/// resize, gets a new generation so stale coordinates are never reused.
pub struct FloorPlan {
    generation: Uuid,
    layout: Box<dyn MarkerLayout>,
}

impl FloorPlan {
    pub fn new(layout: Box<dyn MarkerLayout>) -> Self {
        Self {
            generation: Uuid::new_v4(),
            layout,
        }
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn layout(&self) -> &dyn MarkerLayout {
        self.layout.as_ref()
    }

    /// Mark the current layout as changed (resize, re-render)
    pub fn invalidate(&mut self) {
        self.generation = Uuid::new_v4();
        debug!("Floor plan layout invalidated, generation {}", self.generation);
    }
}

impl fmt::Debug for FloorPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloorPlan")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Screen position per resolved room
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScreenCoordinates {
    by_location: BTreeMap<String, ScreenPoint>,
}

impl ScreenCoordinates {
    pub fn get(&self, location: &str) -> Option<ScreenPoint> {
        self.by_location.get(location).copied()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.by_location.contains_key(location)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ScreenPoint)> {
        self.by_location.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

/// Project every resolved room that has a rendered marker.
///
/// Rooms the floor plan does not define are omitted; that is expected for
/// plans that don't cover every room name and is not an error.
pub fn project(rooms: &ResolvedRooms, layout: &dyn MarkerLayout) -> ScreenCoordinates {
    let container = layout.container_bounds();
    let mut by_location = BTreeMap::new();

    for location in rooms.locations() {
        let Some(bounds) = layout.marker_bounds(location).filter(Rect::is_usable) else {
            debug!("No marker for room '{}' on this floor plan", location);
            continue;
        };

        let (cx, cy) = bounds.center();
        by_location.insert(
            location.to_string(),
            ScreenPoint {
                x: cx - container.x,
                y: cy - container.y,
            },
        );
    }

    debug!(
        "Projected {} of {} resolved rooms",
        by_location.len(),
        rooms.len()
    );
    ScreenCoordinates { by_location }
}

/// Fixed layout, typically captured from a rendered floor plan and saved
/// as JSON: `{ "container": Rect, "markers": { "<room>": Rect } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticLayout {
    pub container: Rect,
    #[serde(default)]
    pub markers: HashMap<String, Rect>,
}

impl StaticLayout {
    pub fn new(container: Rect) -> Self {
        Self {
            container,
            markers: HashMap::new(),
        }
    }

    pub fn with_marker(mut self, location: impl Into<String>, bounds: Rect) -> Self {
        self.markers.insert(location.into(), bounds);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl MarkerLayout for StaticLayout {
    fn container_bounds(&self) -> Rect {
        self.container
    }

    fn marker_bounds(&self, location_id: &str) -> Option<Rect> {
        self.markers.get(location_id).copied()
    }
}
