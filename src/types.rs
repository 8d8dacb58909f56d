//! Core waypoint types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Waypoint
// ---------------------------------------------------------------------------

/// A single waypoint: a world position plus an optional display label.
///
/// Coordinates are block-granular in practice (placement floors the player
/// position) but stored as floating point, matching the persisted format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaypointPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Display label. May be empty, and may be a base-10 integer string –
    /// purely-sequential numeric labels take part in auto-renumbering.
    #[serde(default)]
    pub name: String,
}

impl WaypointPoint {
    pub fn new(x: f64, y: f64, z: f64, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            name: name.into(),
        }
    }

    /// Euclidean distance to a world position.
    pub fn distance_to(&self, ox: f64, oy: f64, oz: f64) -> f64 {
        let (dx, dy, dz) = (self.x - ox, self.y - oy, self.z - oz);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl std::fmt::Display for WaypointPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(
                f,
                "({}, {}, {})",
                self.x as i64, self.y as i64, self.z as i64
            )
        } else {
            write!(
                f,
                "{} ({}, {}, {})",
                self.name, self.x as i64, self.y as i64, self.z as i64
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named, ordered collection of waypoints (a route).
///
/// Insertion order is semantic – it defines navigation order. Duplicate
/// points are allowed and an empty group is legal (it exists but yields no
/// navigable points).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaypointGroup {
    /// Unique identifier; lookups are case-insensitive.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub waypoints: Vec<WaypointPoint>,
}

impl WaypointGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            waypoints: Vec::new(),
        }
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            waypoints: Vec::new(),
        }
    }

    /// Storage key for this group (lowercased name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Session config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How close (blocks, 3-D) the player must be to the next waypoint for
    /// the dwell timer to arm.
    pub advance_range: f64,
    /// How long (ms) the player must stay within range before auto-advance.
    pub advance_delay_ms: u64,
    /// Proximity-check tick rate of the interactive session.
    pub tick_rate_hz: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            advance_range: 5.0,
            advance_delay_ms: 2000,
            tick_rate_hz: 20.0,
        }
    }
}
