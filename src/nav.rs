//! Navigation state – the cursor over the currently loaded waypoint route.
//!
//! `current` is the waypoint the player is at (or just finished), `next` is
//! the one they are heading toward and `prev` the one they came from, all
//! wrapped with floor-modulo so navigation is circular. None of these
//! operations ever fail: with no group loaded (or an empty group) queries
//! return `None` and mutations are silent no-ops – absence is a normal
//! state, and validation belongs to the command layer.
//!
//! The loaded group is a working copy of the stored route. The service
//! layer writes edits through to storage and re-syncs the copy via
//! [`NavState::sync_group`], so deleting or renaming the stored group can
//! never leave this cursor dangling.

use crate::types::{WaypointGroup, WaypointPoint};
use std::time::Instant;

/// Runtime navigation state for the loaded waypoint group.
#[derive(Debug)]
pub struct NavState {
    loaded: Option<WaypointGroup>,

    /// Index of the waypoint the player is currently at. Invariant: when a
    /// non-empty group is loaded this is always a valid index into it.
    current_index: usize,

    // display settings
    /// Gates all proximity/draw work in the host.
    pub enabled: bool,
    /// Show every waypoint in the loaded group instead of prev/current/next.
    pub setup_mode: bool,

    // advance settings
    /// How close (blocks, 3-D) the player must be to `next` to arm the timer.
    pub advance_range: f64,
    /// How long (ms) the player must stay within range before auto-advance.
    pub advance_delay_ms: u64,

    // dwell timer – armed by the tick path, never persisted
    advance_timer_start: Option<Instant>,
}

impl NavState {
    pub fn new() -> Self {
        Self {
            loaded: None,
            current_index: 0,
            enabled: true,
            setup_mode: false,
            advance_range: 5.0,
            advance_delay_ms: 2000,
            advance_timer_start: None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// True iff a group is loaded and it has at least one waypoint.
    pub fn has_group(&self) -> bool {
        self.loaded.as_ref().is_some_and(|g| !g.is_empty())
    }

    pub fn size(&self) -> usize {
        self.loaded.as_ref().map_or(0, WaypointGroup::len)
    }

    pub fn loaded_group(&self) -> Option<&WaypointGroup> {
        self.loaded.as_ref()
    }

    /// Storage key of the loaded group, if any.
    pub fn loaded_key(&self) -> Option<String> {
        self.loaded.as_ref().map(WaypointGroup::key)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn next_index(&self) -> Option<usize> {
        self.has_group()
            .then(|| wrap(self.current_index as i64 + 1, self.size()))
    }

    pub fn prev_index(&self) -> Option<usize> {
        self.has_group()
            .then(|| wrap(self.current_index as i64 - 1, self.size()))
    }

    /// The waypoint the player is currently at / just finished.
    pub fn current(&self) -> Option<&WaypointPoint> {
        self.point_at(self.current_index as i64)
    }

    /// The waypoint the player is heading toward.
    pub fn next(&self) -> Option<&WaypointPoint> {
        self.point_at(self.current_index as i64 + 1)
    }

    /// The waypoint the player just came from.
    pub fn prev(&self) -> Option<&WaypointPoint> {
        self.point_at(self.current_index as i64 - 1)
    }

    fn point_at(&self, index: i64) -> Option<&WaypointPoint> {
        if !self.has_group() {
            return None;
        }
        let group = self.loaded.as_ref()?;
        group.waypoints.get(wrap(index, group.len()))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Load a group (working copy), replacing any previous one. Accepts any
    /// group, even an empty one.
    pub fn load(&mut self, group: WaypointGroup) {
        self.loaded = Some(group);
        self.current_index = 0;
        self.advance_timer_start = None;
    }

    pub fn unload(&mut self) {
        self.loaded = None;
        self.current_index = 0;
        self.advance_timer_start = None;
    }

    /// Reset the cursor back to the first waypoint without unloading.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.advance_timer_start = None;
    }

    /// Auto-advance: next becomes current. Called by the tick path when the
    /// dwell timer fires.
    pub fn advance(&mut self) {
        if !self.has_group() {
            return;
        }
        self.current_index = wrap(self.current_index as i64 + 1, self.size());
        self.advance_timer_start = None;
    }

    /// Skip forward (positive) or backward (negative) by `n` steps.
    pub fn skip(&mut self, n: i64) {
        if !self.has_group() {
            return;
        }
        self.current_index = wrap(self.current_index as i64 + n, self.size());
        self.advance_timer_start = None;
    }

    /// Jump directly to a 0-based index. Out of range is a silent no-op;
    /// the command layer validates and reports bad input.
    pub fn skip_to(&mut self, index: usize) {
        if !self.has_group() || index >= self.size() {
            return;
        }
        self.current_index = index;
        self.advance_timer_start = None;
    }

    /// Replace the working copy with a freshly edited version of the loaded
    /// group, re-normalizing the cursor into the new bounds.
    pub fn sync_group(&mut self, group: WaypointGroup) {
        self.current_index = if group.is_empty() {
            0
        } else {
            self.current_index % group.len()
        };
        self.loaded = Some(group);
        self.advance_timer_start = None;
    }

    // -----------------------------------------------------------------------
    // Dwell timer
    // -----------------------------------------------------------------------

    pub fn advance_timer(&self) -> Option<Instant> {
        self.advance_timer_start
    }

    pub fn arm_advance_timer(&mut self, now: Instant) {
        self.advance_timer_start = Some(now);
    }

    pub fn disarm_advance_timer(&mut self) {
        self.advance_timer_start = None;
    }
}

impl Default for NavState {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor-modulo: result is always in `[0, size)`, wrapping negative
/// operands toward the positive range instead of truncating toward zero.
fn wrap(index: i64, size: usize) -> usize {
    index.rem_euclid(size as i64) as usize
}
