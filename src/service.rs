//! WaypointSession – glue between storage and navigation state.
//!
//! The session owns both halves and mediates every operation that touches
//! the two together: loading a stored route into the cursor, keeping the
//! cursor's working copy in sync with edits, and the per-tick proximity
//! check that drives auto-advance. Hosts that run the tick path and the
//! command path on separate threads should put the whole session behind a
//! single mutex – every compound read-then-write happens inside one call.

use crate::nav::NavState;
use crate::storage::{StorageError, WaypointStore};
use crate::types::{SessionConfig, WaypointGroup, WaypointPoint};
use std::time::Instant;

/// Produced by [`WaypointSession::tick`] when the dwell timer fired and the
/// cursor moved on.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    /// New 0-based current index after the advance.
    pub index: usize,
    /// The waypoint that was reached.
    pub point: WaypointPoint,
}

pub struct WaypointSession {
    pub store: WaypointStore,
    pub nav: NavState,
}

impl WaypointSession {
    pub fn new(store: WaypointStore, config: &SessionConfig) -> Self {
        let mut nav = NavState::new();
        nav.advance_range = config.advance_range;
        nav.advance_delay_ms = config.advance_delay_ms;
        Self { store, nav }
    }

    // -----------------------------------------------------------------------
    // Proximity tick
    // -----------------------------------------------------------------------

    /// One proximity/dwell check against the player position – the contract
    /// the original host ran once per rendered frame.
    ///
    /// Within `advance_range` of the next waypoint the timer arms on first
    /// detection; once `advance_delay_ms` has elapsed the cursor advances.
    /// Leaving the range disarms the timer.
    pub fn tick(&mut self, px: f64, py: f64, pz: f64, now: Instant) -> Option<Arrival> {
        if !self.nav.enabled || !self.nav.has_group() {
            return None;
        }
        let next = self.nav.next()?.clone();
        let dist = next.distance_to(px, py, pz);

        if dist <= self.nav.advance_range {
            match self.nav.advance_timer() {
                None => self.nav.arm_advance_timer(now),
                Some(start) => {
                    let elapsed = now.duration_since(start).as_millis() as u64;
                    if elapsed >= self.nav.advance_delay_ms {
                        self.nav.advance();
                        return Some(Arrival {
                            index: self.nav.current_index(),
                            point: next,
                        });
                    }
                }
            }
        } else {
            self.nav.disarm_advance_timer();
        }
        None
    }

    // -----------------------------------------------------------------------
    // Store/nav mediation
    // -----------------------------------------------------------------------

    /// Load a stored group into the cursor. Returns the waypoint count, or
    /// `None` when no such group exists.
    pub fn load_group(&mut self, name: &str) -> Option<usize> {
        let group = self.store.group(name)?;
        let count = group.len();
        self.nav.load(group);
        Some(count)
    }

    /// Delete a group, unloading it first if it is the loaded one.
    pub fn delete_group(&mut self, name: &str) -> Result<bool, StorageError> {
        if self.nav.loaded_key() == Some(name.to_lowercase()) {
            self.nav.unload();
        }
        let removed = self.store.remove_group(name);
        if removed {
            self.store.save_if_dirty()?;
        }
        Ok(removed)
    }

    /// Rename a group, keeping the loaded working copy in sync. An existing
    /// group under the new name is silently overwritten. Returns false when
    /// the old name does not exist.
    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<bool, StorageError> {
        let Some(mut group) = self.store.group(old) else {
            return Ok(false);
        };
        let was_loaded = self.nav.loaded_key() == Some(old.to_lowercase());

        self.store.remove_group(old);
        group.name = new.to_lowercase();
        if was_loaded {
            self.nav.sync_group(group.clone());
        }
        self.store.put_group(group);
        self.store.save_if_dirty()?;
        Ok(true)
    }

    /// Replace a group's waypoints with an imported sequence, creating the
    /// group on demand (an existing description is kept).
    pub fn import_group(
        &mut self,
        name: &str,
        waypoints: Vec<WaypointPoint>,
    ) -> Result<usize, StorageError> {
        let mut group = self
            .store
            .group(name)
            .unwrap_or_else(|| WaypointGroup::new(name.to_lowercase()));
        group.waypoints = waypoints;
        let count = group.len();
        self.commit(group)?;
        Ok(count)
    }

    /// Write-through for an edited group: re-sync the cursor's working copy
    /// when the edit targets the loaded group, then upsert and save.
    pub fn commit(&mut self, group: WaypointGroup) -> Result<(), StorageError> {
        if self.nav.loaded_key() == Some(group.key()) {
            self.nav.sync_group(group.clone());
        }
        self.store.put_group(group);
        self.store.save_if_dirty()
    }
}
