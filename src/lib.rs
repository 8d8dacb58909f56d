//! Waypoint route engine.
//!
//! Named, ordered lists of world coordinates ("waypoint groups") with
//! proximity auto-advance, JSON persistence and soopy-format interchange.
//!
//! ## Architecture
//!
//! ```text
//! command::dispatch  (command.rs) ← chat-style command surface
//!   └── WaypointSession  (service.rs)  ← dwell-timer tick, write-through glue
//!         ├── NavState       (nav.rs)     ← route cursor
//!         ├── WaypointStore  (storage.rs) ← JSON file persistence
//!         └── soopy          (soopy.rs)   ← interchange import/export
//! ```
//!
//! The host drives two paths into the session: a per-frame/tick call to
//! [`WaypointSession::tick`] (proximity + dwell timer, may auto-advance)
//! and command dispatch through [`command::dispatch`]. The `waypoint-nav`
//! binary hosts both as an interactive console session.

pub mod command;
pub mod nav;
pub mod service;
pub mod soopy;
pub mod storage;
pub mod types;

// Convenience re-exports
pub use command::{dispatch, CommandHost};
pub use nav::NavState;
pub use service::{Arrival, WaypointSession};
pub use storage::{StorageError, WaypointStore};
pub use types::{SessionConfig, WaypointGroup, WaypointPoint};
