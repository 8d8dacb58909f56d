//! Chat-style command surface.
//!
//! Parses `<subcommand> [args…]` strings into storage and navigation
//! operations and returns the chat lines to show the user. The host (game
//! client, console session, test harness) supplies player position and
//! clipboard access through [`CommandHost`].
//!
//! The core never reports errors – every validation message here exists
//! because the command layer is the one place that checks ranges and names
//! before touching it.

use crate::service::WaypointSession;
use crate::soopy;
use crate::storage::StorageError;
use crate::types::{WaypointGroup, WaypointPoint};

/// Everything the dispatcher needs from its host environment.
pub trait CommandHost {
    /// Player feet position, if a player is present in a world.
    fn player_position(&self) -> Option<(f64, f64, f64)>;
    fn clipboard_get(&self) -> Option<String>;
    fn clipboard_set(&mut self, text: String);
}

/// Dispatch one command line; returns the chat lines to display.
pub fn dispatch(
    session: &mut WaypointSession,
    host: &mut dyn CommandHost,
    input: &str,
) -> Vec<String> {
    let args: Vec<&str> = input.split_whitespace().collect();
    let mut out = Vec::new();

    if args.is_empty() {
        list_groups(session, &mut out);
        return out;
    }

    match args[0].to_lowercase().as_str() {
        "guide" => guide(&mut out),
        "list" => list_groups(session, &mut out),

        // ------------------------------------------------------------ navigation
        "load" => {
            if args.len() < 2 {
                out.push("Usage: load <name>".into());
            } else {
                match session.load_group(args[1]) {
                    Some(count) => out.push(format!(
                        "Loaded group {} ({} waypoints).",
                        args[1].to_lowercase(),
                        count
                    )),
                    None => out.push(format!("Group '{}' not found.", args[1])),
                }
            }
        }

        "unload" | "clear" => {
            session.nav.unload();
            out.push("Waypoints unloaded.".into());
        }

        "setup" => {
            session.nav.setup_mode = !session.nav.setup_mode;
            out.push(format!(
                "Setup mode: {}.",
                if session.nav.setup_mode { "ON" } else { "OFF" }
            ));
        }

        "reset" => {
            if !session.nav.has_group() {
                out.push("No group loaded.".into());
            } else {
                session.nav.reset();
                out.push("Reset to waypoint 1.".into());
            }
        }

        "enable" => {
            session.nav.enabled = true;
            out.push("Waypoints enabled.".into());
        }

        "disable" => {
            session.nav.enabled = false;
            out.push("Waypoints disabled.".into());
        }

        "skip" | "unskip" => {
            if !session.nav.has_group() {
                out.push("No group loaded.".into());
            } else {
                // Unparsable argument falls back to a single step.
                let n: i64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
                let signed = if args[0].eq_ignore_ascii_case("unskip") {
                    -n
                } else {
                    n
                };
                session.nav.skip(signed);
                let verb = if signed < 0 { "Went back" } else { "Skipped" };
                out.push(format!(
                    "{} {}. Now at: {}/{}",
                    verb,
                    n,
                    session.nav.current_index() + 1,
                    session.nav.size()
                ));
            }
        }

        "skipto" => {
            if !session.nav.has_group() {
                out.push("No group loaded.".into());
            } else if args.len() < 2 {
                out.push("Usage: skipto <number>".into());
            } else {
                let n: i64 = args[1].parse().unwrap_or(-1);
                let size = session.nav.size() as i64;
                if n < 1 || n > size {
                    out.push(format!("Index out of range (1-{}).", size));
                } else {
                    session.nav.skip_to(n as usize - 1);
                    out.push(format!("Jumped to waypoint {}.", n));
                }
            }
        }

        // ------------------------------------------------------ group management
        "create" => {
            if args.len() < 2 {
                out.push("Usage: create <name> [description]".into());
            } else {
                let name = args[1].to_lowercase();
                if session.store.group(&name).is_some() {
                    out.push(format!("Group '{}' already exists. Delete it first.", name));
                } else {
                    let desc = args[2..].join(" ");
                    session
                        .store
                        .put_group(WaypointGroup::with_description(name.clone(), desc));
                    save(session, &mut out);
                    out.push(format!(
                        "Created group {}. Use load {} then add to populate.",
                        name, name
                    ));
                }
            }
        }

        "delete" => {
            if args.len() < 2 {
                out.push("Usage: delete <name>".into());
            } else {
                let name = args[1].to_lowercase();
                match session.delete_group(&name) {
                    Ok(true) => out.push(format!("Deleted group {}.", name)),
                    Ok(false) => out.push(format!("Group '{}' not found.", name)),
                    Err(e) => report_save_error(&e, &mut out),
                }
            }
        }

        "rename" => {
            if args.len() < 3 {
                out.push("Usage: rename <oldname> <newname>".into());
            } else {
                let (old, new) = (args[1].to_lowercase(), args[2].to_lowercase());
                match session.rename_group(&old, &new) {
                    Ok(true) => out.push(format!("Renamed {} to {}.", old, new)),
                    Ok(false) => out.push(format!("Group '{}' not found.", old)),
                    Err(e) => report_save_error(&e, &mut out),
                }
            }
        }

        // ---------------------------------------------------- waypoint editing
        "add" => add_waypoint(session, host, &args, &mut out),
        "insert" => insert_waypoint(session, host, &args, &mut out),
        "remove" => remove_waypoint(session, &args, &mut out),

        // ----------------------------------------------------- import / export
        "export" => export_group(session, host, &args, &mut out),
        "import" => import_group(session, host, &args, &mut out),

        // ------------------------------------------------------------ settings
        "range" => {
            if args.len() < 2 {
                out.push(format!(
                    "Current advance range: {} blocks. Usage: range <blocks>",
                    session.nav.advance_range
                ));
            } else {
                let r: f64 = args[1].parse().unwrap_or(-1.0);
                if r <= 0.0 {
                    out.push("Invalid range.".into());
                } else {
                    session.nav.advance_range = r;
                    out.push(format!("Advance range set to {} blocks.", r));
                }
            }
        }

        "time" => {
            if args.len() < 2 {
                out.push(format!(
                    "Current advance delay: {}ms. Usage: time <ms>",
                    session.nav.advance_delay_ms
                ));
            } else {
                let t: i64 = args[1].parse().unwrap_or(-1);
                if t <= 0 {
                    out.push("Invalid delay.".into());
                } else {
                    session.nav.advance_delay_ms = t as u64;
                    out.push(format!("Advance delay set to {}ms.", t));
                }
            }
        }

        "save" => match session.store.save_force() {
            Ok(()) => out.push("Saved all groups to disk.".into()),
            Err(e) => report_save_error(&e, &mut out),
        },

        "info" => info(session, &mut out),

        other => out.push(format!("Unknown subcommand '{}'. Try guide for help.", other)),
    }

    out
}

// ---------------------------------------------------------------------------
// Subcommand bodies
// ---------------------------------------------------------------------------

fn list_groups(session: &WaypointSession, out: &mut Vec<String>) {
    let groups = session.store.groups();

    out.push("===== Waypoint Groups =====".into());
    if groups.is_empty() {
        out.push("No groups saved. Use create <name> to make one.".into());
        return;
    }
    for group in groups.values() {
        let mut line = format!("{} ({} wps)", group.name, group.len());
        if !group.description.is_empty() {
            line.push_str(&format!(" - {}", group.description));
        }
        out.push(line);
    }
    out.push("create | load | add | export | import | setup | info".into());
}

fn guide(out: &mut Vec<String>) {
    out.push("===== Waypoints Guide =====".into());
    out.push("list - Show all waypoint groups".into());
    out.push("create <name> - Create a new group".into());
    out.push("delete <name> - Delete a group".into());
    out.push("rename <old> <new> - Rename a group".into());
    out.push("load <name> - Load a group".into());
    out.push("add [name] - Add waypoint at your position".into());
    out.push("insert <index> [name] - Insert waypoint at index".into());
    out.push("remove <index> - Remove waypoint".into());
    out.push("skip [n] - Skip forward".into());
    out.push("unskip [n] - Go backward".into());
    out.push("skipto <index> - Jump to waypoint".into());
    out.push("reset - Reset to first waypoint".into());
    out.push("enable / disable - Toggle rendering work".into());
    out.push("export [name] - Copy route to clipboard".into());
    out.push("import <name> - Import from clipboard".into());
    out.push("range <blocks> - Set auto-advance range".into());
    out.push("time <ms> - Set auto-advance delay".into());
    out.push("info - Show current route info".into());
    out.push("save - Force save to disk".into());
    out.push("setup - Show all waypoints in the loaded group at once".into());
}

/// `add [name…]` with a group loaded, or `add <group> [name]` without one.
fn add_waypoint(
    session: &mut WaypointSession,
    host: &dyn CommandHost,
    args: &[&str],
    out: &mut Vec<String>,
) {
    let Some(pos) = host.player_position() else {
        out.push("No player position available.".into());
        return;
    };
    let (bx, by, bz) = block_under(pos);

    let (mut group, label) = match session.nav.loaded_group() {
        Some(loaded) => {
            let label = if args.len() >= 2 {
                args[1..].join(" ")
            } else {
                (loaded.len() + 1).to_string()
            };
            (loaded.clone(), label)
        }
        None => {
            // Allow `add <groupname> [wpname]` without loading first.
            let named = args.get(1).and_then(|name| session.store.group(name));
            let Some(group) = named else {
                out.push("No group loaded. Use load <name> first.".into());
                return;
            };
            let label = args
                .get(2)
                .map(|s| s.to_string())
                .unwrap_or_else(|| (group.len() + 1).to_string());
            (group, label)
        }
    };

    group.waypoints.push(WaypointPoint::new(bx, by, bz, label.clone()));
    let (gname, total) = (group.name.clone(), group.len());
    match session.commit(group) {
        Ok(()) => out.push(format!(
            "Added {} at ({}, {}, {}) to group {}. Total: {}",
            label, bx as i64, by as i64, bz as i64, gname, total
        )),
        Err(e) => report_save_error(&e, out),
    }
}

/// `insert <1-based index> [name]` into the loaded group, renumbering
/// purely-sequential numeric labels after the insertion point.
fn insert_waypoint(
    session: &mut WaypointSession,
    host: &dyn CommandHost,
    args: &[&str],
    out: &mut Vec<String>,
) {
    if !session.nav.has_group() {
        out.push("No group loaded.".into());
        return;
    }
    if args.len() < 2 {
        out.push("Usage: insert <index> [name]".into());
        return;
    }
    let idx: i64 = args[1].parse().unwrap_or(-1);
    let size = session.nav.size() as i64;
    if idx < 1 || idx > size + 1 {
        out.push(format!("Index out of range (1-{}).", size + 1));
        return;
    }
    let Some(pos) = host.player_position() else {
        out.push("No player position available.".into());
        return;
    };
    let (bx, by, bz) = block_under(pos);
    let label = args
        .get(2)
        .map(|s| s.to_string())
        .unwrap_or_else(|| idx.to_string());

    // has_group() above guarantees a loaded group
    let Some(loaded) = session.nav.loaded_group() else {
        return;
    };
    let mut group = loaded.clone();
    let idx = idx as usize;
    group
        .waypoints
        .insert(idx - 1, WaypointPoint::new(bx, by, bz, label.clone()));
    renumber_numeric_labels(&mut group, idx);

    match session.commit(group) {
        Ok(()) => out.push(format!(
            "Inserted {} at index {} ({}, {}, {}).",
            label, idx, bx as i64, by as i64, bz as i64
        )),
        Err(e) => report_save_error(&e, out),
    }
}

/// `remove <1-based index>` from the loaded group.
fn remove_waypoint(session: &mut WaypointSession, args: &[&str], out: &mut Vec<String>) {
    if !session.nav.has_group() {
        out.push("No group loaded.".into());
        return;
    }
    if args.len() < 2 {
        out.push("Usage: remove <index>".into());
        return;
    }
    let idx: i64 = args[1].parse().unwrap_or(-1);
    let size = session.nav.size() as i64;
    if idx < 1 || idx > size {
        out.push(format!("Index out of range (1-{}).", size));
        return;
    }
    let Some(loaded) = session.nav.loaded_group() else {
        return;
    };
    let mut group = loaded.clone();
    let removed = group.waypoints.remove(idx as usize - 1);
    let shown = if removed.name.is_empty() {
        idx.to_string()
    } else {
        removed.name.clone()
    };
    match session.commit(group) {
        Ok(()) => out.push(format!("Removed waypoint {}.", shown)),
        Err(e) => report_save_error(&e, out),
    }
}

/// `export [name]` – loaded group by default.
fn export_group(
    session: &WaypointSession,
    host: &mut dyn CommandHost,
    args: &[&str],
    out: &mut Vec<String>,
) {
    let group = if args.len() >= 2 {
        match session.store.group(args[1]) {
            Some(g) => g,
            None => {
                out.push(format!("Group '{}' not found.", args[1]));
                return;
            }
        }
    } else {
        match session.nav.loaded_group() {
            Some(g) if session.nav.has_group() => g.clone(),
            _ => {
                out.push("No group loaded and no name given. Use export <name>.".into());
                return;
            }
        }
    };

    match soopy::export(&group.waypoints) {
        Ok(json) => {
            host.clipboard_set(json);
            out.push(format!(
                "Copied {} waypoints ({}) to clipboard.",
                group.len(),
                group.name
            ));
        }
        Err(e) => {
            log::warn!("soopy export failed: {}", e);
            out.push("Export failed.".into());
        }
    }
}

/// `import <name>` – replace the group's waypoints from the clipboard.
fn import_group(
    session: &mut WaypointSession,
    host: &dyn CommandHost,
    args: &[&str],
    out: &mut Vec<String>,
) {
    if args.len() < 2 {
        out.push("Usage: import <groupname>".into());
        return;
    }
    let name = args[1].to_lowercase();
    let clip = host.clipboard_get().unwrap_or_default();
    if clip.trim().is_empty() {
        out.push("Clipboard is empty.".into());
        return;
    }
    let Ok(points) = soopy::parse(&clip) else {
        out.push(
            "Could not parse clipboard as soopy waypoints. Copy a soopy/coleweight route first."
                .into(),
        );
        return;
    };
    match session.import_group(&name, points) {
        Ok(count) => out.push(format!("Imported {} waypoints into group {}.", count, name)),
        Err(e) => report_save_error(&e, out),
    }
}

fn info(session: &WaypointSession, out: &mut Vec<String>) {
    if !session.nav.has_group() {
        out.push("No group loaded.".into());
        return;
    }
    let nav = &session.nav;
    // has_group() above guarantees a loaded group
    let Some(group) = nav.loaded_group() else {
        return;
    };
    out.push(format!(
        "Group: {} | At: {}/{} | Setup: {} | Range: {}m | Delay: {}ms",
        group.name,
        nav.current_index() + 1,
        group.len(),
        nav.setup_mode,
        nav.advance_range,
        nav.advance_delay_ms
    ));
    if let Some(cur) = nav.current() {
        out.push(format!("Current: {}", cur));
    }
    if let Some(next) = nav.next() {
        out.push(format!("Next:    {}", next));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// After inserting at `from_one_based`, bump every numeric label at or after
/// that position by one – but only if its value equals its 0-based position,
/// i.e. it was still in its original sequential spot. Labels the user
/// renamed or reordered stay untouched.
fn renumber_numeric_labels(group: &mut WaypointGroup, from_one_based: usize) {
    for i in from_one_based..group.waypoints.len() {
        let wp = &mut group.waypoints[i];
        if let Ok(n) = wp.name.parse::<usize>() {
            if n == i {
                wp.name = (i + 1).to_string();
            }
        }
    }
}

/// Waypoints are placed on the block under the player's feet.
fn block_under((x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
    (x.floor(), y.floor() - 1.0, z.floor())
}

fn save(session: &WaypointSession, out: &mut Vec<String>) {
    if let Err(e) = session.store.save_if_dirty() {
        report_save_error(&e, out);
    }
}

fn report_save_error(e: &StorageError, out: &mut Vec<String>) {
    log::warn!("failed to save waypoint groups: {}", e);
    out.push(format!("Failed to save waypoints: {}", e));
}
