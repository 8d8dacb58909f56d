//! waypoint-nav interactive session
//!
//! Hosts the waypoint route engine as a standalone console session: a REPL
//! for the command surface plus a fixed-rate tick loop that performs the
//! proximity auto-advance check against the tracked player position.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                          | Default                 | Description                  |
//! |------------------------------|-------------------------|------------------------------|
//! | `WAYPOINTS_ADVANCE_RANGE`    | `5.0`                   | Auto-advance range (blocks)  |
//! | `WAYPOINTS_ADVANCE_DELAY_MS` | `2000`                  | Dwell delay before advance   |
//! | `WAYPOINTS_TICK_RATE_HZ`     | `20`                    | Proximity-check tick rate    |
//!
//! Console input: any command-surface line (`list`, `load <name>`, `add`…;
//! a leading `/w` or `/waypoints` is stripped), plus host-level commands
//! `pos <x> <y> <z>` to move the tracked player and `quit` to leave.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;
use waypoint_nav::command::{self, CommandHost};
use waypoint_nav::types::SessionConfig;
use waypoint_nav::{WaypointSession, WaypointStore};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "waypoint-nav", about = "Waypoint route engine", version)]
struct Args {
    /// Waypoint groups JSON file
    #[arg(
        long,
        env = "WAYPOINTS_DATA_FILE",
        default_value = "waypoints_groups.json"
    )]
    data_file: String,

    /// Optional TOML settings file (advance range/delay, tick rate)
    #[arg(long, env = "WAYPOINTS_CONFIG", default_value = "waypoints")]
    settings: String,
}

// ---------------------------------------------------------------------------
// Console host
// ---------------------------------------------------------------------------

/// Host glue for a console session: a tracked player position and an
/// in-memory clipboard standing in for the system one.
#[derive(Default)]
struct ConsoleHost {
    position: Option<(f64, f64, f64)>,
    clipboard: Option<String>,
}

impl CommandHost for ConsoleHost {
    fn player_position(&self) -> Option<(f64, f64, f64)> {
        self.position
    }

    fn clipboard_get(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn clipboard_set(&mut self, text: String) {
        println!("[clipboard] {}", text);
        self.clipboard = Some(text);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypoint_nav=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    // Built-in defaults ← optional TOML file ← WAYPOINTS_* env.
    let settings: SessionConfig = config::Config::builder()
        .add_source(config::Config::try_from(&SessionConfig::default())?)
        .add_source(config::File::with_name(&args.settings).required(false))
        .add_source(config::Environment::with_prefix("WAYPOINTS"))
        .build()
        .context("building settings")?
        .try_deserialize()
        .context("reading settings")?;

    log::info!(
        "Starting waypoint-nav (data='{}', range={}, delay={}ms, tick={}Hz)",
        args.data_file,
        settings.advance_range,
        settings.advance_delay_ms,
        settings.tick_rate_hz,
    );

    let store = WaypointStore::new(&args.data_file);
    if let Err(e) = store.load() {
        // Keep running with an empty map; the file is replaced on next save.
        log::warn!("could not load {}: {}", args.data_file, e);
    }
    let mut session = WaypointSession::new(store, &settings);
    let mut host = ConsoleHost::default();

    // The original host ran the proximity check per rendered frame and the
    // command handler on a cooperative scheduler; a single select loop gives
    // the same no-true-parallelism guarantee.
    let mut interval =
        tokio::time::interval(Duration::from_secs_f32(1.0 / settings.tick_rate_hz.max(1.0)));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("waypoint-nav session. Type 'guide' for commands, 'quit' to exit.");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some((px, py, pz)) = host.position {
                    if let Some(arrival) = session.tick(px, py, pz, Instant::now()) {
                        tracing::info!(
                            "arrived at waypoint {} ({}); heading to {}",
                            arrival.index + 1,
                            arrival.point,
                            session.nav.next().map(ToString::to_string).unwrap_or_default(),
                        );
                    }
                }
            }

            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if !handle_line(&mut session, &mut host, line.trim()) {
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    session
        .store
        .save_if_dirty()
        .context("saving waypoint groups on exit")?;
    log::info!("session closed");
    Ok(())
}

/// Handle one console line; returns false to end the session.
fn handle_line(session: &mut WaypointSession, host: &mut ConsoleHost, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    match line.split_whitespace().next() {
        Some("quit") | Some("exit") => return false,
        Some("pos") => {
            let coords: Vec<f64> = line
                .split_whitespace()
                .skip(1)
                .filter_map(|s| s.parse().ok())
                .collect();
            if coords.len() == 3 {
                host.position = Some((coords[0], coords[1], coords[2]));
                println!("Player at ({}, {}, {})", coords[0], coords[1], coords[2]);
            } else {
                println!("Usage: pos <x> <y> <z>");
            }
            return true;
        }
        _ => {}
    }

    let input = line
        .strip_prefix("/waypoints")
        .or_else(|| line.strip_prefix("/w"))
        .unwrap_or(line);
    for msg in command::dispatch(session, host, input) {
        println!("{}", msg);
    }
    true
}
