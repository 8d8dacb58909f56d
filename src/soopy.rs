//! Soopy/coleweight-compatible waypoint interchange.
//!
//! Export writes a JSON array of `{x, y, z, r, g, b, options: {name}}`
//! entries; the color channels are fixed placeholders carried only for
//! compatibility with third-party tools. Import accepts that array form
//! or, as a fallback, plain `x y z` rows (one per line). Anything else is
//! a single "could not parse" failure with no partial results.

use crate::types::WaypointPoint;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse text as soopy waypoints")]
pub struct ParseError;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SoopyEntry<'a> {
    x: f64,
    y: f64,
    z: f64,
    r: u8,
    g: u8,
    b: u8,
    options: SoopyOptions<'a>,
}

#[derive(Serialize)]
struct SoopyOptions<'a> {
    name: &'a str,
}

/// Serialize a waypoint sequence in soopy format, compatible with
/// coleweight's `getWaypoints()` / `load()`.
pub fn export(points: &[WaypointPoint]) -> Result<String, serde_json::Error> {
    let entries: Vec<SoopyEntry<'_>> = points
        .iter()
        .map(|wp| SoopyEntry {
            x: wp.x,
            y: wp.y,
            z: wp.z,
            r: 0,
            g: 1,
            b: 0,
            options: SoopyOptions { name: &wp.name },
        })
        .collect();
    serde_json::to_string(&entries)
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse pasted text into an ordered waypoint sequence.
pub fn parse(text: &str) -> Result<Vec<WaypointPoint>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError);
    }
    if trimmed.starts_with('[') {
        parse_array(trimmed)
    } else {
        parse_rows(trimmed)
    }
}

/// Soopy array form: `[{x, y, z, options: {name}}, …]`. Coordinates may be
/// JSON numbers or numeric strings. A missing name defaults to the entry's
/// 1-based position; when every name is an integer the list is sorted by
/// its numeric value (stable, so ties keep their order).
fn parse_array(json: &str) -> Result<Vec<WaypointPoint>, ParseError> {
    let raw: Vec<Value> = serde_json::from_str(json).map_err(|_| ParseError)?;

    let mut points = Vec::with_capacity(raw.len());
    for (i, entry) in raw.iter().enumerate() {
        let x = number_field(entry, "x").ok_or(ParseError)?;
        let y = number_field(entry, "y").ok_or(ParseError)?;
        let z = number_field(entry, "z").ok_or(ParseError)?;
        let name = match entry.pointer("/options/name") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => (i + 1).to_string(),
        };
        points.push(WaypointPoint::new(x, y, z, name));
    }

    if points.iter().all(|p| p.name.parse::<i64>().is_ok()) {
        points.sort_by_key(|p| p.name.parse::<i64>().unwrap_or(0));
    }
    Ok(points)
}

/// Fallback form: whitespace-separated `x y z` rows, order preserved,
/// 1-based positional names. Rows with fewer than three fields are skipped;
/// a malformed number anywhere fails the whole import.
fn parse_rows(text: &str) -> Result<Vec<WaypointPoint>, ParseError> {
    if !text.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseError);
    }

    let mut points = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        let x: f64 = fields[0].parse().map_err(|_| ParseError)?;
        let y: f64 = fields[1].parse().map_err(|_| ParseError)?;
        let z: f64 = fields[2].parse().map_err(|_| ParseError)?;
        let name = (points.len() + 1).to_string();
        points.push(WaypointPoint::new(x, y, z, name));
    }

    if points.is_empty() {
        return Err(ParseError);
    }
    Ok(points)
}

fn number_field(entry: &Value, key: &str) -> Option<f64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
