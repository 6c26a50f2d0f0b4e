use crate::models::{BookingWindow, CaregiverRecord, Commitment, GeoPoint, SeniorRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when loading care data
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API returned error: {0}")]
    Api(String),
}

/// Source of caregiver, senior and booking data
///
/// Implementations own the I/O; the matching engine only ever sees the
/// records they return.
#[async_trait]
pub trait CareDataRepository: Send + Sync {
    /// Every caregiver in the pool
    ///
    /// When a booking window is given, bookings that could overlap it are
    /// attached to each caregiver as commitments.
    async fn load_caregivers(
        &self,
        window: Option<&BookingWindow>,
    ) -> Result<Vec<CaregiverRecord>, RepositoryError>;

    /// Look up a senior by id. `Ok(None)` when no such senior exists.
    async fn find_senior(&self, senior_id: &str) -> Result<Option<SeniorRecord>, RepositoryError>;

    /// Number of senior records, when the source can count them
    async fn count_seniors(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(None)
    }

    /// Number of booking records in any state, when the source can count them
    async fn count_bookings(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(None)
    }

    /// Short label used in logs
    fn name(&self) -> &'static str;
}

/// Booking row as stored by the data layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRow {
    pub caregiver_id: String,
    #[serde(flatten)]
    pub commitment: Commitment,
}

/// Dates whose bookings can overlap the window
///
/// Starts a day early so an overnight booking from the previous evening is
/// still seen, and ends on the date the window itself ends. A window with no
/// computable end covers only its own date.
pub fn commitment_dates(window: &BookingWindow) -> (NaiveDate, NaiveDate) {
    let first = window.date.pred_opt().unwrap_or(window.date);
    let last = window
        .end()
        .map(|end| end.date())
        .unwrap_or(window.date)
        .max(window.date);
    (first, last)
}

/// Attach each booking to its caregiver, dropping bookings for unknown ids
pub fn attach_commitments(caregivers: &mut [CaregiverRecord], bookings: Vec<BookingRow>) {
    let index: HashMap<String, usize> = caregivers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();

    for booking in bookings {
        match index.get(&booking.caregiver_id) {
            Some(&i) => caregivers[i].commitments.push(booking.commitment),
            None => tracing::trace!("Booking for unknown caregiver {}", booking.caregiver_id),
        }
    }
}

/// Parse a PostGIS point, e.g. `SRID=4326;POINT(90.37091 23.763455)`
///
/// Coordinates are in `lon lat` order. Returns `None` for anything else.
pub fn parse_ewkt_point(value: &str) -> Option<GeoPoint> {
    let value = value.trim();
    let body = match value.split_once(';') {
        Some((srid, rest)) if srid.trim().to_uppercase().starts_with("SRID=") => rest.trim(),
        _ => value,
    };

    let inner = body
        .strip_prefix("POINT")
        .or_else(|| body.strip_prefix("point"))?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(GeoPoint::new(lat, lon))
}

/// Location columns come back as EWKT text or as a GeoJSON point
pub(crate) fn location_from_json(value: &serde_json::Value) -> Option<GeoPoint> {
    match value {
        serde_json::Value::String(text) => parse_ewkt_point(text),
        serde_json::Value::Object(map) => {
            let coords = map.get("coordinates")?.as_array()?;
            let lon = coords.first()?.as_f64()?;
            let lat = coords.get(1)?.as_f64()?;
            Some(GeoPoint::new(lat, lon))
        }
        _ => None,
    }
}

/// A list column stored either as a JSON array or as a JSON-encoded string
pub(crate) fn string_list_from_json(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        serde_json::Value::String(text) => serde_json::from_str::<Vec<String>>(text)
            .unwrap_or_else(|_| crate::models::split_skill_list(text)),
        _ => vec![],
    }
}
