//! Turns a wire-level matching request into an engine `CareRequest`.
//!
//! This is the caller side of the engine boundary: a senior reference is
//! looked up by the route or CLI first and handed in here as a record.

use crate::error::MatchError;
use crate::models::{
    BookingWindow, CareRequest, FindMatchesRequest, GenderPreference, GeoPoint, Origin, QueryEcho,
    SeniorRecord, MAX_BOOKING_HOURS,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeSet;

/// Services every senior gets when skills come from medical conditions
pub const BASELINE_SERVICES: [&str; 3] = ["Personal Care", "Companionship", "Medication Management"];

/// Service assumed for a condition with no specific mapping
const FALLBACK_SERVICE: &str = "Personal Care";

/// Medical condition (Bengali or English) to the service that covers it
const CONDITION_SERVICES: &[(&[&str], &str)] = &[
    (&["ডায়াবেটিস", "diabetes"], "Diabetes Care"),
    (&["উচ্চ রক্তচাপ", "hypertension", "high blood pressure"], "Blood Pressure Monitoring"),
    (&["ডিমেনশিয়া", "dementia"], "Dementia Care"),
    (&["পারকিনসন্স", "parkinsons", "parkinson's"], "Palliative Care"),
    (&["স্ট্রোক", "stroke"], "Post-Surgery Care"),
    (&["আর্থ্রাইটিস", "arthritis"], "Mobility Assistance"),
    (&["হৃদরোগ", "heart disease"], "Nursing"),
];

/// Fallbacks applied to fields the request leaves out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDefaults {
    pub top_n: usize,
    pub max_top_n: usize,
    pub duration_hrs: f64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            top_n: 5,
            max_top_n: 50,
            duration_hrs: 4.0,
        }
    }
}

/// Fail early when the request can never be resolved
pub fn check_origin_fields(req: &FindMatchesRequest) -> Result<(), MatchError> {
    let has_senior = req.senior_id.as_deref().is_some_and(|id| !id.trim().is_empty());
    let has_point = req.senior_lat.is_some() && req.senior_lon.is_some();

    if !has_senior && !has_point {
        return Err(MatchError::invalid(
            "Either senior_id or (senior_lat, senior_lon) must be provided",
        ));
    }

    if req.booking_date.is_none() || req.start_time.is_none() {
        return Err(MatchError::invalid("booking_date and start_time are required"));
    }

    Ok(())
}

/// Build the engine request and the query echo
///
/// A supplied senior record provides the origin and fills in gender, area
/// and (through medical conditions) required skills the request left out.
pub fn resolve_request(
    req: &FindMatchesRequest,
    senior: Option<&SeniorRecord>,
    defaults: &RequestDefaults,
) -> Result<(CareRequest, QueryEcho), MatchError> {
    check_origin_fields(req)?;

    let explicit_point = match (req.senior_lat, req.senior_lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    let origin = match senior {
        Some(senior) => senior
            .location
            .or(explicit_point)
            .ok_or_else(|| MatchError::invalid(format!("senior {} has no location on record", senior.id)))?,
        None => explicit_point.ok_or_else(|| {
            MatchError::invalid("senior_lat and senior_lon are required when no senior record is available")
        })?,
    };

    let preferred_gender = match non_blank(req.senior_gender.as_deref()) {
        Some(label) => Some(label.parse::<GenderPreference>().map_err(MatchError::InvalidRequest)?),
        None => senior.map(|s| GenderPreference::from(s.gender)),
    };

    let preferred_area = non_blank(req.senior_area.as_deref())
        .map(str::to_string)
        .or_else(|| senior.and_then(|s| s.area.clone()));

    let required_skills: BTreeSet<String> = if !req.required_skills.is_empty() {
        req.required_skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        match senior {
            Some(senior) if !senior.medical_conditions.is_empty() => {
                skills_for_conditions(&senior.medical_conditions)
            }
            _ => BTreeSet::new(),
        }
    };

    let booking_date = req.booking_date.as_deref().unwrap_or_default();
    let start_time = req.start_time.as_deref().unwrap_or_default();
    let booking_window = BookingWindow {
        date: parse_date(booking_date)?,
        start_time: parse_time(start_time)?,
        duration_hours: req.duration_hrs.unwrap_or(defaults.duration_hrs),
    };
    if !booking_window.duration_hours.is_finite() || booking_window.duration_hours <= 0.0 {
        return Err(MatchError::invalid("duration_hrs must be a positive number"));
    }
    if booking_window.duration_hours > MAX_BOOKING_HOURS {
        return Err(MatchError::invalid(format!(
            "duration_hrs must be at most {} hours",
            MAX_BOOKING_HOURS
        )));
    }

    let top_n = req
        .top_n
        .unwrap_or(defaults.top_n)
        .clamp(1, defaults.max_top_n.max(1));

    let request = CareRequest {
        origin: Origin::Point(origin),
        required_skills,
        preferred_gender,
        preferred_area,
        booking_window,
        top_n,
        require_candidates: false,
    };

    let echo = QueryEcho {
        senior_id: req.senior_id.clone(),
        senior_lat: origin.latitude,
        senior_lon: origin.longitude,
        required_skills: request.required_skills.iter().cloned().collect(),
        senior_gender: request.preferred_gender.map(|g| g.as_str().to_string()),
        senior_area: request.preferred_area.clone(),
        booking_date: booking_window.date.format("%Y-%m-%d").to_string(),
        start_time: booking_window.start_time.format("%H:%M:%S").to_string(),
        duration_hrs: booking_window.duration_hours,
        top_n,
    };

    Ok((request, echo))
}

/// Services needed for a senior's medical conditions, plus the baseline set
pub fn skills_for_conditions(conditions: &[String]) -> BTreeSet<String> {
    let mut skills: BTreeSet<String> = conditions
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|condition| {
            let lowered = condition.to_lowercase();
            CONDITION_SERVICES
                .iter()
                .find(|(names, _)| names.contains(&lowered.as_str()))
                .map(|(_, service)| *service)
                .unwrap_or(FALLBACK_SERVICE)
                .to_string()
        })
        .collect();

    skills.extend(BASELINE_SERVICES.iter().map(|s| s.to_string()));
    skills
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, MatchError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| MatchError::invalid(format!("booking_date '{}' is not YYYY-MM-DD: {}", value, e)))
}

fn parse_time(value: &str) -> Result<NaiveTime, MatchError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| MatchError::invalid(format!("start_time '{}' is not HH:MM:SS: {}", value, e)))
}
