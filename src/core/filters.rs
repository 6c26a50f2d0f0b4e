use crate::error::MatchError;
use crate::models::{CareRequest, CaregiverRecord, GeoPoint, Origin, MAX_BOOKING_HOURS};

/// Validate a request before any candidate is scored
///
/// Returns the origin coordinates. A senior reference is an error here:
/// resolving it is the caller's job.
pub fn validate_request(request: &CareRequest) -> Result<GeoPoint, MatchError> {
    let origin = match &request.origin {
        Origin::Point(point) => *point,
        Origin::Senior(senior_id) => {
            return Err(MatchError::invalid(format!(
                "senior {} has not been resolved to coordinates",
                senior_id
            )));
        }
    };

    if !origin.is_valid() {
        return Err(MatchError::invalid(format!(
            "origin ({}, {}) is not a valid coordinate",
            origin.latitude, origin.longitude
        )));
    }

    let duration = request.booking_window.duration_hours;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(MatchError::invalid("booking duration must be positive"));
    }
    if duration > MAX_BOOKING_HOURS || request.booking_window.end().is_none() {
        return Err(MatchError::invalid(format!(
            "booking duration must be at most {} hours",
            MAX_BOOKING_HOURS
        )));
    }

    Ok(origin)
}

/// Check that a caregiver record can take part in distance-dependent ranking
///
/// Records without usable coordinates are reported as a computation error so
/// the caller can skip them and keep going.
#[inline]
pub fn candidate_location(caregiver: &CaregiverRecord) -> Result<GeoPoint, MatchError> {
    match caregiver.location {
        Some(point) if point.is_valid() => Ok(point),
        Some(point) => Err(MatchError::Computation {
            caregiver_id: caregiver.id.clone(),
            reason: format!("invalid coordinates ({}, {})", point.latitude, point.longitude),
        }),
        None => Err(MatchError::Computation {
            caregiver_id: caregiver.id.clone(),
            reason: "missing location".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingWindow, Gender};
    use chrono::{NaiveDate, NaiveTime};

    fn create_test_request(origin: Origin) -> CareRequest {
        CareRequest {
            origin,
            required_skills: Default::default(),
            preferred_gender: None,
            preferred_area: None,
            booking_window: BookingWindow {
                date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                duration_hours: 4.0,
            },
            top_n: 5,
            require_candidates: false,
        }
    }

    fn create_test_caregiver(location: Option<GeoPoint>) -> CaregiverRecord {
        CaregiverRecord {
            id: "cg-7".to_string(),
            name: "Test".to_string(),
            name_bn: None,
            location,
            skills: vec![],
            rating: 4.0,
            review_count: 3,
            experience_years: 2,
            gender: Gender::Male,
            hourly_rate: 180.0,
            area: None,
            district: None,
            phone: None,
            email: None,
            commitments: vec![],
        }
    }

    #[test]
    fn test_valid_point_origin() {
        let request = create_test_request(Origin::Point(GeoPoint::new(23.76, 90.37)));
        assert_eq!(validate_request(&request).unwrap(), GeoPoint::new(23.76, 90.37));
    }

    #[test]
    fn test_unresolved_senior_is_invalid() {
        let request = create_test_request(Origin::Senior("senior-1".to_string()));
        assert!(matches!(validate_request(&request), Err(MatchError::InvalidRequest(_))));
    }

    #[test]
    fn test_out_of_range_origin_is_invalid() {
        let request = create_test_request(Origin::Point(GeoPoint::new(123.0, 90.0)));
        assert!(matches!(validate_request(&request), Err(MatchError::InvalidRequest(_))));
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let mut request = create_test_request(Origin::Point(GeoPoint::new(23.76, 90.37)));
        request.booking_window.duration_hours = 0.0;
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_duration_above_one_day_is_invalid() {
        let mut request = create_test_request(Origin::Point(GeoPoint::new(23.76, 90.37)));

        request.booking_window.duration_hours = MAX_BOOKING_HOURS;
        assert!(validate_request(&request).is_ok());

        for duration in [24.5, 1e13, 1e300, f64::INFINITY] {
            request.booking_window.duration_hours = duration;
            assert!(matches!(validate_request(&request), Err(MatchError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_missing_location_is_computation_error() {
        let err = candidate_location(&create_test_caregiver(None)).unwrap_err();
        assert_eq!(
            err,
            MatchError::Computation {
                caregiver_id: "cg-7".to_string(),
                reason: "missing location".to_string(),
            }
        );

        let bad = create_test_caregiver(Some(GeoPoint::new(f64::NAN, 90.0)));
        assert!(candidate_location(&bad).is_err());

        let good = create_test_caregiver(Some(GeoPoint::new(23.8, 90.4)));
        assert!(candidate_location(&good).is_ok());
    }
}
