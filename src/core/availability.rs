use crate::error::MatchError;
use crate::models::{BookingWindow, CaregiverRecord, Commitment};

/// Check whether a caregiver is free for the whole booking window
///
/// Only commitments that occupy the schedule (confirmed, in progress,
/// completed) count. Two slots overlap when each starts before the other
/// ends, so back-to-back bookings do not conflict. A blocking commitment
/// whose duration cannot be placed on the calendar makes the record
/// unscorable.
pub fn is_available(caregiver: &CaregiverRecord, window: &BookingWindow) -> Result<bool, MatchError> {
    for commitment in &caregiver.commitments {
        match conflicts_with(commitment, window) {
            Some(true) => return Ok(false),
            Some(false) => {}
            None => {
                return Err(MatchError::Computation {
                    caregiver_id: caregiver.id.clone(),
                    reason: format!(
                        "booking on {} has unusable duration {}",
                        commitment.booking_date, commitment.duration_hours
                    ),
                })
            }
        }
    }
    Ok(true)
}

/// Whether a single commitment blocks the requested window
///
/// `None` when a blocking commitment or the window has no computable end.
#[inline]
pub fn conflicts_with(commitment: &Commitment, window: &BookingWindow) -> Option<bool> {
    if !commitment.status.blocks_schedule() {
        return Some(false);
    }

    Some(window.start() < commitment.end()? && window.end()? > commitment.start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, Gender};
    use chrono::{NaiveDate, NaiveTime};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn commitment(day: u32, hour: u32, duration: f64, status: BookingStatus) -> Commitment {
        Commitment {
            booking_date: date(day),
            start_time: time(hour),
            duration_hours: duration,
            status,
        }
    }

    fn caregiver_with(commitments: Vec<Commitment>) -> CaregiverRecord {
        CaregiverRecord {
            id: "cg-1".to_string(),
            name: "Test".to_string(),
            name_bn: None,
            location: None,
            skills: vec![],
            rating: 0.0,
            review_count: 0,
            experience_years: 0,
            gender: Gender::Female,
            hourly_rate: 200.0,
            area: None,
            district: None,
            phone: None,
            email: None,
            commitments,
        }
    }

    fn window(day: u32, hour: u32, duration: f64) -> BookingWindow {
        BookingWindow {
            date: date(day),
            start_time: time(hour),
            duration_hours: duration,
        }
    }

    fn available(caregiver: &CaregiverRecord, window: &BookingWindow) -> bool {
        is_available(caregiver, window).unwrap()
    }

    #[test]
    fn test_free_without_commitments() {
        assert!(available(&caregiver_with(vec![]), &window(20, 10, 4.0)));
    }

    #[test]
    fn test_overlapping_confirmed_booking_blocks() {
        let caregiver = caregiver_with(vec![commitment(20, 12, 3.0, BookingStatus::Confirmed)]);
        assert!(!available(&caregiver, &window(20, 10, 4.0)));
    }

    #[test]
    fn test_back_to_back_is_free() {
        let caregiver = caregiver_with(vec![commitment(20, 6, 4.0, BookingStatus::InProgress)]);
        assert!(available(&caregiver, &window(20, 10, 4.0)));
    }

    #[test]
    fn test_pending_and_cancelled_do_not_block() {
        let caregiver = caregiver_with(vec![
            commitment(20, 10, 4.0, BookingStatus::Pending),
            commitment(20, 11, 2.0, BookingStatus::Cancelled),
        ]);
        assert!(available(&caregiver, &window(20, 10, 4.0)));
    }

    #[test]
    fn test_overnight_booking_blocks_next_morning() {
        let caregiver = caregiver_with(vec![commitment(19, 22, 12.0, BookingStatus::Confirmed)]);
        assert!(!available(&caregiver, &window(20, 8, 2.0)));
        assert!(available(&caregiver, &window(20, 10, 2.0)));
    }

    #[test]
    fn test_unusable_commitment_duration_is_computation_error() {
        let caregiver = caregiver_with(vec![commitment(20, 9, 1e13, BookingStatus::Confirmed)]);
        let err = is_available(&caregiver, &window(20, 10, 4.0)).unwrap_err();
        assert!(matches!(err, MatchError::Computation { ref caregiver_id, .. } if caregiver_id == "cg-1"));

        let caregiver = caregiver_with(vec![commitment(20, 9, f64::NAN, BookingStatus::InProgress)]);
        assert!(is_available(&caregiver, &window(20, 10, 4.0)).is_err());
    }

    #[test]
    fn test_unusable_duration_ignored_when_not_blocking() {
        let caregiver = caregiver_with(vec![commitment(20, 9, 1e13, BookingStatus::Cancelled)]);
        assert!(available(&caregiver, &window(20, 10, 4.0)));
    }
}
