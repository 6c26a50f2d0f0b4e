// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BookingStatus, BookingWindow, BoundingBox, CareRequest, CaregiverRecord, Commitment, Gender,
    GenderPreference, GeoPoint, MatchDetails, MatchResult, Origin, ScoreBreakdown, ScoringWeights,
    SeniorRecord, MAX_BOOKING_HOURS, MAX_TOTAL_SCORE,
};
pub use requests::{split_skill_list, FindMatchesRequest};
pub use responses::{
    ErrorResponse, FindMatchesResponse, HealthResponse, QueryEcho, StatsBody, StatsResponse,
};
