use crate::core::stats::PoolStats;
use crate::models::domain::{MatchResult, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Echo of the resolved matching query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEcho {
    pub senior_id: Option<String>,
    pub senior_lat: f64,
    pub senior_lon: f64,
    pub required_skills: Vec<String>,
    pub senior_gender: Option<String>,
    pub senior_area: Option<String>,
    pub booking_date: String,
    pub start_time: String,
    pub duration_hrs: f64,
    pub top_n: usize,
}

/// Response for the find matches endpoint and the `match` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
    pub total_caregivers: usize,
    pub skipped_records: usize,
    pub query: QueryEcho,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Pool statistics plus the scoring setup that produced rankings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsBody {
    pub pool: PoolStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seniors: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bookings: Option<usize>,
    pub algorithm_version: String,
    pub scoring_weights: ScoringWeights,
}

/// Response for the stats endpoint and the `stats` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            status_code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
