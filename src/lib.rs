//! Seba Match - caregiver matching service for the Seba eldercare platform
//!
//! Ranks caregivers for a senior's care request with a six-factor,
//! explainable score (distance, skills, rating, experience, gender and
//! locality) and reports statistics over the caregiver pool.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod resolve;
pub mod routes;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compute_stats, haversine_distance, MatchOutcome, Matcher, PoolStats, ScoringConfig};
pub use error::{ApiError, AppError, MatchError};
pub use models::{
    CareRequest, CaregiverRecord, FindMatchesRequest, FindMatchesResponse, MatchResult, ScoreBreakdown,
    ScoringWeights,
};
