use crate::core::{
    availability::is_available,
    distance::distance_km,
    explain::{build_reason, REASON_THRESHOLD},
    filters::{candidate_location, validate_request},
    scoring::{score_candidate, skill_set, ScoringConfig},
    stats::{compute_stats, PoolStats},
};
use crate::error::MatchError;
use crate::models::{CareRequest, CaregiverRecord, MatchDetails, MatchResult, MAX_TOTAL_SCORE};
use std::cmp::Ordering;

/// Version of the scoring model reported alongside statistics
pub const ALGORITHM_VERSION: &str = "1.0.0";

/// Result of the matching process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    /// Size of the pool as supplied
    pub total_caregivers: usize,
    /// Records left out of ranking because they could not be scored
    pub skipped_records: usize,
}

/// Caregiver matching engine
///
/// # Pipeline Stages
/// 1. Request validation (origin, booking window)
/// 2. Per-record validation, skipping records without a usable location
///    or with a booking that cannot be placed on the calendar
/// 3. Six-factor scoring and availability check
/// 4. Ranking, truncation and explanation
///
/// Holds configuration only; every call is a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: ScoringConfig,
    reason_threshold: f64,
}

impl Matcher {
    /// Build a matcher; weights summing past 100 are scaled down to fit
    pub fn new(mut config: ScoringConfig) -> Self {
        let weights = config.weights.capped();
        if weights != config.weights {
            tracing::warn!(
                "Scoring weights adjusted to stay within {} (configured sum {})",
                MAX_TOTAL_SCORE,
                config.weights.sum()
            );
            config.weights = weights;
        }

        Self {
            config,
            reason_threshold: REASON_THRESHOLD,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// Override the minimum factor strength a reason will mention
    pub fn with_reason_threshold(mut self, threshold: f64) -> Self {
        self.reason_threshold = threshold;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank caregivers in the pool against a care request
    ///
    /// # Arguments
    /// * `request` - Resolved care request; the origin must be coordinates
    /// * `pool` - Candidate caregivers, read only
    ///
    /// # Returns
    /// Up to `request.top_n` matches, best first. Unavailable caregivers are
    /// kept and flagged. An empty pool yields an empty list unless the
    /// request sets `require_candidates`.
    pub fn find_matches(
        &self,
        request: &CareRequest,
        pool: &[CaregiverRecord],
    ) -> Result<MatchOutcome, MatchError> {
        let origin = validate_request(request)?;
        let required_skills = skill_set(&request.required_skills);
        let top_n = request.top_n.max(1);

        let mut skipped_records = 0;
        let mut matches: Vec<MatchResult> = Vec::with_capacity(pool.len());

        for caregiver in pool {
            let checked = candidate_location(caregiver).and_then(|location| {
                is_available(caregiver, &request.booking_window).map(|available| (location, available))
            });
            let (location, available) = match checked {
                Ok(checked) => checked,
                Err(e) => {
                    tracing::warn!("Skipping caregiver record: {}", e);
                    skipped_records += 1;
                    continue;
                }
            };

            let distance = distance_km(&origin, &location);
            let breakdown = score_candidate(caregiver, request, &required_skills, distance, &self.config);
            let reason = build_reason(
                caregiver,
                &breakdown,
                &self.config.weights,
                distance,
                available,
                self.reason_threshold,
            );

            matches.push(MatchResult {
                caregiver_id: caregiver.id.clone(),
                name: caregiver.name.clone(),
                name_bn: caregiver.name_bn.clone(),
                total_score: breakdown.sum(),
                breakdown,
                distance_km: distance,
                available,
                details: MatchDetails {
                    phone: caregiver.phone.clone(),
                    email: caregiver.email.clone(),
                    experience_years: caregiver.experience_years,
                    average_rating: caregiver.rating,
                    total_reviews: caregiver.review_count,
                    hourly_rate: caregiver.hourly_rate,
                    services: caregiver.skills.clone(),
                    area: caregiver.area.clone(),
                },
                reason,
            });
        }

        if matches.is_empty() && request.require_candidates {
            return Err(MatchError::EmptyPool);
        }

        matches.sort_by(rank_order);
        matches.truncate(top_n);

        tracing::debug!(
            "Ranked {} of {} caregivers ({} skipped)",
            matches.len(),
            pool.len(),
            skipped_records
        );

        Ok(MatchOutcome {
            matches,
            total_caregivers: pool.len(),
            skipped_records,
        })
    }

    /// Aggregate statistics over the pool
    pub fn compute_stats(&self, pool: &[CaregiverRecord]) -> PoolStats {
        compute_stats(pool)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Score descending, then distance ascending, then rating descending.
/// Caregiver id settles anything left so the order never depends on input order.
fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        .then_with(|| b.details.average_rating.total_cmp(&a.details.average_rating))
        .then_with(|| a.caregiver_id.cmp(&b.caregiver_id))
}
