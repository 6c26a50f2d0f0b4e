use crate::core::{Matcher, ALGORITHM_VERSION};
use crate::error::ApiError;
use crate::models::{FindMatchesRequest, FindMatchesResponse, StatsBody, StatsResponse};
use crate::resolve::{check_origin_fields, resolve_request, RequestDefaults};
use crate::services::repository::CareDataRepository;
use std::sync::Arc;
use validator::Validate;

/// Request handling shared by the HTTP routes and the CLI
///
/// Looks up the senior, resolves the request, loads the pool and runs the
/// engine. Responses carry no timestamp; callers stamp them if they want one.
#[derive(Clone)]
pub struct MatchingService {
    repository: Arc<dyn CareDataRepository>,
    matcher: Matcher,
    defaults: RequestDefaults,
}

impl MatchingService {
    pub fn new(repository: Arc<dyn CareDataRepository>, matcher: Matcher, defaults: RequestDefaults) -> Self {
        Self {
            repository,
            matcher,
            defaults,
        }
    }

    pub fn repository_name(&self) -> &'static str {
        self.repository.name()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Rank caregivers for a wire-level request
    pub async fn find_matches(&self, req: &FindMatchesRequest) -> Result<FindMatchesResponse, ApiError> {
        req.validate()
            .map_err(|errors| ApiError::Validation(errors.to_string()))?;
        check_origin_fields(req)?;

        let senior = match req.senior_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(senior_id) => {
                let senior = self
                    .repository
                    .find_senior(senior_id)
                    .await?
                    .ok_or_else(|| ApiError::SeniorNotFound(senior_id.to_string()))?;
                tracing::debug!("Resolved senior {} ({} conditions)", senior.id, senior.medical_conditions.len());
                Some(senior)
            }
            None => None,
        };

        let (request, query) = resolve_request(req, senior.as_ref(), &self.defaults)?;

        let pool = self
            .repository
            .load_caregivers(Some(&request.booking_window))
            .await?;

        let outcome = self.matcher.find_matches(&request, &pool)?;

        tracing::info!(
            "Returning {} matches (from {} caregivers, {} skipped, source: {})",
            outcome.matches.len(),
            outcome.total_caregivers,
            outcome.skipped_records,
            self.repository.name()
        );

        Ok(FindMatchesResponse {
            success: true,
            matches: outcome.matches,
            total_caregivers: outcome.total_caregivers,
            skipped_records: outcome.skipped_records,
            query,
            timestamp: None,
        })
    }

    /// Statistics over the whole caregiver pool
    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        let pool = self.repository.load_caregivers(None).await?;
        let stats = self.matcher.compute_stats(&pool);
        let total_seniors = self.repository.count_seniors().await?;
        let total_bookings = self.repository.count_bookings().await?;

        tracing::info!("Computed stats over {} caregivers", stats.total_caregivers);

        Ok(StatsResponse {
            success: true,
            stats: StatsBody {
                pool: stats,
                total_seniors,
                total_bookings,
                algorithm_version: ALGORITHM_VERSION.to_string(),
                scoring_weights: self.matcher.config().weights,
            },
            timestamp: None,
        })
    }
}
