use crate::error::ApiError;
use crate::models::{ErrorResponse, FindMatchesRequest, HealthResponse};
use crate::services::MatchingService;
use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matching: Arc<MatchingService>,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/find-matches", web::post().to(find_matches))
        .route("/matching/stats", web::get().to(stats));
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.http_status();
        let body = match self {
            ApiError::Repository(e) => {
                ErrorResponse::new(self.kind(), "Failed to load care data", code).with_details(e.to_string())
            }
            _ => ErrorResponse::new(self.kind(), self.to_string(), code),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!("Health check (source: {})", state.matching.repository_name());

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matching/find-matches
///
/// Request body:
/// ```json
/// {
///   "senior_id": "string",
///   "senior_lat": 23.76,
///   "senior_lon": 90.37,
///   "required_skills": ["Diabetes Care"],
///   "senior_gender": "female",
///   "senior_area": "Mirpur",
///   "booking_date": "2025-11-22",
///   "start_time": "14:00:00",
///   "duration_hrs": 4,
///   "top_n": 5
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(
        "Finding matches: senior_id={:?}, skills={}, date={:?}",
        req.senior_id,
        req.required_skills.len(),
        req.booking_date
    );

    let mut response = state.matching.find_matches(&req).await.map_err(|e| {
        match &e {
            ApiError::Repository(inner) => tracing::error!("Matching failed: {}", inner),
            other => tracing::info!("Rejected matching request: {}", other),
        }
        e
    })?;
    response.timestamp = Some(chrono::Utc::now());

    Ok(HttpResponse::Ok().json(response))
}

/// Pool statistics endpoint
///
/// GET /api/v1/matching/stats
async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut response = state.matching.stats().await.map_err(|e| {
        tracing::error!("Failed to compute stats: {}", e);
        e
    })?;
    response.timestamp = Some(chrono::Utc::now());

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::services::RepositoryError;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_error_status_mapping() {
        let err = ApiError::from(MatchError::invalid("missing origin"));
        assert_eq!(ResponseError::status_code(&err), StatusCode::BAD_REQUEST);

        let err = ApiError::from(RepositoryError::Api("timeout".to_string()));
        assert_eq!(ResponseError::status_code(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
