use crate::config::Settings;
use crate::core::Matcher;
use crate::error::AppError;
use crate::routes::{self, AppState};
use crate::services::{build_repository, MatchingService};
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

/// Build the engine and the shared service from settings
pub fn build_service(
    settings: &Settings,
    data_dir: Option<std::path::PathBuf>,
) -> Result<MatchingService, AppError> {
    let repository = build_repository(settings, data_dir)?;

    let config = settings.scoring.scoring_config();
    let matcher = Matcher::new(config).with_reason_threshold(settings.scoring.reason_threshold);

    info!("Matcher initialized with weights: {:?}", config.weights);

    Ok(MatchingService::new(
        repository,
        matcher,
        settings.matching.request_defaults(),
    ))
}

/// Run the HTTP server until shutdown
pub async fn run(settings: Settings, host: Option<String>, port: Option<u16>) -> Result<(), AppError> {
    info!("Starting Seba matching service...");

    let service = build_service(&settings, None)?;
    let app_state = AppState {
        matching: Arc::new(service),
    };

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
