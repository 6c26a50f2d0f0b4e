// Service exports
pub mod cache;
pub mod matching;
pub mod mock_store;
pub mod repository;
pub mod supabase;

pub use cache::{CacheKey, CacheStats, CachedRepository};
pub use matching::MatchingService;
pub use mock_store::{InMemoryRepository, JsonFileRepository};
pub use repository::{BookingRow, CareDataRepository, RepositoryError};
pub use supabase::{SupabaseRepository, SupabaseTables};

use crate::config::{DataSource, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured repository, wrapped in the TTL cache when enabled
///
/// `data_dir` overrides `data.mock_dir` and forces the file source.
pub fn build_repository(
    settings: &Settings,
    data_dir: Option<PathBuf>,
) -> Result<Arc<dyn CareDataRepository>, RepositoryError> {
    let source = if data_dir.is_some() {
        DataSource::Files
    } else {
        settings.data.source
    };

    let repository: Arc<dyn CareDataRepository> = match source {
        DataSource::Files => {
            let dir = data_dir.unwrap_or_else(|| PathBuf::from(&settings.data.mock_dir));
            tracing::info!("Using mock data from {}", dir.display());
            Arc::new(JsonFileRepository::new(dir))
        }
        DataSource::Supabase => {
            let tables = SupabaseTables {
                caregivers: settings.supabase.caregivers_table.clone(),
                seniors: settings.supabase.seniors_table.clone(),
                bookings: settings.supabase.bookings_table.clone(),
            };
            tracing::info!("Using Supabase at {}", settings.supabase.url);
            Arc::new(SupabaseRepository::new(
                settings.supabase.url.clone(),
                settings.supabase.api_key.clone(),
                tables,
                Duration::from_secs(settings.supabase.timeout_secs),
            )?)
        }
    };

    if !settings.cache.enabled {
        return Ok(repository);
    }

    tracing::info!(
        "Repository cache enabled ({} entries, TTL: {}s)",
        settings.cache.max_entries,
        settings.cache.ttl_secs
    );
    Ok(Arc::new(CachedRepository::new(
        repository,
        settings.cache.max_entries,
        settings.cache.ttl_secs,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_forces_files() {
        let mut settings = Settings::default();
        settings.data.source = DataSource::Supabase;

        let repository = build_repository(&settings, Some(PathBuf::from("data/mock"))).unwrap();
        assert_eq!(repository.name(), "files");
    }

    #[test]
    fn test_supabase_source() {
        let mut settings = Settings::default();
        settings.data.source = DataSource::Supabase;
        settings.supabase.url = "https://project.supabase.co".to_string();
        settings.supabase.api_key = "key".to_string();
        settings.cache.enabled = false;

        let repository = build_repository(&settings, None).unwrap();
        assert_eq!(repository.name(), "supabase");
    }
}
