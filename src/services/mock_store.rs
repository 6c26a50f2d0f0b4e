use crate::models::{BookingWindow, CaregiverRecord, Gender, GeoPoint, SeniorRecord};
use crate::services::repository::{
    attach_commitments, commitment_dates, location_from_json, string_list_from_json, BookingRow,
    CareDataRepository, RepositoryError,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const CAREGIVERS_FILE: &str = "caregivers.json";
pub const SENIORS_FILE: &str = "seniors.json";
pub const BOOKINGS_FILE: &str = "bookings.json";

/// Caregiver as written by the mock data generator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockCaregiver {
    id: String,
    full_name: String,
    #[serde(default)]
    name_bn: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    experience_years: u32,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    location: Option<MockLocation>,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    ratings: MockRatings,
    #[serde(default)]
    hourly_rate: f64,
}

#[derive(Debug, Deserialize)]
struct MockLocation {
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    area: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockRatings {
    #[serde(default)]
    average_rating: f64,
    #[serde(default)]
    total_reviews: u32,
}

impl From<MockCaregiver> for CaregiverRecord {
    fn from(mock: MockCaregiver) -> Self {
        let (point, area, district) = match mock.location {
            Some(loc) => {
                let point = match (loc.latitude, loc.longitude) {
                    (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                    _ => None,
                };
                (point, loc.area, loc.district)
            }
            None => (None, None, None),
        };

        CaregiverRecord {
            id: mock.id,
            name: mock.full_name,
            name_bn: mock.name_bn,
            location: point,
            skills: mock.services,
            rating: mock.ratings.average_rating,
            review_count: mock.ratings.total_reviews,
            experience_years: mock.experience_years,
            gender: mock.gender,
            hourly_rate: mock.hourly_rate,
            area,
            district,
            phone: mock.phone,
            email: mock.email,
            commitments: vec![],
        }
    }
}

/// Senior as written by the mock data generator
#[derive(Debug, Deserialize)]
struct MockSenior {
    id: String,
    name: String,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    medical_conditions: Value,
}

impl From<MockSenior> for SeniorRecord {
    fn from(mock: MockSenior) -> Self {
        SeniorRecord {
            id: mock.id,
            name: mock.name,
            gender: mock.gender,
            area: mock.area,
            location: location_from_json(&mock.location),
            medical_conditions: string_list_from_json(&mock.medical_conditions),
        }
    }
}

/// Repository backed by the mock JSON data set
///
/// Files are re-read on every call; put a `CachedRepository` in front of it
/// to avoid repeated disk reads.
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_records<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, RepositoryError> {
        let path = self.dir.join(file);
        tracing::debug!("Reading {}", path.display());

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RepositoryError::Io {
                path: path.display().to_string(),
                source,
            })?;

        parse_records(file, &raw)
    }

    /// All bookings; a missing bookings file means nobody is booked
    async fn read_bookings(&self) -> Result<Vec<BookingRow>, RepositoryError> {
        match self.read_records::<BookingRow>(BOOKINGS_FILE).await {
            Ok(bookings) => Ok(bookings),
            Err(RepositoryError::Io { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("No bookings file at {}, treating everyone as available", path);
                Ok(vec![])
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse a JSON array one element at a time, skipping malformed entries
pub(crate) fn parse_records<T: DeserializeOwned>(label: &str, raw: &str) -> Result<Vec<T>, RepositoryError> {
    let values: Vec<Value> = serde_json::from_str(raw)
        .map_err(|e| RepositoryError::Parse(format!("{} is not a JSON array: {}", label, e)))?;

    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record {} in {}: {}", i, label, e);
                None
            }
        })
        .collect();

    tracing::debug!("Parsed {} of {} records from {}", records.len(), total, label);
    Ok(records)
}

#[async_trait]
impl CareDataRepository for JsonFileRepository {
    async fn load_caregivers(
        &self,
        window: Option<&BookingWindow>,
    ) -> Result<Vec<CaregiverRecord>, RepositoryError> {
        let mut caregivers: Vec<CaregiverRecord> = self
            .read_records::<MockCaregiver>(CAREGIVERS_FILE)
            .await?
            .into_iter()
            .map(CaregiverRecord::from)
            .collect();

        if let Some(window) = window {
            let bookings = self.read_bookings().await?;
            attach_commitments(&mut caregivers, bookings_in_range(bookings, window));
        }

        Ok(caregivers)
    }

    async fn find_senior(&self, senior_id: &str) -> Result<Option<SeniorRecord>, RepositoryError> {
        let seniors = self.read_records::<MockSenior>(SENIORS_FILE).await?;
        Ok(seniors
            .into_iter()
            .find(|s| s.id == senior_id)
            .map(SeniorRecord::from))
    }

    async fn count_seniors(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.read_records::<MockSenior>(SENIORS_FILE).await?.len()))
    }

    async fn count_bookings(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.read_bookings().await?.len()))
    }

    fn name(&self) -> &'static str {
        "files"
    }
}

fn bookings_in_range(bookings: Vec<BookingRow>, window: &BookingWindow) -> Vec<BookingRow> {
    let (first, last) = commitment_dates(window);
    bookings
        .into_iter()
        .filter(|b| (first..=last).contains(&b.commitment.booking_date))
        .collect()
}

/// Repository over records already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    caregivers: Vec<CaregiverRecord>,
    seniors: Vec<SeniorRecord>,
    bookings: Vec<BookingRow>,
}

impl InMemoryRepository {
    pub fn new(caregivers: Vec<CaregiverRecord>) -> Self {
        Self {
            caregivers,
            ..Default::default()
        }
    }

    pub fn with_seniors(mut self, seniors: Vec<SeniorRecord>) -> Self {
        self.seniors = seniors;
        self
    }

    pub fn with_bookings(mut self, bookings: Vec<BookingRow>) -> Self {
        self.bookings = bookings;
        self
    }
}

#[async_trait]
impl CareDataRepository for InMemoryRepository {
    async fn load_caregivers(
        &self,
        window: Option<&BookingWindow>,
    ) -> Result<Vec<CaregiverRecord>, RepositoryError> {
        let mut caregivers = self.caregivers.clone();
        if let Some(window) = window {
            attach_commitments(&mut caregivers, bookings_in_range(self.bookings.clone(), window));
        }
        Ok(caregivers)
    }

    async fn find_senior(&self, senior_id: &str) -> Result<Option<SeniorRecord>, RepositoryError> {
        Ok(self.seniors.iter().find(|s| s.id == senior_id).cloned())
    }

    async fn count_seniors(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.seniors.len()))
    }

    async fn count_bookings(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.bookings.len()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, Commitment};
    use chrono::{NaiveDate, NaiveTime};

    const CAREGIVERS: &str = r#"[
        {
            "id": "cg-1",
            "fullName": "রহিমা বেগম",
            "experienceYears": 6,
            "services": ["Diabetes Care", "Companionship"],
            "location": {"district": "Dhaka", "area": "Mirpur", "latitude": 23.8223, "longitude": 90.3654},
            "gender": "মহিলা",
            "ratings": {"averageRating": 4.7, "totalReviews": 52},
            "hourlyRate": 300
        },
        {"id": "cg-2"},
        {"id": "cg-3", "fullName": "Karim", "gender": "পুরুষ"}
    ]"#;

    fn window() -> BookingWindow {
        BookingWindow {
            date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_hours: 4.0,
        }
    }

    fn booking(caregiver_id: &str, date: NaiveDate) -> BookingRow {
        BookingRow {
            caregiver_id: caregiver_id.to_string(),
            commitment: Commitment {
                booking_date: date,
                start_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                duration_hours: 2.0,
                status: BookingStatus::Confirmed,
            },
        }
    }

    #[test]
    fn test_parse_mock_caregivers_skips_malformed() {
        let records: Vec<MockCaregiver> = parse_records(CAREGIVERS_FILE, CAREGIVERS).unwrap();
        assert_eq!(records.len(), 2);

        let caregivers: Vec<CaregiverRecord> = records.into_iter().map(CaregiverRecord::from).collect();
        assert_eq!(caregivers[0].gender, Gender::Female);
        assert_eq!(caregivers[0].location, Some(GeoPoint::new(23.8223, 90.3654)));
        assert_eq!(caregivers[0].review_count, 52);
        assert_eq!(caregivers[0].area.as_deref(), Some("Mirpur"));
        assert!(caregivers[1].location.is_none());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let result: Result<Vec<MockCaregiver>, _> = parse_records(CAREGIVERS_FILE, "{}");
        assert!(matches!(result, Err(RepositoryError::Parse(_))));
    }

    #[test]
    fn test_mock_senior_conversion() {
        let senior: MockSenior = serde_json::from_str(
            r#"{"id": "s-1", "name": "আমেনা খাতুন", "gender": "মহিলা", "area": "Dhanmondi",
                "location": "SRID=4326;POINT(90.3742 23.7461)",
                "medical_conditions": ["ডায়াবেটিস"]}"#,
        )
        .unwrap();
        let senior = SeniorRecord::from(senior);

        assert_eq!(senior.location, Some(GeoPoint::new(23.7461, 90.3742)));
        assert_eq!(senior.medical_conditions, vec!["ডায়াবেটিস"]);
    }

    #[tokio::test]
    async fn test_in_memory_attaches_nearby_bookings_only() {
        let caregivers: Vec<CaregiverRecord> = parse_records::<MockCaregiver>(CAREGIVERS_FILE, CAREGIVERS)
            .unwrap()
            .into_iter()
            .map(CaregiverRecord::from)
            .collect();

        let repo = InMemoryRepository::new(caregivers).with_bookings(vec![
            booking("cg-1", NaiveDate::from_ymd_opt(2025, 11, 22).unwrap()),
            booking("cg-1", NaiveDate::from_ymd_opt(2025, 12, 30).unwrap()),
        ]);

        let loaded = repo.load_caregivers(Some(&window())).await.unwrap();
        assert_eq!(loaded[0].commitments.len(), 1);

        let without_window = repo.load_caregivers(None).await.unwrap();
        assert!(without_window[0].commitments.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let repo = JsonFileRepository::new("/nonexistent/seba-match");
        let result = repo.load_caregivers(None).await;
        assert!(matches!(result, Err(RepositoryError::Io { .. })));
    }

    #[tokio::test]
    async fn test_bundled_mock_data_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/mock");
        let repo = JsonFileRepository::new(dir);

        let caregivers = repo.load_caregivers(Some(&window())).await.unwrap();
        assert!(!caregivers.is_empty());

        let senior = repo.find_senior("senior-001").await.unwrap();
        assert!(senior.is_some());
        assert!(repo.find_senior("missing").await.unwrap().is_none());

        assert_eq!(repo.count_seniors().await.unwrap(), Some(3));
        assert_eq!(repo.count_bookings().await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_missing_bookings_file_counts_zero() {
        let dir = std::env::temp_dir().join(format!("seba-match-nobookings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CAREGIVERS_FILE), CAREGIVERS).unwrap();

        let repo = JsonFileRepository::new(&dir);
        let bookings = repo.count_bookings().await;
        let caregivers = repo.load_caregivers(Some(&window())).await;
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(bookings.unwrap(), Some(0));
        assert!(caregivers.unwrap().iter().all(|c| c.commitments.is_empty()));
    }
}
