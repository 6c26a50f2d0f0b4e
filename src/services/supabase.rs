use crate::models::{BookingWindow, CaregiverRecord, Gender, SeniorRecord};
use crate::services::repository::{
    attach_commitments, commitment_dates, location_from_json, string_list_from_json, BookingRow,
    CareDataRepository, RepositoryError,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Booking states fetched for availability checks
const BLOCKING_STATUSES: &str = "(confirmed,in_progress,completed)";

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub caregivers: String,
    pub seniors: String,
    pub bookings: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            caregivers: "caregivers".to_string(),
            seniors: "seniors".to_string(),
            bookings: "bookings".to_string(),
        }
    }
}

/// Supabase REST (PostgREST) client
///
/// Reads caregivers, seniors and bookings. Never writes.
pub struct SupabaseRepository {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

/// Caregiver row. Column names follow the seeded schema; profile columns
/// that a deployment may not have are optional.
#[derive(Debug, Deserialize)]
struct CaregiverRow {
    id: String,
    #[serde(default, alias = "full_name")]
    name: Option<String>,
    #[serde(default)]
    name_bn: Option<String>,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    skills: Value,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default, alias = "total_reviews")]
    review_count: Option<u32>,
    #[serde(default)]
    experience_years: Option<u32>,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    hourly_rate: Option<f64>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<CaregiverRow> for CaregiverRecord {
    fn from(row: CaregiverRow) -> Self {
        CaregiverRecord {
            name: row.name.unwrap_or_else(|| row.id.clone()),
            id: row.id,
            name_bn: row.name_bn,
            location: location_from_json(&row.location),
            skills: string_list_from_json(&row.skills),
            rating: row.rating.unwrap_or_default(),
            review_count: row.review_count.unwrap_or_default(),
            experience_years: row.experience_years.unwrap_or_default(),
            gender: row.gender,
            hourly_rate: row.hourly_rate.unwrap_or_default(),
            area: row.area,
            district: row.district,
            phone: row.phone,
            email: row.email,
            commitments: vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeniorRow {
    id: String,
    #[serde(default)]
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

impl From<SeniorRow> for SeniorRecord {
    fn from(row: SeniorRow) -> Self {
        SeniorRecord {
            id: row.id,
            name: row.name,
            gender: row.gender,
            area: row.area,
            location: location_from_json(&row.location),
            medical_conditions: string_list_from_json(&row.medical_conditions),
        }
    }
}

impl SupabaseRepository {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    /// Exact row count of a table, read from the `Content-Range` header
    async fn count_rows(&self, table: &str) -> Result<usize, RepositoryError> {
        let url = format!("{}?select=id&limit=1", self.table_url(table));
        tracing::debug!("Counting rows in: {}", table);

        let response = self.get(&url).header("Prefer", "count=exact").send().await?;
        let response = check_status(table, response).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total)
            .ok_or_else(|| RepositoryError::Parse(format!("No row count returned for {}", table)))
    }

    /// GET a table with PostgREST filters and return the raw rows
    async fn fetch_rows(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<Value>, RepositoryError> {
        let query = filters
            .iter()
            .map(|(column, filter)| format!("{}={}", column, urlencoding::encode(filter)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.table_url(table), query);

        tracing::debug!("Fetching rows from: {}", url);

        let response = self.get(&url).send().await?;
        let response = check_status(table, response).await?;

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            other => Err(RepositoryError::Parse(format!(
                "Expected an array of rows from {}, got {}",
                table, other
            ))),
        }
    }

    async fn fetch_bookings(&self, window: &BookingWindow) -> Result<Vec<BookingRow>, RepositoryError> {
        let (first, last) = commitment_dates(window);
        let rows = self
            .fetch_rows(
                &self.tables.bookings,
                &[
                    ("select", "caregiver_id,booking_date,start_time,duration_hrs,status".to_string()),
                    ("booking_date", format!("gte.{}", first.format("%Y-%m-%d"))),
                    ("and", format!("(booking_date.lte.{})", last.format("%Y-%m-%d"))),
                    ("status", format!("in.{}", BLOCKING_STATUSES)),
                ],
            )
            .await?;

        Ok(decode_rows(&self.tables.bookings, rows))
    }
}

async fn check_status(table: &str, response: Response) -> Result<Response, RepositoryError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Failed to query {}: {} - {}", table, status, body);
    Err(RepositoryError::Api(format!("Failed to query {}: {}", table, status)))
}

/// Total from a PostgREST range such as `0-0/57` or `*/0`
fn content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// Decode rows one by one, skipping the ones that do not fit
fn decode_rows<T: serde::de::DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Skipping malformed row in {}: {}", table, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl CareDataRepository for SupabaseRepository {
    async fn load_caregivers(
        &self,
        window: Option<&BookingWindow>,
    ) -> Result<Vec<CaregiverRecord>, RepositoryError> {
        let rows = self
            .fetch_rows(&self.tables.caregivers, &[("select", "*".to_string())])
            .await?;

        let mut caregivers: Vec<CaregiverRecord> = decode_rows::<CaregiverRow>(&self.tables.caregivers, rows)
            .into_iter()
            .map(CaregiverRecord::from)
            .collect();

        if let Some(window) = window {
            let bookings = self.fetch_bookings(window).await?;
            tracing::debug!("Attaching {} bookings", bookings.len());
            attach_commitments(&mut caregivers, bookings);
        }

        tracing::debug!("Loaded {} caregivers from Supabase", caregivers.len());
        Ok(caregivers)
    }

    async fn find_senior(&self, senior_id: &str) -> Result<Option<SeniorRecord>, RepositoryError> {
        let rows = self
            .fetch_rows(
                &self.tables.seniors,
                &[("select", "*".to_string()), ("id", format!("eq.{}", senior_id))],
            )
            .await?;

        match rows.into_iter().next() {
            Some(row) => {
                let senior: SeniorRow = serde_json::from_value(row)
                    .map_err(|e| RepositoryError::Parse(format!("Failed to parse senior {}: {}", senior_id, e)))?;
                Ok(Some(senior.into()))
            }
            None => Ok(None),
        }
    }

    async fn count_seniors(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.count_rows(&self.tables.seniors).await?))
    }

    async fn count_bookings(&self) -> Result<Option<usize>, RepositoryError> {
        Ok(Some(self.count_rows(&self.tables.bookings).await?))
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
