use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside the WGS84 coordinate ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Caregiver gender as stored by the data layer.
///
/// Parsing accepts English labels and the Bengali labels used in the
/// platform's seed data. Anything unrecognised becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" | "পুরুষ" => Gender::Male,
            "female" | "f" | "মহিলা" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(label)
    }
}

/// Requested caregiver gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Male,
    Female,
    Any,
}

impl GenderPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPreference::Male => "male",
            GenderPreference::Female => "female",
            GenderPreference::Any => "any",
        }
    }

    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            GenderPreference::Any => true,
            GenderPreference::Male => gender == Gender::Male,
            GenderPreference::Female => gender == Gender::Female,
        }
    }
}

impl From<Gender> for GenderPreference {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => GenderPreference::Male,
            Gender::Female => GenderPreference::Female,
            Gender::Other => GenderPreference::Any,
        }
    }
}

impl FromStr for GenderPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" => Ok(GenderPreference::Any),
            "male" | "পুরুষ" => Ok(GenderPreference::Male),
            "female" | "মহিলা" => Ok(GenderPreference::Female),
            other => Err(format!("unknown gender preference '{}'", other)),
        }
    }
}

/// Where the care is needed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Point(GeoPoint),
    /// Reference to a senior whose location the caller still has to look up
    Senior(String),
}

/// Requested booking slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_hours: f64,
}

impl BookingWindow {
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// `None` when the duration cannot be placed on the calendar
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.start().checked_add_signed(hours(self.duration_hours)?)
    }
}

/// Longest booking a request may ask for
pub const MAX_BOOKING_HOURS: f64 = 24.0;

/// Fractional hours as a chrono duration (second precision)
///
/// `None` for non-finite values and for spans chrono cannot represent.
pub(crate) fn hours(value: f64) -> Option<Duration> {
    if !value.is_finite() {
        return None;
    }
    let seconds = (value * 3600.0).round();
    if seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}

/// A single matching request, constructed per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRequest {
    pub origin: Origin,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_gender: Option<GenderPreference>,
    #[serde(default)]
    pub preferred_area: Option<String>,
    pub booking_window: BookingWindow,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Fail with `EmptyPool` instead of returning an empty list
    #[serde(default)]
    pub require_candidates: bool,
}

pub(crate) fn default_top_n() -> usize {
    5
}

/// Lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Whether a booking in this state occupies the caregiver's time
    pub fn blocks_schedule(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::InProgress | BookingStatus::Completed
        )
    }
}

/// An existing booking held by a caregiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(alias = "duration_hrs")]
    pub duration_hours: f64,
    pub status: BookingStatus,
}

impl Commitment {
    pub fn start(&self) -> NaiveDateTime {
        self.booking_date.and_time(self.start_time)
    }

    /// `None` when the stored duration is unusable
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.start().checked_add_signed(hours(self.duration_hours)?)
    }
}

/// Caregiver as supplied by the data layer. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaregiverRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_bn: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commitments: Vec<Commitment>,
}

/// Senior profile, used by callers to resolve a senior reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
}

/// Per-factor contribution to a match score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub skill: f64,
    pub rating: f64,
    pub experience: f64,
    pub gender: f64,
    pub language: f64,
}

impl ScoreBreakdown {
    /// Total score. Always summed in field order.
    pub fn sum(&self) -> f64 {
        self.distance + self.skill + self.rating + self.experience + self.gender + self.language
    }
}

/// Contact and profile details echoed alongside a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub experience_years: u32,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub hourly_rate: f64,
    pub services: Vec<String>,
    pub area: Option<String>,
}

/// Scored caregiver candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub caregiver_id: String,
    pub name: String,
    pub name_bn: Option<String>,
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    pub distance_km: f64,
    pub available: bool,
    pub details: MatchDetails,
    pub reason: String,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Maximum points per scoring factor. The defaults sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub distance: f64,
    pub skill: f64,
    pub rating: f64,
    pub experience: f64,
    pub gender: f64,
    pub language: f64,
}

/// Upper bound of a caregiver's total score
pub const MAX_TOTAL_SCORE: f64 = 100.0;

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.distance + self.skill + self.rating + self.experience + self.gender + self.language
    }

    /// Weights usable as factor maxima: negative or non-finite entries become
    /// zero and the set is scaled down proportionally when it exceeds
    /// [`MAX_TOTAL_SCORE`].
    pub fn capped(self) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let weights = Self {
            distance: clean(self.distance),
            skill: clean(self.skill),
            rating: clean(self.rating),
            experience: clean(self.experience),
            gender: clean(self.gender),
            language: clean(self.language),
        };

        let sum = weights.sum();
        if sum <= MAX_TOTAL_SCORE {
            return weights;
        }

        let scale = MAX_TOTAL_SCORE / sum;
        Self {
            distance: weights.distance * scale,
            skill: weights.skill * scale,
            rating: weights.rating * scale,
            experience: weights.experience * scale,
            gender: weights.gender * scale,
            language: weights.language * scale,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance: 30.0,
            skill: 25.0,
            rating: 20.0,
            experience: 15.0,
            gender: 5.0,
            language: 5.0,
        }
    }
}
