use crate::models::{CareRequest, CaregiverRecord, GenderPreference, ScoreBreakdown, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Distance at which the distance score has decayed to 1/e of its maximum
pub const DISTANCE_DECAY_KM: f64 = 10.0;
/// Rating assumed for a caregiver with no reviews
pub const RATING_PRIOR_MEAN: f64 = 3.5;
/// How many reviews the prior is worth
pub const RATING_PRIOR_WEIGHT: f64 = 5.0;
/// Years of experience that earn the full experience score
pub const EXPERIENCE_SATURATION_YEARS: f64 = 15.0;
/// Language points for a partial (shared word) area match
pub const PARTIAL_LANGUAGE_SCORE: f64 = 2.5;
/// Maximum rating on the review scale
pub const MAX_RATING: f64 = 5.0;

/// Scoring weights plus the curve parameters of each factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub distance_decay_km: f64,
    pub rating_prior_mean: f64,
    pub rating_prior_weight: f64,
    pub experience_saturation_years: f64,
    pub partial_language_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            distance_decay_km: DISTANCE_DECAY_KM,
            rating_prior_mean: RATING_PRIOR_MEAN,
            rating_prior_weight: RATING_PRIOR_WEIGHT,
            experience_saturation_years: EXPERIENCE_SATURATION_YEARS,
            partial_language_score: PARTIAL_LANGUAGE_SCORE,
        }
    }
}

/// Score one caregiver against a request
///
/// The breakdown is purely additive:
/// total = distance (30) + skill (25) + rating (20)
///       + experience (15) + gender (5) + language (5)
pub fn score_candidate(
    caregiver: &CaregiverRecord,
    request: &CareRequest,
    required_skills: &BTreeSet<String>,
    distance_km: f64,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let w = &config.weights;

    ScoreBreakdown {
        distance: distance_score(distance_km, w.distance, config.distance_decay_km),
        skill: skill_score(required_skills, &caregiver.skills, w.skill),
        rating: rating_score(
            caregiver.rating,
            caregiver.review_count,
            w.rating,
            config.rating_prior_mean,
            config.rating_prior_weight,
        ),
        experience: experience_score(
            caregiver.experience_years,
            w.experience,
            config.experience_saturation_years,
        ),
        gender: gender_score(request.preferred_gender, caregiver, w.gender),
        language: language_score(
            request.preferred_area.as_deref(),
            caregiver.area.as_deref(),
            w.language,
            config.partial_language_score,
        ),
    }
}

/// Distance score in [0, max]
/// Exponential decay: max * e^(-distance / decay)
#[inline]
pub fn distance_score(distance_km: f64, max: f64, decay_km: f64) -> f64 {
    if !distance_km.is_finite() || decay_km <= 0.0 {
        return 0.0;
    }

    (max * (-distance_km.max(0.0) / decay_km).exp()).clamp(0.0, max)
}

/// Normalise a skill identifier for comparison
#[inline]
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Normalised, de-duplicated skill set
pub fn skill_set<I, S>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Cosine similarity of two binary skill vectors
///
/// With one-hot vectors over the shared vocabulary this reduces to
/// |A ∩ B| / sqrt(|A| * |B|).
pub fn cosine_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let shared = a.intersection(b).count() as f64;
    shared / ((a.len() as f64) * (b.len() as f64)).sqrt()
}

/// Skill score in [0, max]
///
/// No requirement means nothing to differentiate, so everyone gets `max`.
/// `required` must already be normalised with [`skill_set`].
pub fn skill_score(required: &BTreeSet<String>, offered: &[String], max: f64) -> f64 {
    if required.is_empty() {
        return max;
    }

    let offered = skill_set(offered);
    (cosine_similarity(required, &offered) * max).clamp(0.0, max)
}

/// Rating score in [0, max]
///
/// Bayesian average: (n * rating + m * prior) / (n + m), so a perfect rating
/// from one review is pulled toward the prior while an established
/// caregiver keeps close to their own average.
#[inline]
pub fn rating_score(rating: f64, reviews: u32, max: f64, prior_mean: f64, prior_weight: f64) -> f64 {
    let rating = if rating.is_finite() { rating.clamp(0.0, MAX_RATING) } else { 0.0 };
    let prior_mean = prior_mean.clamp(0.0, MAX_RATING);
    let prior_weight = prior_weight.max(0.0);
    let n = reviews as f64;

    let adjusted = if n + prior_weight > 0.0 {
        (n * rating + prior_weight * prior_mean) / (n + prior_weight)
    } else {
        rating
    };

    (adjusted / MAX_RATING * max).clamp(0.0, max)
}

/// Experience score in [0, max]
/// Logarithmic with diminishing returns, saturating at `saturation_years`
#[inline]
pub fn experience_score(years: u32, max: f64, saturation_years: f64) -> f64 {
    if years == 0 || saturation_years <= 0.0 {
        return 0.0;
    }

    let score = max * (years as f64).ln_1p() / saturation_years.ln_1p();
    score.clamp(0.0, max)
}

/// Gender score, all or nothing
#[inline]
pub fn gender_score(preference: Option<GenderPreference>, caregiver: &CaregiverRecord, max: f64) -> f64 {
    match preference {
        None => max,
        Some(pref) if pref.accepts(caregiver.gender) => max,
        Some(_) => 0.0,
    }
}

/// Language score in [0, max]
///
/// There is no language field on caregiver records, so locality is the
/// proxy for dialect familiarity: same area earns `max`, areas sharing a
/// word earn `partial`.
pub fn language_score(wanted: Option<&str>, offered: Option<&str>, max: f64, partial: f64) -> f64 {
    let (Some(wanted), Some(offered)) = (wanted, offered) else {
        return 0.0;
    };

    let wanted = wanted.trim().to_lowercase();
    let offered = offered.trim().to_lowercase();
    if wanted.is_empty() || offered.is_empty() {
        return 0.0;
    }

    if wanted == offered {
        return max;
    }

    let offered_words: BTreeSet<&str> = offered.split_whitespace().collect();
    if wanted.split_whitespace().any(|w| offered_words.contains(w)) {
        return partial.clamp(0.0, max);
    }

    0.0
}
