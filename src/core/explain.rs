use crate::models::{CaregiverRecord, ScoreBreakdown, ScoringWeights};

/// Minimum fraction of a factor's maximum before it is worth mentioning
pub const REASON_THRESHOLD: f64 = 0.5;
/// How many factors a reason names at most
pub const MAX_REASON_FACTORS: usize = 2;
/// Below this distance a caregiver is "very close"
pub const VERY_CLOSE_KM: f64 = 3.0;

const FALLBACK_REASON: &str = "good option";
const CONFLICT_NOTE: &str = "schedule conflict";

/// Scoring factor, in weight order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Distance,
    Skill,
    Rating,
    Experience,
    Gender,
    Language,
}

impl Factor {
    const ALL: [Factor; 6] = [
        Factor::Distance,
        Factor::Skill,
        Factor::Rating,
        Factor::Experience,
        Factor::Gender,
        Factor::Language,
    ];

    fn points(&self, breakdown: &ScoreBreakdown) -> f64 {
        match self {
            Factor::Distance => breakdown.distance,
            Factor::Skill => breakdown.skill,
            Factor::Rating => breakdown.rating,
            Factor::Experience => breakdown.experience,
            Factor::Gender => breakdown.gender,
            Factor::Language => breakdown.language,
        }
    }

    fn max(&self, weights: &ScoringWeights) -> f64 {
        match self {
            Factor::Distance => weights.distance,
            Factor::Skill => weights.skill,
            Factor::Rating => weights.rating,
            Factor::Experience => weights.experience,
            Factor::Gender => weights.gender,
            Factor::Language => weights.language,
        }
    }
}

/// Factors ordered by how close each came to its maximum
///
/// Only factors at or above `threshold` of their maximum are kept. The sort
/// is stable, so equal fractions keep weight order.
pub fn top_factors(breakdown: &ScoreBreakdown, weights: &ScoringWeights, threshold: f64) -> Vec<Factor> {
    let mut ranked: Vec<(Factor, f64)> = Factor::ALL
        .iter()
        .filter_map(|factor| {
            let max = factor.max(weights);
            if max <= 0.0 {
                return None;
            }
            let fraction = factor.points(breakdown) / max;
            (fraction > 0.0 && fraction >= threshold).then_some((*factor, fraction))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().map(|(factor, _)| factor).collect()
}

/// Short explanation naming the strongest factors of a match
///
/// Deterministic for a given breakdown and record.
pub fn build_reason(
    caregiver: &CaregiverRecord,
    breakdown: &ScoreBreakdown,
    weights: &ScoringWeights,
    distance_km: f64,
    available: bool,
    threshold: f64,
) -> String {
    let mut parts: Vec<String> = top_factors(breakdown, weights, threshold)
        .into_iter()
        .take(MAX_REASON_FACTORS)
        .map(|factor| describe(factor, caregiver, distance_km))
        .collect();

    if parts.is_empty() {
        parts.push(FALLBACK_REASON.to_string());
    }

    if !available {
        parts.push(CONFLICT_NOTE.to_string());
    }

    parts.join(", ")
}

fn describe(factor: Factor, caregiver: &CaregiverRecord, distance_km: f64) -> String {
    match factor {
        Factor::Distance if distance_km < VERY_CLOSE_KM => {
            format!("very close ({:.1} km)", distance_km)
        }
        Factor::Distance => format!("nearby ({:.1} km)", distance_km),
        Factor::Skill => "strong skill overlap".to_string(),
        Factor::Rating => format!("highly rated ({:.1}/5)", caregiver.rating),
        Factor::Experience => format!("{} years of experience", caregiver.experience_years),
        Factor::Gender => "gender preference met".to_string(),
        Factor::Language => "same locality".to_string(),
    }
}
