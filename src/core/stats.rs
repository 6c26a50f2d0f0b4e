use crate::core::distance::{bounding_box, centroid};
use crate::core::scoring::normalize_skill;
use crate::models::{BoundingBox, CaregiverRecord, GeoPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive statistics over a caregiver pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_caregivers: usize,
    pub located_caregivers: usize,
    pub missing_location: usize,
    pub average_rating: Option<f64>,
    pub average_hourly_rate: Option<f64>,
    /// Caregivers offering each skill, keyed by normalised skill name
    pub skill_frequency: BTreeMap<String, usize>,
    pub bounding_box: Option<BoundingBox>,
    pub centroid: Option<GeoPoint>,
}

/// Aggregate statistics over the full pool
///
/// Read-only reduction with no filtering. Records without a usable location
/// still count toward totals and averages; they are only left out of the
/// geographic extent.
pub fn compute_stats(pool: &[CaregiverRecord]) -> PoolStats {
    let total = pool.len();

    let located: Vec<GeoPoint> = pool
        .iter()
        .filter_map(|c| c.location)
        .filter(GeoPoint::is_valid)
        .collect();

    let mut skill_frequency = BTreeMap::new();
    for caregiver in pool {
        // Count each caregiver once per skill even if listed twice
        let mut seen: Vec<String> = caregiver
            .skills
            .iter()
            .map(|s| normalize_skill(s))
            .filter(|s| !s.is_empty())
            .collect();
        seen.sort();
        seen.dedup();

        for skill in seen {
            *skill_frequency.entry(skill).or_insert(0) += 1;
        }
    }

    PoolStats {
        total_caregivers: total,
        located_caregivers: located.len(),
        missing_location: total - located.len(),
        average_rating: mean(pool.iter().map(|c| c.rating)),
        average_hourly_rate: mean(pool.iter().map(|c| c.hourly_rate)),
        skill_frequency,
        bounding_box: bounding_box(&located),
        centroid: centroid(&located),
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (count, sum) = values
        .filter(|v| v.is_finite())
        .fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));

    (count > 0).then(|| sum / count as f64)
}
