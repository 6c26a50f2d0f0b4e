use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Request to find matching caregivers
///
/// Field names follow the matching contract shared with the web layer.
/// Either `senior_id` or both coordinates must be present; that rule and
/// the booking fields are checked during resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub senior_id: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub senior_lat: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub senior_lon: Option<f64>,
    #[serde(default, deserialize_with = "skill_list")]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub senior_gender: Option<String>,
    #[serde(default)]
    pub senior_area: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, max = 24.0))]
    pub duration_hrs: Option<f64>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Skills arrive either as a JSON array or as one comma-separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillList {
    Many(Vec<String>),
    Joined(String),
}

fn skill_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let skills = match Option::<SkillList>::deserialize(deserializer)? {
        None => vec![],
        Some(SkillList::Many(skills)) => skills,
        Some(SkillList::Joined(joined)) => split_skill_list(&joined),
    };
    Ok(skills)
}

/// Split a comma-separated skill list, dropping blank entries
pub fn split_skill_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
