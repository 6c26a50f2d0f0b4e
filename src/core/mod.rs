// Core algorithm exports
pub mod availability;
pub mod distance;
pub mod explain;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod stats;

pub use availability::is_available;
pub use distance::{bounding_box, centroid, distance_km, haversine_distance};
pub use explain::build_reason;
pub use filters::{candidate_location, validate_request};
pub use matcher::{MatchOutcome, Matcher, ALGORITHM_VERSION};
pub use scoring::{score_candidate, ScoringConfig};
pub use stats::{compute_stats, PoolStats};
