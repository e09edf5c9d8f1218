pub mod workload;


#[cfg(test)]
use crate::{config::EngineConfig, results::BundleInput};

#[cfg(test)]
pub(crate) fn config() -> EngineConfig {
    EngineConfig::with_key("0".repeat(64))
}

#[cfg(test)]
pub(crate) fn peer_review() -> BundleInput {
    serde_json::from_str(include_str!("fixtures/peer_review.json")).unwrap()
}
