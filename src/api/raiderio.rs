//! Raider.IO ranking API client.
//!
//! Unauthenticated, so the only courtesy it asks for is respecting 429s.
//! A rate-limit response carries the `Retry-After` hint when present.

use serde::Deserialize;
use tracing::debug;

use crate::common::error::{ApiError, ApiResult};

const BASE_URL: &str = "https://raider.io/api/v1";

/// Default fields requested with a character profile.
pub const DEFAULT_PROFILE_FIELDS: [&str; 3] = [
    "raid_progression",
    "mythic_plus_scores_by_season:current",
    "mythic_plus_best_runs",
];

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaiderProfile {
    #[serde(default)]
    pub mythic_plus_scores_by_season: Vec<SeasonScores>,
    #[serde(default)]
    pub mythic_plus_best_runs: Vec<BestRun>,
    /// Keyed by raid slug. Iteration order matters for the line cap, so
    /// serde_json's `preserve_order` feature keeps payload order here.
    #[serde(default)]
    pub raid_progression: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonScores {
    pub scores: Option<Scores>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scores {
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BestRun {
    pub keystone_level: Option<i64>,
    #[serde(default)]
    pub timed: bool,
    pub dungeon: Option<DungeonRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DungeonRef {
    pub name: Option<String>,
}

/// Per-raid progression entry, decoded from the `raid_progression` map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaidProgression {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub total_bosses: Option<i64>,
    pub normal_bosses_killed: Option<i64>,
    pub heroic_bosses_killed: Option<i64>,
    pub mythic_bosses_killed: Option<i64>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Typed client for the Raider.IO API.
pub struct RaiderIoClient {
    http: reqwest::Client,
    region: String,
}

impl RaiderIoClient {
    pub fn new(http: reqwest::Client, region: String) -> Self {
        Self {
            http,
            region: region.to_lowercase(),
        }
    }

    /// Fetch a character profile with the default field set.
    pub async fn character_profile(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<RaiderProfile> {
        let url = format!("{BASE_URL}/characters/profile");
        let fields = DEFAULT_PROFILE_FIELDS.join(",");
        debug!("GET {} for {}/{}", url, realm_slug, character_name);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("region", self.region.as_str()),
                ("realm", realm_slug),
                ("name", character_name),
                ("fields", fields.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        match status.as_u16() {
            404 => Err(ApiError::NotFound),
            429 => {
                let retry_after = resp
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string());
                Err(ApiError::RateLimited { retry_after })
            }
            200 => Ok(resp.json::<RaiderProfile>().await?),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::Api {
                    message: format!("Raider.IO {status}: {body}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_decodes_scores_and_runs() {
        let json = r#"{
            "name": "Thrall",
            "mythic_plus_scores_by_season": [
                {"season": "season-tww-1", "scores": {"all": 2850.7}}
            ],
            "mythic_plus_best_runs": [
                {"keystone_level": 18, "timed": true, "dungeon": {"name": "The Stonevault"}},
                {"keystone_level": 20, "dungeon": {"name": "Ara-Kara"}}
            ]
        }"#;
        let profile: RaiderProfile = serde_json::from_str(json).unwrap();
        assert_eq!(
            profile.mythic_plus_scores_by_season[0]
                .scores
                .as_ref()
                .unwrap()
                .all,
            Some(2850.7)
        );
        assert_eq!(profile.mythic_plus_best_runs.len(), 2);
        // "timed" omitted defaults to false
        assert!(!profile.mythic_plus_best_runs[1].timed);
    }

    #[test]
    fn test_profile_decodes_empty_payload() {
        let profile: RaiderProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.mythic_plus_scores_by_season.is_empty());
        assert!(profile.mythic_plus_best_runs.is_empty());
        assert!(profile.raid_progression.is_empty());
    }

    #[test]
    fn test_raid_progression_entry_decodes() {
        let json = r#"{
            "name": "Nerub-ar Palace",
            "summary": "8/8 N",
            "total_bosses": 8,
            "normal_bosses_killed": 8
        }"#;
        let raid: RaidProgression = serde_json::from_str(json).unwrap();
        assert_eq!(raid.summary.as_deref(), Some("8/8 N"));
        assert_eq!(raid.total_bosses, Some(8));
        assert!(raid.mythic_bosses_killed.is_none());
    }

    #[test]
    fn test_default_fields() {
        let joined = DEFAULT_PROFILE_FIELDS.join(",");
        assert_eq!(
            joined,
            "raid_progression,mythic_plus_scores_by_season:current,mythic_plus_best_runs"
        );
    }
}
