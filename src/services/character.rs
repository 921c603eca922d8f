//! Character overview aggregation.
//!
//! Merges the Blizzard profile/equipment/statistics/media resources with
//! the Raider.IO profile into a single immutable overview record. Only the
//! profile summary fetch propagates errors; everything else degrades to a
//! placeholder so one flaky sub-resource never sinks the whole command.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::api::blizzard::{
    BlizzardClient, CharacterMedia, CharacterStatistics, EquipmentSummary, NamedRef,
};
use crate::api::raiderio::{BestRun, RaidProgression, RaiderIoClient, RaiderProfile};
use crate::common::error::{ApiError, ApiResult};
use crate::common::TtlCache;
use crate::services::PLACEHOLDER;

/// Raider.IO responses are cached briefly; scores move slowly and the API
/// rate limit is tight.
const RAIDERIO_TTL: Duration = Duration::from_secs(120);

const RATE_LIMIT_NOTE: &str = "Raider.IO is rate limiting. Try again in 1-2 minutes.";

const MAX_RAID_LINES: usize = 6;
const MAX_TOP_RUNS: usize = 3;

/// Mythic-plus score and best runs, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MythicPlusSummary {
    pub score: String,
    pub top_runs: Vec<String>,
}

impl MythicPlusSummary {
    pub fn empty() -> Self {
        Self {
            score: PLACEHOLDER.to_string(),
            top_runs: Vec::new(),
        }
    }
}

/// One character, merged from all upstream sources.
#[derive(Debug, Clone)]
pub struct CharacterOverview {
    pub name: String,
    /// Normalized slug; the embed shows the user's original spelling.
    #[allow(dead_code)]
    pub realm: String,
    pub region: String,
    pub level: String,
    pub class_name: String,
    pub class_id: Option<i64>,
    pub race: String,
    pub faction: String,
    pub spec: Option<String>,
    pub guild: Option<String>,
    pub item_level: String,
    pub thumbnail_url: Option<String>,
    pub armory_url: String,
    pub mythic_plus: MythicPlusSummary,
    pub raid_progress_lines: Vec<String>,
}

pub struct CharacterService {
    blizzard: Arc<BlizzardClient>,
    raiderio: Arc<RaiderIoClient>,
    raider_cache: TtlCache<(String, String), RaiderProfile>,
}

impl CharacterService {
    pub fn new(blizzard: Arc<BlizzardClient>, raiderio: Arc<RaiderIoClient>) -> Self {
        Self {
            blizzard,
            raiderio,
            raider_cache: TtlCache::new(RAIDERIO_TTL),
        }
    }

    /// Build the overview for one character. Expects normalized inputs.
    pub async fn character_overview(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<CharacterOverview> {
        let profile = self
            .blizzard
            .character_profile_summary(realm_slug, character_name)
            .await?;

        let item_level = self.resolve_item_level(realm_slug, character_name).await;
        let thumbnail_url = self.resolve_thumbnail(realm_slug, character_name).await;
        let (mythic_plus, raid_progress_lines) =
            self.resolve_raiderio(realm_slug, character_name).await;

        let named = |r: Option<&NamedRef>| {
            r.and_then(|n| n.name.clone())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };

        Ok(CharacterOverview {
            name: profile
                .name
                .clone()
                .unwrap_or_else(|| character_name.to_string()),
            realm: realm_slug.to_string(),
            region: self.blizzard.region().to_string(),
            level: profile
                .level
                .map(|l| l.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            class_name: named(profile.character_class.as_ref()),
            class_id: profile.character_class.as_ref().and_then(|c| c.id),
            race: named(profile.race.as_ref()),
            faction: named(profile.faction.as_ref()),
            spec: profile.active_spec.as_ref().and_then(|s| s.name.clone()),
            guild: profile.guild.as_ref().and_then(|g| g.name.clone()),
            item_level,
            thumbnail_url,
            armory_url: self
                .blizzard
                .armory_character_url(realm_slug, character_name),
            mythic_plus,
            raid_progress_lines,
        })
    }

    /// Ordered fallback chain for item level. Each step swallows its own
    /// fetch failure and hands over to the next.
    async fn resolve_item_level(&self, realm_slug: &str, character_name: &str) -> String {
        let equipment = self
            .blizzard
            .character_equipment_summary(realm_slug, character_name)
            .await
            .ok();

        // Direct field first; skip the statistics round trip when it hits.
        if let Some(direct) = equipment.as_ref().and_then(direct_item_level) {
            return direct.to_string();
        }

        let stats = self
            .blizzard
            .character_statistics(realm_slug, character_name)
            .await
            .ok();

        // The per-item average needs equipment; re-attempt the fetch if the
        // first one failed, since the steps fail independently.
        let equipment = match equipment {
            Some(e) => Some(e),
            None => self
                .blizzard
                .character_equipment_summary(realm_slug, character_name)
                .await
                .ok(),
        };

        pick_item_level(equipment.as_ref(), stats.as_ref())
    }

    async fn resolve_thumbnail(&self, realm_slug: &str, character_name: &str) -> Option<String> {
        match self
            .blizzard
            .character_media(realm_slug, character_name)
            .await
        {
            Ok(media) => pick_thumbnail(&media),
            Err(_) => None,
        }
    }

    /// Raider.IO data behind the short cache. A character unknown to
    /// Raider.IO is routine, not an error; rate limits degrade to a note.
    async fn resolve_raiderio(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> (MythicPlusSummary, Vec<String>) {
        let cache_key = (realm_slug.to_string(), character_name.to_string());

        let profile = match self.raider_cache.get(&cache_key) {
            Some(cached) => cached,
            None => match self
                .raiderio
                .character_profile(realm_slug, character_name)
                .await
            {
                Ok(profile) => {
                    self.raider_cache.set(cache_key, profile.clone());
                    profile
                }
                Err(e) => {
                    if let ApiError::Api { .. } = e {
                        warn!(
                            "Raider.IO lookup failed for {}/{}: {}",
                            realm_slug, character_name, e
                        );
                    }
                    return degrade_raider_failure(&e);
                }
            },
        };

        (extract_mythic_plus(&profile), extract_raid_progress(&profile))
    }
}

// ---------------------------------------------------------------------------
// Pure extraction helpers
// ---------------------------------------------------------------------------

/// A failed Raider.IO lookup never surfaces to the user: an unknown
/// character and a generic failure come back empty, a rate limit keeps
/// the placeholder score and carries an informational note.
fn degrade_raider_failure(err: &ApiError) -> (MythicPlusSummary, Vec<String>) {
    match err {
        ApiError::RateLimited { .. } => (
            MythicPlusSummary {
                score: PLACEHOLDER.to_string(),
                top_runs: vec![RATE_LIMIT_NOTE.to_string()],
            },
            vec![RATE_LIMIT_NOTE.to_string()],
        ),
        _ => (MythicPlusSummary::empty(), Vec::new()),
    }
}

fn direct_item_level(equipment: &EquipmentSummary) -> Option<i64> {
    equipment.equipped_item_level.filter(|v| *v > 0)
}

/// The full fallback chain over already-fetched payloads:
/// direct equipped level, statistics averages, per-item mean, placeholder.
fn pick_item_level(
    equipment: Option<&EquipmentSummary>,
    stats: Option<&CharacterStatistics>,
) -> String {
    if let Some(direct) = equipment.and_then(direct_item_level) {
        return direct.to_string();
    }

    if let Some(stats) = stats {
        for v in [stats.average_item_level_equipped, stats.average_item_level] {
            if let Some(v) = v.filter(|v| *v > 0) {
                return v.to_string();
            }
        }
    }

    if let Some(equipment) = equipment {
        let levels: Vec<i64> = equipment
            .equipped_items
            .iter()
            .filter_map(|item| item.level.as_ref().and_then(|l| l.value))
            .filter(|v| *v > 0)
            .collect();
        if !levels.is_empty() {
            let mean = levels.iter().sum::<i64>() as f64 / levels.len() as f64;
            return format!("{mean:.1}");
        }
    }

    PLACEHOLDER.to_string()
}

/// First non-empty asset among avatar/inset/main, in that order.
fn pick_thumbnail(media: &CharacterMedia) -> Option<String> {
    for key in ["avatar", "inset", "main"] {
        let hit = media.assets.iter().find(|a| {
            a.key.as_deref() == Some(key) && a.value.as_deref().is_some_and(|v| !v.is_empty())
        });
        if let Some(asset) = hit {
            return asset.value.clone();
        }
    }
    None
}

/// Score of the current season plus the best three runs.
fn extract_mythic_plus(profile: &RaiderProfile) -> MythicPlusSummary {
    let score = profile
        .mythic_plus_scores_by_season
        .first()
        .and_then(|season| season.scores.as_ref())
        .and_then(|s| s.all)
        .filter(|v| *v > 0.0)
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let mut runs: Vec<&BestRun> = profile
        .mythic_plus_best_runs
        .iter()
        .filter(|r| r.keystone_level.is_some())
        .collect();

    // Timed keys outrank untimed ones at any level; stable sort keeps the
    // payload order for exact ties.
    runs.sort_by(|a, b| {
        b.timed
            .cmp(&a.timed)
            .then(b.keystone_level.cmp(&a.keystone_level))
    });

    let top_runs = runs
        .iter()
        .take(MAX_TOP_RUNS)
        .map(|r| format_run(r))
        .collect();

    MythicPlusSummary { score, top_runs }
}

fn format_run(run: &BestRun) -> String {
    let level = run.keystone_level.unwrap_or_default();
    let badge = if run.timed { "✅" } else { "⏱️" };
    let dungeon = run
        .dungeon
        .as_ref()
        .and_then(|d| d.name.as_deref())
        .unwrap_or("Dungeon");
    format!("+{level} {badge} — {dungeon}")
}

/// One line per raid, using the pre-formatted summary when Raider.IO
/// provides one and synthesizing from boss-kill counts otherwise.
fn extract_raid_progress(profile: &RaiderProfile) -> Vec<String> {
    let mut lines = Vec::new();

    for (slug, value) in &profile.raid_progression {
        if lines.len() == MAX_RAID_LINES {
            break;
        }
        let Some(raid) = decode_raid(value) else {
            continue;
        };

        let raid_name = raid
            .name
            .clone()
            .unwrap_or_else(|| title_case_slug(slug));

        if let Some(summary) = raid.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(format!("{raid_name}: {summary}"));
            continue;
        }

        let Some(total) = raid.total_bosses.filter(|t| *t > 0) else {
            continue;
        };

        let mut parts = Vec::new();
        for (killed, tag) in [
            (raid.mythic_bosses_killed, "M"),
            (raid.heroic_bosses_killed, "H"),
            (raid.normal_bosses_killed, "N"),
        ] {
            if let Some(k) = killed.filter(|k| *k > 0) {
                parts.push(format!("{k}/{total}{tag}"));
            }
        }

        if !parts.is_empty() {
            lines.push(format!("{raid_name}: {}", parts.join(" ")));
        }
    }

    lines
}

fn decode_raid(value: &Value) -> Option<RaidProgression> {
    serde_json::from_value(value.clone()).ok()
}

/// "nerub-ar-palace" -> "Nerub Ar Palace", for raids missing a name field.
fn title_case_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::blizzard::{EquippedItem, ItemLevel, MediaAsset};
    use crate::api::raiderio::{DungeonRef, Scores, SeasonScores};

    fn equipment(direct: Option<i64>, item_levels: &[i64]) -> EquipmentSummary {
        EquipmentSummary {
            equipped_item_level: direct,
            equipped_items: item_levels
                .iter()
                .map(|v| EquippedItem {
                    level: Some(ItemLevel { value: Some(*v) }),
                })
                .collect(),
        }
    }

    fn stats(equipped: Option<i64>, average: Option<i64>) -> CharacterStatistics {
        CharacterStatistics {
            average_item_level_equipped: equipped,
            average_item_level: average,
        }
    }

    #[test]
    fn test_item_level_direct_wins() {
        let equip = equipment(Some(450), &[400, 410]);
        let st = stats(Some(440), Some(445));
        assert_eq!(pick_item_level(Some(&equip), Some(&st)), "450");
    }

    #[test]
    fn test_item_level_stats_equipped_fallback() {
        let equip = equipment(None, &[]);
        let st = stats(Some(440), Some(445));
        assert_eq!(pick_item_level(Some(&equip), Some(&st)), "440");
    }

    #[test]
    fn test_item_level_stats_average_fallback() {
        let st = stats(None, Some(445));
        assert_eq!(pick_item_level(None, Some(&st)), "445");
    }

    #[test]
    fn test_item_level_mean_of_items() {
        let equip = equipment(None, &[400, 410, 420]);
        assert_eq!(pick_item_level(Some(&equip), None), "410.0");
    }

    #[test]
    fn test_item_level_zero_direct_ignored() {
        let equip = equipment(Some(0), &[400, 410, 420]);
        assert_eq!(pick_item_level(Some(&equip), None), "410.0");
    }

    #[test]
    fn test_item_level_placeholder_when_nothing() {
        assert_eq!(pick_item_level(None, None), PLACEHOLDER);
        let equip = equipment(None, &[]);
        assert_eq!(pick_item_level(Some(&equip), Some(&stats(None, None))), PLACEHOLDER);
    }

    #[test]
    fn test_thumbnail_prefers_avatar() {
        let media = CharacterMedia {
            assets: vec![
                MediaAsset {
                    key: Some("main".to_string()),
                    value: Some("main.jpg".to_string()),
                },
                MediaAsset {
                    key: Some("avatar".to_string()),
                    value: Some("avatar.jpg".to_string()),
                },
            ],
        };
        assert_eq!(pick_thumbnail(&media).as_deref(), Some("avatar.jpg"));
    }

    #[test]
    fn test_thumbnail_skips_empty_values() {
        let media = CharacterMedia {
            assets: vec![
                MediaAsset {
                    key: Some("avatar".to_string()),
                    value: Some(String::new()),
                },
                MediaAsset {
                    key: Some("inset".to_string()),
                    value: Some("inset.jpg".to_string()),
                },
            ],
        };
        assert_eq!(pick_thumbnail(&media).as_deref(), Some("inset.jpg"));
    }

    #[test]
    fn test_thumbnail_none_when_no_assets() {
        assert_eq!(pick_thumbnail(&CharacterMedia::default()), None);
    }

    fn run(level: i64, timed: bool, dungeon: &str) -> BestRun {
        BestRun {
            keystone_level: Some(level),
            timed,
            dungeon: Some(DungeonRef {
                name: Some(dungeon.to_string()),
            }),
        }
    }

    #[test]
    fn test_mythic_plus_run_ordering() {
        let profile = RaiderProfile {
            mythic_plus_best_runs: vec![
                run(20, false, "Mists"),
                run(18, true, "Stonevault"),
                run(20, true, "Ara-Kara"),
            ],
            ..Default::default()
        };
        let summary = extract_mythic_plus(&profile);
        assert_eq!(
            summary.top_runs,
            vec![
                "+20 ✅ — Ara-Kara",
                "+18 ✅ — Stonevault",
                "+20 ⏱️ — Mists",
            ]
        );
    }

    #[test]
    fn test_mythic_plus_score_one_decimal() {
        let profile = RaiderProfile {
            mythic_plus_scores_by_season: vec![SeasonScores {
                scores: Some(Scores { all: Some(2850.67) }),
            }],
            ..Default::default()
        };
        assert_eq!(extract_mythic_plus(&profile).score, "2850.7");
    }

    #[test]
    fn test_mythic_plus_zero_score_is_placeholder() {
        let profile = RaiderProfile {
            mythic_plus_scores_by_season: vec![SeasonScores {
                scores: Some(Scores { all: Some(0.0) }),
            }],
            ..Default::default()
        };
        assert_eq!(extract_mythic_plus(&profile).score, PLACEHOLDER);
    }

    #[test]
    fn test_mythic_plus_caps_at_three_runs() {
        let profile = RaiderProfile {
            mythic_plus_best_runs: vec![
                run(15, true, "A"),
                run(16, true, "B"),
                run(17, true, "C"),
                run(18, true, "D"),
            ],
            ..Default::default()
        };
        let summary = extract_mythic_plus(&profile);
        assert_eq!(summary.top_runs.len(), 3);
        assert_eq!(summary.top_runs[0], "+18 ✅ — D");
    }

    #[test]
    fn test_raid_progress_prefers_summary() {
        let mut progression = serde_json::Map::new();
        progression.insert(
            "nerub-ar-palace".to_string(),
            serde_json::json!({"name": "Nerub-ar Palace", "summary": " 8/8 M "}),
        );
        let profile = RaiderProfile {
            raid_progression: progression,
            ..Default::default()
        };
        assert_eq!(
            extract_raid_progress(&profile),
            vec!["Nerub-ar Palace: 8/8 M"]
        );
    }

    #[test]
    fn test_raid_progress_synthesizes_from_kill_counts() {
        let mut progression = serde_json::Map::new();
        progression.insert(
            "liberation-of-undermine".to_string(),
            serde_json::json!({
                "total_bosses": 8,
                "mythic_bosses_killed": 2,
                "heroic_bosses_killed": 8,
                "normal_bosses_killed": 0
            }),
        );
        let profile = RaiderProfile {
            raid_progression: progression,
            ..Default::default()
        };
        assert_eq!(
            extract_raid_progress(&profile),
            vec!["Liberation Of Undermine: 2/8M 8/8H"]
        );
    }

    #[test]
    fn test_raid_progress_skips_empty_raids() {
        let mut progression = serde_json::Map::new();
        progression.insert(
            "old-raid".to_string(),
            serde_json::json!({"total_bosses": 8}),
        );
        let profile = RaiderProfile {
            raid_progression: progression,
            ..Default::default()
        };
        assert!(extract_raid_progress(&profile).is_empty());
    }

    #[test]
    fn test_raid_progress_keeps_payload_order() {
        // Upstream lists raids newest-first; the slugs here sort the other
        // way alphabetically, so this fails if decoding reorders the map.
        let profile: RaiderProfile = serde_json::from_str(
            r#"{
                "raid_progression": {
                    "zekvir-lair": {"name": "Zekvir Lair", "summary": "1/1 M"},
                    "amirdrassil": {"name": "Amirdrassil", "summary": "9/9 M"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            extract_raid_progress(&profile),
            vec!["Zekvir Lair: 1/1 M", "Amirdrassil: 9/9 M"]
        );
    }

    #[test]
    fn test_raid_progress_caps_lines() {
        let mut progression = serde_json::Map::new();
        for i in 0..10 {
            progression.insert(
                format!("raid-{i}"),
                serde_json::json!({"summary": "8/8 N"}),
            );
        }
        let profile = RaiderProfile {
            raid_progression: progression,
            ..Default::default()
        };
        assert_eq!(extract_raid_progress(&profile).len(), 6);
    }

    #[test]
    fn test_raider_not_found_degrades_to_empty() {
        let (mplus, raid_lines) = degrade_raider_failure(&ApiError::NotFound);
        assert_eq!(mplus, MythicPlusSummary::empty());
        assert!(raid_lines.is_empty());
    }

    #[test]
    fn test_raider_rate_limit_degrades_to_note() {
        let err = ApiError::RateLimited {
            retry_after: Some("60".to_string()),
        };
        let (mplus, raid_lines) = degrade_raider_failure(&err);
        assert_eq!(mplus.score, PLACEHOLDER);
        assert_eq!(mplus.top_runs, vec![RATE_LIMIT_NOTE.to_string()]);
        assert_eq!(raid_lines, vec![RATE_LIMIT_NOTE.to_string()]);
    }

    #[test]
    fn test_raider_generic_failure_degrades_to_empty() {
        let err = ApiError::Api {
            message: "Raider.IO 500".to_string(),
        };
        let (mplus, raid_lines) = degrade_raider_failure(&err);
        assert_eq!(mplus, MythicPlusSummary::empty());
        assert!(raid_lines.is_empty());
    }

    #[test]
    fn test_title_case_slug() {
        assert_eq!(title_case_slug("nerub-ar-palace"), "Nerub Ar Palace");
    }
}
