//! Guild roster aggregation.
//!
//! The roster endpoint is heavy and guild membership moves slowly, so
//! responses sit in a five-minute cache. Class metadata is effectively
//! static and cached for a month.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::blizzard::{BlizzardClient, GuildRoster};
use crate::common::error::ApiResult;
use crate::common::TtlCache;

const ROSTER_TTL: Duration = Duration::from_secs(5 * 60);
const CLASS_NAME_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

const TOP_BY_LEVEL: usize = 10;

/// One roster member, parsed from the upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterMember {
    /// The roster occasionally carries a character without a name; such
    /// members still count toward totals and level rankings.
    pub name: Option<String>,
    pub level: i64,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
    #[allow(dead_code)]
    pub rank: Option<i64>,
}

/// Roster digest ready for presentation.
#[derive(Debug, Clone)]
pub struct RosterSummary {
    pub total: usize,
    pub top_by_level: Vec<RosterMember>,
    /// Class name -> member count, sorted by count descending. Ties keep
    /// first-seen roster order.
    pub class_counts: Vec<(String, usize)>,
    pub dominant_class_id: Option<i64>,
}

pub struct GuildService {
    blizzard: Arc<BlizzardClient>,
    roster_cache: TtlCache<(String, String), GuildRoster>,
    class_name_cache: TtlCache<i64, String>,
}

impl GuildService {
    pub fn new(blizzard: Arc<BlizzardClient>) -> Self {
        Self {
            blizzard,
            roster_cache: TtlCache::new(ROSTER_TTL),
            class_name_cache: TtlCache::new(CLASS_NAME_TTL),
        }
    }

    pub fn armory_guild_url(&self, realm_slug: &str, guild_slug: &str) -> String {
        self.blizzard.armory_guild_url(realm_slug, guild_slug)
    }

    /// Fetch the roster, served from cache when fresh.
    pub async fn guild_roster(
        &self,
        realm_slug: &str,
        guild_slug: &str,
    ) -> ApiResult<GuildRoster> {
        let cache_key = (realm_slug.to_string(), guild_slug.to_string());
        if let Some(cached) = self.roster_cache.get(&cache_key) {
            debug!("Roster cache hit for {}/{}", realm_slug, guild_slug);
            return Ok(cached);
        }

        let roster = self.blizzard.guild_roster(realm_slug, guild_slug).await?;
        self.roster_cache.set(cache_key, roster.clone());
        Ok(roster)
    }

    /// Summarize a roster: totals, top levels, class distribution.
    ///
    /// The roster payload often omits class names; missing ones resolve
    /// through the playable-class endpoint, sequentially on purpose so a
    /// large guild does not burst into the rate limit.
    pub async fn summarize_roster(&self, roster: &GuildRoster) -> ApiResult<RosterSummary> {
        let mut members = parse_members(roster);

        let mut needed: Vec<i64> = members
            .iter()
            .filter(|m| m.class_name.is_none())
            .filter_map(|m| m.class_id)
            .collect();
        needed.sort_unstable();
        needed.dedup();

        for class_id in needed {
            let name = self.class_name(class_id).await?;
            for member in members.iter_mut() {
                if member.class_name.is_none() && member.class_id == Some(class_id) {
                    member.class_name = Some(name.clone());
                }
            }
        }

        Ok(summarize_members(members))
    }

    async fn class_name(&self, class_id: i64) -> ApiResult<String> {
        if let Some(cached) = self.class_name_cache.get(&class_id) {
            return Ok(cached);
        }

        let class = self.blizzard.playable_class_by_id(class_id).await?;
        let name = class
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Class {class_id}"));

        self.class_name_cache.set(class_id, name.clone());
        Ok(name)
    }
}

// ---------------------------------------------------------------------------
// Pure roster helpers
// ---------------------------------------------------------------------------

/// Parse roster entries, dropping only those without a character record.
pub fn parse_members(roster: &GuildRoster) -> Vec<RosterMember> {
    roster
        .members
        .iter()
        .filter_map(|entry| {
            let character = entry.character.as_ref()?;
            let class = character.playable_class.as_ref();
            Some(RosterMember {
                name: character.name.clone(),
                level: character.level.unwrap_or(0),
                class_id: class.and_then(|c| c.id),
                class_name: class
                    .and_then(|c| c.name.clone())
                    .filter(|n| !n.trim().is_empty()),
                rank: entry.rank,
            })
        })
        .collect()
}

fn summarize_members(members: Vec<RosterMember>) -> RosterSummary {
    let total = members.len();

    // Stable sort: level ties keep original roster order.
    let mut top_by_level = members.clone();
    top_by_level.sort_by_key(|m| std::cmp::Reverse(m.level));
    top_by_level.truncate(TOP_BY_LEVEL);

    // Counts in first-seen order, then by frequency; stable sort again
    // keeps first-seen order among equal counts.
    let mut class_counts: Vec<(String, usize)> = Vec::new();
    for member in &members {
        let Some(name) = member.class_name.as_deref() else {
            continue;
        };
        match class_counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += 1,
            None => class_counts.push((name.to_string(), 1)),
        }
    }
    class_counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    let dominant_class_id = class_counts.first().and_then(|(top_name, _)| {
        members
            .iter()
            .find(|m| m.class_name.as_deref() == Some(top_name))
            .and_then(|m| m.class_id)
    });

    RosterSummary {
        total,
        top_by_level,
        class_counts,
        dominant_class_id,
    }
}
