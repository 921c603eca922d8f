//! Per-character equipped item level, cached.
//!
//! Backs the guild top-item-level command, which may look up dozens of
//! characters in a row; the two-hour cache keeps repeat invocations from
//! re-fetching the whole pool.

use std::sync::Arc;
use std::time::Duration;

use crate::api::blizzard::BlizzardClient;
use crate::common::error::{ApiError, ApiResult};
use crate::common::text::normalize_character_name;
use crate::common::TtlCache;

const ILVL_TTL: Duration = Duration::from_secs(60 * 60 * 2);

pub struct IlvlService {
    blizzard: Arc<BlizzardClient>,
    cache: TtlCache<(String, String), i64>,
}

impl IlvlService {
    pub fn new(blizzard: Arc<BlizzardClient>) -> Self {
        Self {
            blizzard,
            cache: TtlCache::new(ILVL_TTL),
        }
    }

    /// Equipped item level for one character, or `None` when the character
    /// is unknown or the equipment payload carries no usable level.
    pub async fn equipped_item_level(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<Option<i64>> {
        let name = normalize_character_name(character_name);
        let cache_key = (realm_slug.to_string(), name.clone());
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(Some(cached));
        }

        let equipment = match self
            .blizzard
            .character_equipment_summary(realm_slug, &name)
            .await
        {
            Ok(equipment) => equipment,
            Err(ApiError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        // Only cache real values; a missing field may be a privacy setting
        // the player flips tomorrow.
        match equipment.equipped_item_level {
            Some(ilvl) => {
                self.cache.set(cache_key, ilvl);
                Ok(Some(ilvl))
            }
            None => Ok(None),
        }
    }
}
