//! Battle.net game-data API client.
//!
//! Thin typed wrapper over the profile/dynamic/static REST namespaces.
//! Every call attaches a bearer token from the OAuth client and maps the
//! response status onto [`ApiError`]: 404 is not-found, 429 is
//! rate-limited, anything else non-200 is a generic API error.

use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api::oauth::OauthClient;
use crate::common::error::{ApiError, ApiResult};

// ---------------------------------------------------------------------------
// Payload types
//
// Upstream payloads are large; we decode only the fields the services
// read, everything optional. Unknown fields are ignored.
// ---------------------------------------------------------------------------

/// A `{ "id": .., "name": .. }` reference, ubiquitous in Blizzard payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterProfile {
    pub name: Option<String>,
    pub level: Option<i64>,
    pub character_class: Option<NamedRef>,
    pub race: Option<NamedRef>,
    pub faction: Option<NamedRef>,
    pub active_spec: Option<NamedRef>,
    pub guild: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentSummary {
    pub equipped_item_level: Option<i64>,
    #[serde(default)]
    pub equipped_items: Vec<EquippedItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquippedItem {
    pub level: Option<ItemLevel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemLevel {
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterStatistics {
    pub average_item_level_equipped: Option<i64>,
    pub average_item_level: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterMedia {
    #[serde(default)]
    pub assets: Vec<MediaAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaAsset {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildRoster {
    #[serde(default)]
    pub members: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterEntry {
    pub character: Option<RosterCharacter>,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterCharacter {
    pub name: Option<String>,
    pub level: Option<i64>,
    pub playable_class: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmIndex {
    #[serde(default)]
    pub realms: Vec<RealmRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmRef {
    pub id: Option<i64>,
    pub slug: Option<String>,
    #[allow(dead_code)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmDetail {
    pub connected_realm: Option<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectedRealm {
    pub status: Option<RealmStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmStatus {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[allow(dead_code)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayableClass {
    #[allow(dead_code)]
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)]
pub struct Achievement {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Typed client for the Battle.net game-data API.
pub struct BlizzardClient {
    http: reqwest::Client,
    oauth: Arc<OauthClient>,
    region: String,
    locale: String,
}

impl BlizzardClient {
    pub fn new(
        http: reqwest::Client,
        oauth: Arc<OauthClient>,
        region: String,
        locale: String,
    ) -> Self {
        Self {
            http,
            oauth,
            region: region.to_lowercase(),
            locale,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn base_url(&self) -> String {
        format!("https://{}.api.blizzard.com", self.region)
    }

    fn ns_profile(&self) -> String {
        format!("profile-{}", self.region)
    }

    fn ns_dynamic(&self) -> String {
        format!("dynamic-{}", self.region)
    }

    fn ns_static(&self) -> String {
        format!("static-{}", self.region)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, namespace: &str) -> ApiResult<T> {
        let token = self.oauth.get_access_token().await?;
        let url = format!("{}{}", self.base_url(), path);
        debug!("GET {} (namespace {})", url, namespace);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("namespace", namespace), ("locale", &self.locale)])
            .send()
            .await?;

        let status = resp.status();
        match status.as_u16() {
            404 => Err(ApiError::NotFound),
            429 => Err(ApiError::RateLimited { retry_after: None }),
            200 => Ok(resp.json::<T>().await?),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::Api {
                    message: format!("Blizzard API {status}: {body}"),
                })
            }
        }
    }

    // -----------------------------
    // Character profile resources
    // -----------------------------

    pub async fn character_profile_summary(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<CharacterProfile> {
        self.get(
            &format!("/profile/wow/character/{realm_slug}/{character_name}"),
            &self.ns_profile(),
        )
        .await
    }

    pub async fn character_equipment_summary(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<EquipmentSummary> {
        self.get(
            &format!("/profile/wow/character/{realm_slug}/{character_name}/equipment"),
            &self.ns_profile(),
        )
        .await
    }

    pub async fn character_statistics(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<CharacterStatistics> {
        self.get(
            &format!("/profile/wow/character/{realm_slug}/{character_name}/statistics"),
            &self.ns_profile(),
        )
        .await
    }

    pub async fn character_media(
        &self,
        realm_slug: &str,
        character_name: &str,
    ) -> ApiResult<CharacterMedia> {
        self.get(
            &format!("/profile/wow/character/{realm_slug}/{character_name}/character-media"),
            &self.ns_profile(),
        )
        .await
    }

    // -----------------------------
    // Guild resources
    // -----------------------------

    pub async fn guild_roster(
        &self,
        realm_slug: &str,
        guild_slug: &str,
    ) -> ApiResult<GuildRoster> {
        self.get(
            &format!("/data/wow/guild/{realm_slug}/{guild_slug}/roster"),
            &self.ns_profile(),
        )
        .await
    }

    // -----------------------------
    // Game data resources
    // -----------------------------

    pub async fn playable_class_by_id(&self, class_id: i64) -> ApiResult<PlayableClass> {
        self.get(
            &format!("/data/wow/playable-class/{class_id}"),
            &self.ns_static(),
        )
        .await
    }

    #[allow(dead_code)]
    pub async fn achievement_by_id(&self, achievement_id: i64) -> ApiResult<Achievement> {
        self.get(
            &format!("/data/wow/achievement/{achievement_id}"),
            &self.ns_static(),
        )
        .await
    }

    // -----------------------------
    // Realm resources
    // -----------------------------

    pub async fn realm_index(&self) -> ApiResult<RealmIndex> {
        self.get("/data/wow/realm/index", &self.ns_dynamic()).await
    }

    pub async fn realm_by_id(&self, realm_id: i64) -> ApiResult<RealmDetail> {
        self.get(&format!("/data/wow/realm/{realm_id}"), &self.ns_dynamic())
            .await
    }

    pub async fn connected_realm(&self, connected_realm_id: i64) -> ApiResult<ConnectedRealm> {
        self.get(
            &format!("/data/wow/connected-realm/{connected_realm_id}"),
            &self.ns_dynamic(),
        )
        .await
    }

    /// Pull the numeric connected-realm id out of a self-referential href
    /// like `https://eu.api.blizzard.com/data/wow/connected-realm/1403?...`.
    pub fn extract_connected_realm_id(href: &str) -> Option<i64> {
        let re = Regex::new(r"/connected-realm/(\d+)").unwrap();
        re.captures(href)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    // -----------------------------
    // Armory URLs (no network)
    // -----------------------------

    fn locale_web(&self) -> String {
        self.locale.replace('_', "-").to_lowercase()
    }

    pub fn armory_character_url(&self, realm_slug: &str, character_name: &str) -> String {
        format!(
            "https://worldofwarcraft.blizzard.com/{}/character/{}/{}/{}",
            self.locale_web(),
            self.region,
            realm_slug,
            character_name
        )
    }

    pub fn armory_guild_url(&self, realm_slug: &str, guild_slug: &str) -> String {
        format!(
            "https://worldofwarcraft.blizzard.com/{}/guild/{}/{}/{}",
            self.locale_web(),
            self.region,
            realm_slug,
            guild_slug
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> BlizzardClient {
        let oauth = Arc::new(OauthClient::new(
            reqwest::Client::new(),
            "id".to_string(),
            "secret".to_string(),
        ));
        BlizzardClient::new(
            reqwest::Client::new(),
            oauth,
            "EU".to_string(),
            "en_GB".to_string(),
        )
    }

    #[test]
    fn test_region_lowercased() {
        assert_eq!(make_client().region(), "eu");
    }

    #[test]
    fn test_namespaces() {
        let client = make_client();
        assert_eq!(client.ns_profile(), "profile-eu");
        assert_eq!(client.ns_dynamic(), "dynamic-eu");
        assert_eq!(client.ns_static(), "static-eu");
    }

    #[test]
    fn test_armory_character_url() {
        let client = make_client();
        assert_eq!(
            client.armory_character_url("stormrage", "thrall"),
            "https://worldofwarcraft.blizzard.com/en-gb/character/eu/stormrage/thrall"
        );
    }

    #[test]
    fn test_armory_guild_url() {
        let client = make_client();
        assert_eq!(
            client.armory_guild_url("stormrage", "the-horde"),
            "https://worldofwarcraft.blizzard.com/en-gb/guild/eu/stormrage/the-horde"
        );
    }

    #[test]
    fn test_extract_connected_realm_id() {
        let href = "https://eu.api.blizzard.com/data/wow/connected-realm/1403?namespace=dynamic-eu";
        assert_eq!(BlizzardClient::extract_connected_realm_id(href), Some(1403));
    }

    #[test]
    fn test_extract_connected_realm_id_no_match() {
        assert_eq!(
            BlizzardClient::extract_connected_realm_id("https://example.com/realm/7"),
            None
        );
    }

    #[test]
    fn test_profile_decodes_partial_payload() {
        let json = r#"{
            "name": "Thrall",
            "level": 80,
            "character_class": {"id": 7, "name": "Shaman"},
            "faction": {"name": "Horde"}
        }"#;
        let profile: CharacterProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Thrall"));
        assert_eq!(profile.level, Some(80));
        assert_eq!(profile.character_class.as_ref().unwrap().id, Some(7));
        assert!(profile.race.is_none());
        assert!(profile.guild.is_none());
    }

    #[test]
    fn test_equipment_decodes_missing_items() {
        let json = r#"{"equipped_item_level": 480}"#;
        let equip: EquipmentSummary = serde_json::from_str(json).unwrap();
        assert_eq!(equip.equipped_item_level, Some(480));
        assert!(equip.equipped_items.is_empty());
    }

    #[test]
    fn test_realm_status_kind_field() {
        let json = r#"{"status": {"type": "UP", "name": "Up"}}"#;
        let cr: ConnectedRealm = serde_json::from_str(json).unwrap();
        assert_eq!(cr.status.unwrap().kind.as_deref(), Some("UP"));
    }
}
