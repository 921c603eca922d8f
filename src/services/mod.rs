//! Aggregation services combining upstream calls into domain records.

pub mod character;
pub mod guild;
pub mod ilvl;
pub mod realm;

use std::sync::Arc;

use crate::api::{BlizzardClient, OauthClient, RaiderIoClient};
use crate::config::Config;

pub use character::{CharacterOverview, CharacterService, MythicPlusSummary};
pub use guild::{GuildService, RosterMember, RosterSummary};
pub use ilvl::IlvlService;
pub use realm::RealmService;

/// Display placeholder for unresolved fields; never `null` in output.
pub const PLACEHOLDER: &str = "—";

/// Every service, wired to shared upstream clients. One instance lives
/// for the life of the bot and is shared by all command handlers.
pub struct Services {
    pub characters: CharacterService,
    pub guilds: GuildService,
    pub realms: RealmService,
    pub ilvl: IlvlService,
}

impl Services {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        let oauth = Arc::new(OauthClient::new(
            http.clone(),
            config.blizzard.client_id.clone(),
            config.blizzard.client_secret.clone(),
        ));
        let blizzard = Arc::new(BlizzardClient::new(
            http.clone(),
            oauth,
            config.wow.region.clone(),
            config.wow.locale.clone(),
        ));
        let raiderio = Arc::new(RaiderIoClient::new(http, config.wow.region.clone()));

        Self {
            characters: CharacterService::new(blizzard.clone(), raiderio),
            guilds: GuildService::new(blizzard.clone()),
            realms: RealmService::new(blizzard.clone()),
            ilvl: IlvlService::new(blizzard),
        }
    }

    pub fn region(&self) -> &str {
        self.realms.region()
    }
}
