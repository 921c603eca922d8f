//! Configuration type definitions.

/// Root configuration, assembled from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub blizzard: BlizzardConfig,
    pub wow: WowConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    /// When set, slash commands sync to this guild only (instant updates,
    /// handy for development). Otherwise they register globally.
    pub guild_id: Option<u64>,
}

/// Battle.net API credentials.
#[derive(Debug, Clone)]
pub struct BlizzardConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Game data settings shared by both upstream clients.
#[derive(Debug, Clone)]
pub struct WowConfig {
    /// API region: eu, us, kr, tw.
    pub region: String,
    /// Locale for localized names, e.g. "en_GB".
    pub locale: String,
}
