//! Environment variable loading for configuration.
//!
//! Required:
//! - `DISCORD_TOKEN` - Discord bot token
//! - `BLIZZARD_CLIENT_ID` - Battle.net OAuth client id
//! - `BLIZZARD_CLIENT_SECRET` - Battle.net OAuth client secret
//!
//! Optional:
//! - `WOW_REGION` - API region (default "eu")
//! - `WOW_LOCALE` - locale for localized names (default "en_GB")
//! - `DISCORD_GUILD_ID` - guild to sync slash commands to (default global)

use std::env;

use crate::common::error::{ConfigError, ConfigResult};
use crate::config::types::{BlizzardConfig, Config, DiscordConfig, WowConfig};

const DEFAULT_REGION: &str = "eu";
const DEFAULT_LOCALE: &str = "en_GB";

/// Load configuration from the environment.
///
/// Collects every missing required variable before failing so the
/// operator learns about all of them in one pass.
pub fn load_from_env() -> ConfigResult<Config> {
    let mut missing: Vec<&str> = Vec::new();

    let mut must = |name: &'static str| -> String {
        match env::var(name) {
            Ok(v) if !v.is_empty() => v,
            _ => {
                missing.push(name);
                String::new()
            }
        }
    };

    let token = must("DISCORD_TOKEN");
    let client_id = must("BLIZZARD_CLIENT_ID");
    let client_secret = must("BLIZZARD_CLIENT_SECRET");

    if !missing.is_empty() {
        return Err(ConfigError::MissingVars {
            names: missing.join(", "),
        });
    }

    let guild_id = match env::var("DISCORD_GUILD_ID") {
        Ok(v) if !v.is_empty() => {
            Some(v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "DISCORD_GUILD_ID".to_string(),
                message: format!("expected a numeric guild id, got '{v}'"),
            })?)
        }
        _ => None,
    };

    Ok(Config {
        discord: DiscordConfig { token, guild_id },
        blizzard: BlizzardConfig {
            client_id,
            client_secret,
        },
        wow: WowConfig {
            region: env::var("WOW_REGION")
                .unwrap_or_else(|_| DEFAULT_REGION.to_string())
                .to_lowercase(),
            locale: env::var("WOW_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string()),
        },
    })
}
