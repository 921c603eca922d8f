//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::{ConfigError, ConfigResult};
use crate::config::types::Config;

const KNOWN_REGIONS: [&str; 4] = ["eu", "us", "kr", "tw"];

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    let mut errors = Vec::new();

    if config.discord.token.is_empty() {
        errors.push("DISCORD_TOKEN is required".to_string());
    }
    if config.blizzard.client_id.is_empty() {
        errors.push("BLIZZARD_CLIENT_ID is required".to_string());
    }
    if config.blizzard.client_secret.is_empty() {
        errors.push("BLIZZARD_CLIENT_SECRET is required".to_string());
    }

    // Serenity's GuildId rejects zero ids; catch it here with a readable
    // message instead of at connect time.
    if config.discord.guild_id == Some(0) {
        errors.push("DISCORD_GUILD_ID must be a non-zero guild id".to_string());
    }

    if !KNOWN_REGIONS.contains(&config.wow.region.as_str()) {
        errors.push(format!(
            "WOW_REGION '{}' is invalid (use: {})",
            config.wow.region,
            KNOWN_REGIONS.join(", ")
        ));
    }

    // Locales look like "en_GB" / "es_ES"
    let locale = &config.wow.locale;
    if locale.len() != 5 || locale.as_bytes().get(2) != Some(&b'_') {
        errors.push(format!(
            "WOW_LOCALE '{}' is invalid (expected form 'en_GB')",
            locale
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                guild_id: Some(123456789),
            },
            blizzard: BlizzardConfig {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
            },
            wow: WowConfig {
                region: "eu".to_string(),
                locale: "en_GB".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn test_zero_guild_id_fails() {
        let mut config = make_valid_config();
        config.discord.guild_id = Some(0);

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("DISCORD_GUILD_ID"));
    }

    #[test]
    fn test_unknown_region_fails() {
        let mut config = make_valid_config();
        config.wow.region = "moon".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("WOW_REGION"));
    }

    #[test]
    fn test_malformed_locale_fails() {
        let mut config = make_valid_config();
        config.wow.locale = "english".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("WOW_LOCALE"));
    }

    #[test]
    fn test_multiple_errors_joined() {
        let mut config = make_valid_config();
        config.discord.token = String::new();
        config.wow.region = "moon".to_string();

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("DISCORD_TOKEN"));
        assert!(msg.contains("WOW_REGION"));
    }
}
