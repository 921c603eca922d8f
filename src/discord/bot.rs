//! Discord bot setup and event handling.

use std::sync::Arc;

use serenity::all::{
    Command, Context, EventHandler, GatewayIntents, GuildId, Interaction, Ready,
};
use serenity::async_trait;
use serenity::Client;
use tracing::{error, info};

use crate::config::Config;
use crate::discord::commands;
use crate::services::Services;

/// Discord event handler; owns the shared service layer.
pub struct Handler {
    services: Arc<Services>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        // Guild-scoped registration propagates instantly, global takes up
        // to an hour; configure a dev guild while iterating.
        let result = match self.guild_id {
            Some(guild_id) => {
                info!("Registering slash commands in guild {}", guild_id);
                guild_id
                    .set_commands(&ctx.http, commands::definitions())
                    .await
            }
            None => {
                info!("Registering slash commands globally");
                Command::set_global_commands(&ctx.http, commands::definitions()).await
            }
        };

        match result {
            Ok(registered) => info!("Registered {} slash commands", registered.len()),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(cmd) = interaction {
            commands::dispatch(&ctx, &cmd, &self.services).await;
        }
    }
}

/// Build the serenity client. Slash commands need no privileged intents.
pub async fn build_client(config: &Config, services: Arc<Services>) -> serenity::Result<Client> {
    let handler = Handler {
        services,
        guild_id: config.discord.guild_id.map(GuildId::new),
    };

    Client::builder(&config.discord.token, GatewayIntents::empty())
        .event_handler(handler)
        .await
}
