//! Slash command definitions and handlers.
//!
//! Every handler defers first (upstream calls routinely take seconds),
//! then follows up with an embed or a user-visible error. Command
//! failures never crash the process.

use rand::seq::SliceRandom;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponseFollowup, ResolvedOption, ResolvedValue,
};
use tracing::{error, info, warn};

use crate::common::error::ApiError;
use crate::common::text::{normalize_character_name, normalize_guild_slug, normalize_realm_slug};
use crate::discord::embeds;
use crate::services::Services;

/// Candidate pool for /guild_top_ilvl: the top of the roster by level,
/// padded with a random sample so alts get a look-in.
const POOL_TOP_BY_LEVEL: usize = 80;
const POOL_RANDOM_TAIL: usize = 40;

/// Hard cap on equipment lookups per invocation. Deliberately sequential
/// and bounded so one command cannot trip the upstream rate limit.
const MAX_ILVL_FETCHES: usize = 30;

const DEFAULT_TOP_ILVL_LIMIT: i64 = 10;
const MAX_TOP_ILVL_LIMIT: i64 = 20;

/// All slash commands this bot registers.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("character")
            .description("Level, class, race, spec, guild, item level, M+ and raid progress.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Character name")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "realm", "Realm name")
                    .required(true),
            ),
        CreateCommand::new("status")
            .description("Approximate status of a realm.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "realm", "Realm name")
                    .required(true),
            ),
        CreateCommand::new("guild")
            .description("Guild summary: members, top levels and class distribution.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Guild name")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "realm", "Realm name")
                    .required(true),
            ),
        CreateCommand::new("guild_top_ilvl")
            .description("Top item levels in a guild (cached, call-capped to avoid rate limits).")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Guild name")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "realm", "Realm name")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "How many characters to show (max 20)",
                )
                .min_int_value(1)
                .max_int_value(MAX_TOP_ILVL_LIMIT as u64),
            ),
    ]
}

/// Route an interaction to its handler.
pub async fn dispatch(ctx: &Context, cmd: &CommandInteraction, services: &Services) {
    let result = match cmd.data.name.as_str() {
        "character" => handle_character(ctx, cmd, services).await,
        "status" => handle_status(ctx, cmd, services).await,
        "guild" => handle_guild(ctx, cmd, services).await,
        "guild_top_ilvl" => handle_guild_top_ilvl(ctx, cmd, services).await,
        other => {
            warn!("Unknown command: {}", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Command '{}' failed to reply: {}", cmd.data.name, e);
    }
}

async fn handle_character(
    ctx: &Context,
    cmd: &CommandInteraction,
    services: &Services,
) -> serenity::Result<()> {
    cmd.defer(&ctx.http).await?;

    let options = cmd.data.options();
    let name = str_option(&options, "name").unwrap_or_default();
    let realm = str_option(&options, "realm").unwrap_or_default();
    info!("/character {} {} from {}", name, realm, cmd.user.name);

    let realm_slug = normalize_realm_slug(realm);
    let char_name = normalize_character_name(name);

    match services
        .characters
        .character_overview(&realm_slug, &char_name)
        .await
    {
        Ok(overview) => {
            let embed = embeds::character_embed(&overview, realm);
            followup_embed(ctx, cmd, embed).await
        }
        Err(ApiError::NotFound) => {
            followup_error(
                ctx,
                cmd,
                &format!(
                    "Can't find **{}** on **{}** ({}).",
                    name,
                    realm,
                    services.region().to_uppercase()
                ),
            )
            .await
        }
        Err(e) => followup_api_error(ctx, cmd, &e).await,
    }
}

async fn handle_status(
    ctx: &Context,
    cmd: &CommandInteraction,
    services: &Services,
) -> serenity::Result<()> {
    cmd.defer(&ctx.http).await?;

    let options = cmd.data.options();
    let realm = str_option(&options, "realm").unwrap_or_default();
    info!("/status {} from {}", realm, cmd.user.name);

    let realm_slug = normalize_realm_slug(realm);

    match services.realms.realm_status_text(&realm_slug).await {
        Ok(status_text) => {
            let embed = embeds::realm_status_embed(realm, services.region(), &status_text);
            followup_embed(ctx, cmd, embed).await
        }
        Err(ApiError::NotFound) => {
            followup_error(
                ctx,
                cmd,
                &format!(
                    "Can't find realm **{}** in {}.",
                    realm,
                    services.region().to_uppercase()
                ),
            )
            .await
        }
        Err(e) => followup_api_error(ctx, cmd, &e).await,
    }
}

async fn handle_guild(
    ctx: &Context,
    cmd: &CommandInteraction,
    services: &Services,
) -> serenity::Result<()> {
    cmd.defer(&ctx.http).await?;

    let options = cmd.data.options();
    let name = str_option(&options, "name").unwrap_or_default();
    let realm = str_option(&options, "realm").unwrap_or_default();
    info!("/guild {} {} from {}", name, realm, cmd.user.name);

    let realm_slug = normalize_realm_slug(realm);
    let guild_slug = normalize_guild_slug(name);

    let summary = async {
        let roster = services.guilds.guild_roster(&realm_slug, &guild_slug).await?;
        services.guilds.summarize_roster(&roster).await
    }
    .await;

    match summary {
        Ok(summary) => {
            let armory_url = services.guilds.armory_guild_url(&realm_slug, &guild_slug);
            let embed =
                embeds::guild_embed(name, realm, services.region(), &summary, &armory_url);
            followup_embed(ctx, cmd, embed).await
        }
        Err(ApiError::NotFound) => {
            followup_error(
                ctx,
                cmd,
                &format!(
                    "Can't find guild **{}** on **{}** ({}).",
                    name,
                    realm,
                    services.region().to_uppercase()
                ),
            )
            .await
        }
        Err(e) => followup_api_error(ctx, cmd, &e).await,
    }
}

async fn handle_guild_top_ilvl(
    ctx: &Context,
    cmd: &CommandInteraction,
    services: &Services,
) -> serenity::Result<()> {
    cmd.defer(&ctx.http).await?;

    let options = cmd.data.options();
    let name = str_option(&options, "name").unwrap_or_default();
    let realm = str_option(&options, "realm").unwrap_or_default();
    let limit = int_option(&options, "limit")
        .unwrap_or(DEFAULT_TOP_ILVL_LIMIT)
        .clamp(1, MAX_TOP_ILVL_LIMIT) as usize;
    info!(
        "/guild_top_ilvl {} {} limit={} from {}",
        name, realm, limit, cmd.user.name
    );

    let realm_slug = normalize_realm_slug(realm);
    let guild_slug = normalize_guild_slug(name);

    let roster = match services.guilds.guild_roster(&realm_slug, &guild_slug).await {
        Ok(roster) => roster,
        Err(ApiError::NotFound) => {
            return followup_error(
                ctx,
                cmd,
                &format!(
                    "Can't find guild **{}** on **{}** ({}).",
                    name,
                    realm,
                    services.region().to_uppercase()
                ),
            )
            .await
        }
        Err(e) => return followup_api_error(ctx, cmd, &e).await,
    };

    // Nameless members count in the summary, but an equipment lookup
    // needs a name.
    let members: Vec<(String, i64)> = crate::services::guild::parse_members(&roster)
        .into_iter()
        .filter_map(|m| m.name.map(|name| (name, m.level)))
        .collect();

    if members.is_empty() {
        return followup_error(ctx, cmd, "Couldn't read any members from the roster.").await;
    }

    let pool = select_candidates(members, &mut rand::thread_rng());
    let sampled = pool.len();

    // Sequential on purpose: up to 30 equipment calls in a row is already
    // pushing our luck with the upstream limiter.
    let mut results: Vec<(String, i64)> = Vec::new();
    for member_name in pool {
        match services.ilvl.equipped_item_level(&realm_slug, &member_name).await {
            Ok(Some(ilvl)) => results.push((member_name, ilvl)),
            Ok(None) => {}
            Err(ApiError::RateLimited { .. }) => {
                warn!("Rate limited mid-pool; keeping partial results");
                break;
            }
            Err(e) => {
                warn!("Item level lookup failed for {}: {}", member_name, e);
            }
        }
    }

    if results.is_empty() {
        return followup_error(
            ctx,
            cmd,
            "Couldn't compute item levels (possibly privacy settings or a rate limit).",
        )
        .await;
    }

    results.sort_by_key(|(_, ilvl)| std::cmp::Reverse(*ilvl));
    results.truncate(limit);

    let armory_url = services.guilds.armory_guild_url(&realm_slug, &guild_slug);
    let embed = embeds::top_ilvl_embed(name, realm, &results, &armory_url, sampled);
    followup_embed(ctx, cmd, embed).await
}

/// Pick which roster members get an equipment lookup: everyone sorted by
/// level descending, top slice kept, a shuffled sample of the rest
/// appended, the whole thing capped at the fetch budget.
fn select_candidates<R: rand::Rng>(
    mut members: Vec<(String, i64)>,
    rng: &mut R,
) -> Vec<String> {
    members.sort_by_key(|(_, level)| std::cmp::Reverse(*level));

    let split = members.len().min(POOL_TOP_BY_LEVEL);
    let mut tail: Vec<(String, i64)> = members.split_off(split);
    tail.shuffle(rng);

    members.extend(tail.into_iter().take(POOL_RANDOM_TAIL));
    members.truncate(MAX_ILVL_FETCHES);
    members.into_iter().map(|(name, _)| name).collect()
}

// ---------------------------------------------------------------------------
// Option and reply helpers
// ---------------------------------------------------------------------------

fn str_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find(|o| o.name == name).and_then(|o| {
        if let ResolvedValue::String(s) = &o.value {
            Some(*s)
        } else {
            None
        }
    })
}

fn int_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find(|o| o.name == name).and_then(|o| {
        if let ResolvedValue::Integer(i) = &o.value {
            Some(*i)
        } else {
            None
        }
    })
}

async fn followup_embed(
    ctx: &Context,
    cmd: &CommandInteraction,
    embed: serenity::all::CreateEmbed,
) -> serenity::Result<()> {
    cmd.create_followup(
        &ctx.http,
        CreateInteractionResponseFollowup::new().embed(embed),
    )
    .await?;
    Ok(())
}

async fn followup_error(
    ctx: &Context,
    cmd: &CommandInteraction,
    message: &str,
) -> serenity::Result<()> {
    cmd.create_followup(
        &ctx.http,
        CreateInteractionResponseFollowup::new()
            .content(message)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

async fn followup_api_error(
    ctx: &Context,
    cmd: &CommandInteraction,
    err: &ApiError,
) -> serenity::Result<()> {
    let message = match err {
        ApiError::RateLimited { .. } => {
            "The API is rate limiting (429). Try again in 1-2 minutes.".to_string()
        }
        other => format!("The API returned an error.\n`{other}`"),
    };
    followup_error(ctx, cmd, &message).await
}
