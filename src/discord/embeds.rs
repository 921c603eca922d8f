//! Embed construction for command replies.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

use crate::services::{CharacterOverview, RosterSummary, PLACEHOLDER};

/// Class-colored embed accent for the 13 playable classes, the colors the
/// game itself uses. Unknown classes fall back to blurple.
pub fn class_colour(class_id: Option<i64>) -> Colour {
    match class_id {
        Some(1) => Colour::from_rgb(198, 155, 109),  // Warrior
        Some(2) => Colour::from_rgb(244, 140, 186),  // Paladin
        Some(3) => Colour::from_rgb(170, 211, 114),  // Hunter
        Some(4) => Colour::from_rgb(255, 244, 104),  // Rogue
        Some(5) => Colour::from_rgb(255, 255, 255),  // Priest
        Some(6) => Colour::from_rgb(196, 30, 58),    // Death Knight
        Some(7) => Colour::from_rgb(0, 112, 222),    // Shaman
        Some(8) => Colour::from_rgb(63, 199, 235),   // Mage
        Some(9) => Colour::from_rgb(135, 136, 238),  // Warlock
        Some(10) => Colour::from_rgb(0, 255, 152),   // Monk
        Some(11) => Colour::from_rgb(255, 125, 10),  // Druid
        Some(12) => Colour::from_rgb(163, 48, 201),  // Demon Hunter
        Some(13) => Colour::from_rgb(51, 147, 127),  // Evoker
        _ => Colour::BLURPLE,
    }
}

pub fn character_embed(overview: &CharacterOverview, display_realm: &str) -> CreateEmbed {
    let mut desc_lines = vec![format!("**Faction:** {}", overview.faction)];
    if let Some(guild) = &overview.guild {
        desc_lines.push(format!("**Guild:** {guild}"));
    }
    desc_lines.push(format!("🔗 [View on the Armory]({})", overview.armory_url));

    let mut embed = CreateEmbed::new()
        .title(format!(
            "{} — {} ({})",
            overview.name,
            display_realm,
            overview.region.to_uppercase()
        ))
        .description(desc_lines.join("\n"))
        .colour(class_colour(overview.class_id))
        .field("Level", overview.level.as_str(), true)
        .field("Class", overview.class_name.as_str(), true)
        .field("Race", overview.race.as_str(), true);

    if let Some(spec) = &overview.spec {
        embed = embed.field("Spec", spec.as_str(), true);
    }
    embed = embed.field("Item Level", overview.item_level.as_str(), true);

    embed = embed.field(
        "Mythic+ (Raider.IO)",
        mythic_plus_block(overview),
        false,
    );
    embed = embed.field(
        "Raid Progress (Raider.IO)",
        lines_or_placeholder(&overview.raid_progress_lines),
        false,
    );

    if let Some(url) = &overview.thumbnail_url {
        embed = embed.thumbnail(url.as_str());
    }

    embed
}

pub fn realm_status_embed(display_realm: &str, region: &str, status_text: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!(
            "Realm status: {} ({})",
            display_realm,
            region.to_uppercase()
        ))
        .field("Status", status_text, false)
}

pub fn guild_embed(
    guild_name: &str,
    display_realm: &str,
    region: &str,
    summary: &RosterSummary,
    armory_url: &str,
) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!(
            "{} — {} ({})",
            guild_name,
            display_realm,
            region.to_uppercase()
        ))
        .description(format!(
            "👥 **Members:** {}\n🔗 [View on the Armory]({})",
            summary.total, armory_url
        ))
        .colour(class_colour(summary.dominant_class_id))
        .field(
            "Top levels (10)",
            lines_or_placeholder(&top_level_lines(summary)),
            false,
        )
        .field(
            "Classes (top 10)",
            lines_or_placeholder(&class_count_lines(summary)),
            false,
        )
        .footer(CreateEmbedFooter::new(
            "Source: guild roster · cached 5 min",
        ))
}

pub fn top_ilvl_embed(
    guild_name: &str,
    display_realm: &str,
    ranked: &[(String, i64)],
    armory_url: &str,
    sampled: usize,
) -> CreateEmbed {
    let lines: Vec<String> = ranked
        .iter()
        .enumerate()
        .map(|(i, (name, ilvl))| format!("**{}. {}** — {}", i + 1, name, ilvl))
        .collect();

    CreateEmbed::new()
        .title(format!("Top item level — {guild_name} ({display_realm})"))
        .description(format!(
            "🔗 [View on the Armory]({})\n\n{}",
            armory_url,
            lines.join("\n")
        ))
        .footer(CreateEmbedFooter::new(format!(
            "Sampled {sampled} members · item level cached 2h"
        )))
}

// ---------------------------------------------------------------------------
// Line builders, split out so they stay testable
// ---------------------------------------------------------------------------

fn mythic_plus_block(overview: &CharacterOverview) -> String {
    let mut block = format!("**Score:** {}", overview.mythic_plus.score);
    if !overview.mythic_plus.top_runs.is_empty() {
        block.push('\n');
        block.push_str(&overview.mythic_plus.top_runs.join("\n"));
    }
    block
}

fn top_level_lines(summary: &RosterSummary) -> Vec<String> {
    summary
        .top_by_level
        .iter()
        .map(|m| {
            let name = m.name.as_deref().unwrap_or("?");
            let class = m.class_name.as_deref().unwrap_or(PLACEHOLDER);
            format!("**{name}** — {} ({class})", m.level)
        })
        .collect()
}

fn class_count_lines(summary: &RosterSummary) -> Vec<String> {
    summary
        .class_counts
        .iter()
        .take(10)
        .map(|(name, count)| format!("{name}: **{count}**"))
        .collect()
}

fn lines_or_placeholder(lines: &[String]) -> String {
    if lines.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    }
}
