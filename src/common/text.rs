//! Input normalization for realm, guild and character names.
//!
//! Upstream APIs key everything by lowercase slugs; normalizing up front
//! keeps cache keys canonical so "Stormrage" and "stormrage" share a line.

/// Normalize a user-supplied realm name into an API slug.
///
/// Trims, lowercases, strips apostrophes (straight and curly) and turns
/// spaces into hyphens. Idempotent under re-application.
pub fn normalize_realm_slug(realm: &str) -> String {
    realm
        .trim()
        .to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .replace(' ', "-")
}

/// Normalize a character name for API paths and cache keys.
pub fn normalize_character_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a guild name into an API slug. Same rules as realm slugs.
pub fn normalize_guild_slug(name: &str) -> String {
    normalize_realm_slug(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_slug_basic() {
        assert_eq!(normalize_realm_slug("Stormrage"), "stormrage");
    }

    #[test]
    fn test_realm_slug_apostrophe_and_spaces() {
        assert_eq!(
            normalize_realm_slug("Stormrage's Realm"),
            "stormrages-realm"
        );
    }

    #[test]
    fn test_realm_slug_curly_apostrophe() {
        assert_eq!(normalize_realm_slug("Kel\u{2019}Thuzad"), "kelthuzad");
    }

    #[test]
    fn test_realm_slug_idempotent() {
        let once = normalize_realm_slug("Stormrage's Realm");
        assert_eq!(normalize_realm_slug(&once), once);
    }

    #[test]
    fn test_realm_slug_trims_whitespace() {
        assert_eq!(normalize_realm_slug("  Area 52  "), "area-52");
    }

    #[test]
    fn test_character_name() {
        assert_eq!(normalize_character_name("  Thrall "), "thrall");
    }

    #[test]
    fn test_guild_slug() {
        assert_eq!(normalize_guild_slug("The Horde's Finest"), "the-hordes-finest");
    }
}
