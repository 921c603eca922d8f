//! Realm status lookup.
//!
//! Status lives on the connected realm, not the realm itself: slug ->
//! realm index entry -> realm detail -> connected-realm href -> status.

use std::sync::Arc;

use crate::api::blizzard::BlizzardClient;
use crate::common::error::{ApiError, ApiResult};

const UNKNOWN: &str = "Unknown";

pub struct RealmService {
    blizzard: Arc<BlizzardClient>,
}

impl RealmService {
    pub fn new(blizzard: Arc<BlizzardClient>) -> Self {
        Self { blizzard }
    }

    pub fn region(&self) -> &str {
        self.blizzard.region()
    }

    /// Display text for a realm's status. `NotFound` when the slug is not
    /// in the realm index.
    pub async fn realm_status_text(&self, realm_slug: &str) -> ApiResult<String> {
        let index = self.blizzard.realm_index().await?;

        let realm = index
            .realms
            .iter()
            .find(|r| r.slug.as_deref() == Some(realm_slug))
            .ok_or(ApiError::NotFound)?;
        let realm_id = realm.id.ok_or(ApiError::NotFound)?;

        let detail = self.blizzard.realm_by_id(realm_id).await?;
        let Some(href) = detail.connected_realm.and_then(|link| link.href) else {
            return Ok(UNKNOWN.to_string());
        };
        let Some(connected_id) = BlizzardClient::extract_connected_realm_id(&href) else {
            return Ok(UNKNOWN.to_string());
        };

        let connected = self.blizzard.connected_realm(connected_id).await?;
        let kind = connected.status.and_then(|s| s.kind);

        Ok(status_display(kind.as_deref()))
    }
}

fn status_display(kind: Option<&str>) -> String {
    match kind {
        Some("UP") => "Online ✅".to_string(),
        Some("DOWN") => "Offline ❌".to_string(),
        Some(other) => other.to_string(),
        None => UNKNOWN.to_string(),
    }
}
