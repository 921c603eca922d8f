//! Client-credentials OAuth for Battle.net.
//!
//! The game-data API wants a bearer token obtained via the client
//! credentials grant. Tokens live for a day or so; we cache one per
//! process and refresh slightly early so an in-flight request never
//! carries a token that expires mid-call.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::error::{ApiError, ApiResult};

const TOKEN_URL: &str = "https://oauth.battle.net/token";

/// Refresh the token when it is this close to expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Obtains and caches a Battle.net bearer token.
///
/// The token lives behind an async mutex, so concurrent callers hitting
/// an expired token serialize on a single refresh instead of stampeding
/// the authorization endpoint.
pub struct OauthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl OauthClient {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    /// Return a valid access token, refreshing if absent or near expiry.
    ///
    /// No retry on failure; the caller surfaces the error and the next
    /// command attempt triggers a fresh token request.
    pub async fn get_access_token(&self) -> ApiResult<String> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting new OAuth access token");
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(ApiError::RateLimited { retry_after: None });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                message: format!("OAuth error {status}: {body}"),
            });
        }

        let parsed: TokenResponse = resp.json().await?;
        let access_token = parsed.access_token.clone();

        *slot = Some(CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        });

        Ok(access_token)
    }
}
