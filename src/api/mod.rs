//! Typed clients for the upstream REST APIs.

pub mod blizzard;
pub mod oauth;
pub mod raiderio;

pub use blizzard::BlizzardClient;
pub use oauth::OauthClient;
pub use raiderio::RaiderIoClient;
