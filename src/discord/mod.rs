//! Discord presentation layer: bot wiring, slash commands, embeds.

pub mod bot;
pub mod commands;
pub mod embeds;

pub use bot::build_client;
