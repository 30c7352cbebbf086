use crate::adapters::http::build_client;
use crate::adapters::{HangoutsSink, SteamClient, TokenCache};
use crate::config::cli::NotifyArgs;
use crate::config::{NotifierConfig, STEAM_CONFIG_FILE, TOKEN_CACHE_FILE};
use crate::core::notifier::StatusNotifier;
use crate::core::NotifyResult;
use crate::utils::error::{AppError, Result};
use std::path::Path;

/// One notifier run: load `steam.ini`, resolve the Steam credentials (flags
/// first, then `[Steam]`), and check-and-notify through Hangouts.
pub async fn run(args: &NotifyArgs, config_dir: &Path, cache_dir: &Path) -> Result<NotifyResult> {
    let config = NotifierConfig::load(config_dir)?;
    tracing::debug!("Loaded {:?}", config);

    let config_file = config_dir.join(STEAM_CONFIG_FILE).display().to_string();
    let missing = |key: &str| AppError::MissingConfig {
        file: config_file.clone(),
        section: "Steam".to_string(),
        key: key.to_string(),
    };
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.steam.api_key.clone())
        .ok_or_else(|| missing("api_key"))?;
    let steam_id = args
        .steam_id
        .clone()
        .or_else(|| config.steam.steam_id.clone())
        .ok_or_else(|| missing("steam_id"))?;

    let token_cache = TokenCache::open(cache_dir.join(TOKEN_CACHE_FILE))?;
    let client = build_client(args.http_timeout()?)?;

    let steam = SteamClient::new(client.clone(), config.steam.endpoint.clone());
    let mut sink = HangoutsSink::new(client, config.hangouts.clone(), token_cache);

    StatusNotifier::new(steam)
        .with_roster_wait(args.roster_wait())
        .with_status_error_policy(args.status_error_policy())
        .check_and_notify(&api_key, &steam_id, &mut sink)
        .await
}
