use crate::adapters::http::build_client;
use crate::adapters::GithubClient;
use crate::config::cli::SyncArgs;
use crate::config::GithubConfig;
use crate::core::star_sync::StarredReposSync;
use crate::core::SyncReport;
use crate::utils::error::Result;
use std::path::Path;

/// One star-sync run against the account that owns `oauth_token`.
pub async fn run(args: &SyncArgs, config_dir: &Path) -> Result<SyncReport> {
    let config = GithubConfig::load(config_dir)?;
    tracing::debug!("Loaded {:?}", config);

    let client = build_client(args.http_timeout()?)?;
    let github = GithubClient::new(client, config.api_base_url.clone(), config.oauth_token.clone());

    StarredReposSync::new(github)
        .with_failure_policy(args.on_failure)
        .with_dry_run(args.dry_run)
        .sync(&config.target_username)
        .await
}
