use crate::core::notifier::{RosterWait, StatusErrorPolicy};
use crate::core::star_sync::FailurePolicy;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_positive_number;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "gitgatgotya";

#[derive(Debug, Clone, Parser)]
#[command(name = "gitgatgotya")]
#[command(about = "Sends a message via Hangouts if the Steam friend is currently playing a game.")]
pub struct NotifyArgs {
    /// Directory containing steam.ini. Defaults to the XDG config dir.
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Directory for logs and the cached Hangouts token. Defaults to the XDG cache dir.
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// SteamID of the user to check. Falls back to [Steam] steam_id.
    #[arg(short = 'i', long)]
    pub steam_id: Option<String>,

    /// Steam Web API key. Falls back to [Steam] api_key.
    #[arg(short = 'k', long, env = "STEAM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Treat a failed status query as "not playing" instead of an error.
    #[arg(long)]
    pub treat_status_errors_as_idle: bool,

    /// Seconds to wait after connecting before the roster is checked.
    #[arg(long, default_value = "5")]
    pub roster_wait: u64,

    /// Seconds to keep polling an empty roster before giving up.
    #[arg(long, default_value = "30")]
    pub roster_timeout: u64,

    /// Per-request HTTP timeout in seconds. No timeout when omitted.
    #[arg(long)]
    pub http_timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose console output")]
    pub verbose: bool,
}

impl NotifyArgs {
    pub fn config_dir(&self) -> Result<PathBuf> {
        let dir = self.config_path.clone().unwrap_or_else(default_config_dir);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let dir = self.cache_path.clone().unwrap_or_else(default_cache_dir);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn status_error_policy(&self) -> StatusErrorPolicy {
        if self.treat_status_errors_as_idle {
            StatusErrorPolicy::TreatAsIdle
        } else {
            StatusErrorPolicy::Fail
        }
    }

    pub fn roster_wait(&self) -> RosterWait {
        RosterWait::new(
            Duration::from_secs(self.roster_wait),
            Duration::from_secs(self.roster_timeout),
        )
    }

    pub fn http_timeout(&self) -> Result<Option<Duration>> {
        http_timeout(self.http_timeout)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "star-sync")]
#[command(about = "Stars on your GitHub account every repository the target user has starred.")]
pub struct SyncArgs {
    /// Directory containing config.ini. Must exist.
    #[arg(short, long, alias = "config_path")]
    pub config_path: Option<PathBuf>,

    /// Directory for logs. Defaults to the XDG cache dir.
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// What to do when starring a single repository fails.
    #[arg(long, value_enum, default_value_t = FailurePolicy::Continue)]
    pub on_failure: FailurePolicy,

    /// Show what would be starred without starring anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Per-request HTTP timeout in seconds. No timeout when omitted.
    #[arg(long)]
    pub http_timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose console output")]
    pub verbose: bool,
}

impl SyncArgs {
    pub fn config_dir(&self) -> Result<PathBuf> {
        let dir = self.config_path.clone().unwrap_or_else(legacy_config_dir);
        if !dir.is_dir() {
            return Err(AppError::InvalidConfigValue {
                field: "config_path".to_string(),
                value: dir.display().to_string(),
                reason: "Directory does not exist".to_string(),
            });
        }
        Ok(dir)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let dir = self.cache_path.clone().unwrap_or_else(default_cache_dir);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn http_timeout(&self) -> Result<Option<Duration>> {
        http_timeout(self.http_timeout)
    }
}

fn http_timeout(seconds: Option<u64>) -> Result<Option<Duration>> {
    match seconds {
        Some(secs) => {
            validate_positive_number("http_timeout", secs, 1)?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_NAME)
}

pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(APP_NAME)
}

/// `~/.config/gitgatgotya`, regardless of `XDG_CONFIG_HOME`.
pub fn legacy_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_NAME)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        tracing::debug!("Creating directory {}", dir.display());
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_notify_args_parse() {
        let args = NotifyArgs::try_parse_from([
            "gitgatgotya",
            "-i",
            "76561197960435530",
            "-k",
            "KEY",
            "--treat-status-errors-as-idle",
            "--roster-wait",
            "2",
            "--roster-timeout",
            "7",
        ])
        .unwrap();

        assert_eq!(args.steam_id.as_deref(), Some("76561197960435530"));
        assert_eq!(args.api_key.as_deref(), Some("KEY"));
        assert_eq!(args.status_error_policy(), StatusErrorPolicy::TreatAsIdle);
        assert_eq!(args.roster_wait().settle, Duration::from_secs(2));
        assert_eq!(args.roster_wait().timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_notify_args_create_dirs() {
        let root = TempDir::new().unwrap();
        let config = root.path().join("cfg/nested");
        let cache = root.path().join("cache");
        let args = NotifyArgs::try_parse_from([
            "gitgatgotya",
            "--config-path",
            config.to_str().unwrap(),
            "--cache-path",
            cache.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(args.config_dir().unwrap(), config);
        assert_eq!(args.cache_dir().unwrap(), cache);
        assert!(config.is_dir());
        assert!(cache.is_dir());
    }

    #[test]
    fn test_sync_args_require_existing_config_dir() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing");
        let args =
            SyncArgs::try_parse_from(["star-sync", "-c", missing.to_str().unwrap()]).unwrap();

        assert!(args.config_dir().is_err());
        assert_eq!(args.on_failure, FailurePolicy::Continue);
    }

    #[test]
    fn test_sync_args_failure_policy() {
        let args = SyncArgs::try_parse_from(["star-sync", "--on-failure", "abort", "--dry-run"])
            .unwrap();
        assert_eq!(args.on_failure, FailurePolicy::Abort);
        assert!(args.dry_run);
    }

    #[test]
    fn test_zero_http_timeout_rejected() {
        let args = SyncArgs::try_parse_from(["star-sync", "--http-timeout", "0"]).unwrap();
        assert!(args.http_timeout().is_err());
    }
}
