#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_github_login, validate_non_empty_string, validate_url, Validate,
};
use ini::{Ini, ParseOption};
use regex::Regex;
use std::fmt;
use std::path::Path;

pub const STEAM_CONFIG_FILE: &str = "steam.ini";
pub const GITHUB_CONFIG_FILE: &str = "config.ini";
pub const TOKEN_CACHE_FILE: &str = "hangouts_cached_token";

pub const DEFAULT_STEAM_ENDPOINT: &str = "https://api.steampowered.com";
pub const DEFAULT_HANGOUTS_ENDPOINT: &str = "https://chat.googleapis.com/v1";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// A parsed INI file that remembers where it came from, so missing keys can
/// be reported as `[section] key in <file>`.
pub struct IniFile {
    file: String,
    ini: Ini,
}

impl IniFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = path.display().to_string();
        tracing::debug!("Using config file: {}", file);

        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigParse {
            file: file.clone(),
            message: format!("cannot read file: {}", e),
        })?;
        Self::parse(&file, &content)
    }

    pub fn parse(file: &str, content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        // Backslashes are literal: secrets may contain `\t` or `\n`.
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(&content, options).map_err(|e| AppError::ConfigParse {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            file: file.to_string(),
            ini,
        })
    }

    /// Keys match case-insensitively, so `Client_ID` resolves as `client_id`.
    pub fn optional(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .section(Some(section))
            .and_then(|props| {
                props
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
                    .map(|(_, value)| value)
            })
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, section: &str, key: &str) -> Result<String> {
        self.optional(section, key)
            .ok_or_else(|| self.missing(section, key))
    }

    pub fn missing(&self, section: &str, key: &str) -> AppError {
        AppError::MissingConfig {
            file: self.file.clone(),
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

/// Replaces `${NAME}` with the environment variable; unset names stay as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigParse {
        file: "<env substitution>".to_string(),
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[derive(Clone)]
pub struct HangoutsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub endpoint: String,
}

impl fmt::Debug for HangoutsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HangoutsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct SteamConfig {
    pub api_key: Option<String>,
    pub steam_id: Option<String>,
    pub endpoint: String,
}

impl fmt::Debug for SteamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("steam_id", &self.steam_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Contents of `steam.ini`.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub hangouts: HangoutsConfig,
    pub steam: SteamConfig,
}

impl NotifierConfig {
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::from_ini(&IniFile::load(&config_dir.join(STEAM_CONFIG_FILE))?)
    }

    pub fn from_ini(ini: &IniFile) -> Result<Self> {
        let hangouts = HangoutsConfig {
            client_id: ini.required("Hangouts", "client_id")?,
            client_secret: ini.required("Hangouts", "client_secret")?,
            endpoint: ini
                .optional("Hangouts", "endpoint")
                .unwrap_or_else(|| DEFAULT_HANGOUTS_ENDPOINT.to_string()),
        };
        let steam = SteamConfig {
            api_key: ini.optional("Steam", "api_key"),
            steam_id: ini.optional("Steam", "steam_id"),
            endpoint: ini
                .optional("Steam", "endpoint")
                .unwrap_or_else(|| DEFAULT_STEAM_ENDPOINT.to_string()),
        };

        let config = Self { hangouts, steam };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for NotifierConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("Hangouts.client_id", &self.hangouts.client_id)?;
        validate_non_empty_string("Hangouts.client_secret", &self.hangouts.client_secret)?;
        validate_url("Hangouts.endpoint", &self.hangouts.endpoint)?;
        validate_url("Steam.endpoint", &self.steam.endpoint)?;
        Ok(())
    }
}

/// Contents of `config.ini` for the star sync.
#[derive(Clone)]
pub struct GithubConfig {
    pub oauth_token: String,
    pub target_username: String,
    pub api_base_url: String,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("oauth_token", &"<redacted>")
            .field("target_username", &self.target_username)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl GithubConfig {
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::from_ini(&IniFile::load(&config_dir.join(GITHUB_CONFIG_FILE))?)
    }

    pub fn from_ini(ini: &IniFile) -> Result<Self> {
        let config = Self {
            oauth_token: ini.required("General", "oauth_token")?,
            target_username: ini.required("General", "target_username")?,
            api_base_url: ini
                .optional("General", "api_base_url")
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for GithubConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("General.oauth_token", &self.oauth_token)?;
        validate_github_login("General.target_username", &self.target_username)?;
        validate_url("General.api_base_url", &self.api_base_url)?;
        Ok(())
    }
}
