use crate::adapters::http::{describe, join_url};
use crate::core::{PlayerStatus, StatusProvider};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const SUMMARIES_PATH: &str = "ISteamUser/GetPlayerSummaries/v2/";

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    response: SummariesResponse,
}

#[derive(Debug, Deserialize)]
struct SummariesResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    gameextrainfo: Option<String>,
    personaname: Option<String>,
}

/// Steam Web API status provider backed by `GetPlayerSummaries`.
pub struct SteamClient {
    client: Client,
    endpoint: String,
}

impl SteamClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn summaries_url(&self, api_key: &str, steam_id: &str) -> Result<Url> {
        let mut url = Url::parse(&join_url(&self.endpoint, SUMMARIES_PATH)).map_err(|e| {
            AppError::InvalidConfigValue {
                field: "Steam.endpoint".to_string(),
                value: self.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("format", "json")
            .append_pair("steamids", steam_id);
        Ok(url)
    }
}

#[async_trait]
impl StatusProvider for SteamClient {
    async fn player_status(&self, api_key: &str, subject_id: &str) -> Result<PlayerStatus> {
        let url = self.summaries_url(api_key, subject_id)?;
        tracing::debug!("Querying player summary for {}", subject_id);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::StatusQuery {
                message: describe(e),
            })?;

        let status = response.status();
        tracing::debug!("Steam response status: {}", status);
        if !status.is_success() {
            return Err(AppError::StatusQuery {
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().await.map_err(|e| AppError::StatusQuery {
            message: describe(e),
        })?;
        parse_player_status(&body, subject_id)
    }
}

pub(crate) fn parse_player_status(body: &str, subject_id: &str) -> Result<PlayerStatus> {
    let envelope: SummariesEnvelope =
        serde_json::from_str(body).map_err(|e| AppError::StatusQuery {
            message: format!("malformed response: {}", e),
        })?;

    let player = envelope
        .response
        .players
        .into_iter()
        .next()
        .ok_or_else(|| AppError::StatusQuery {
            message: format!("no player found for {}", subject_id),
        })?;

    Ok(PlayerStatus::new(player.gameextrainfo, player.personaname))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_playing() {
        let status = parse_player_status(
            r#"{"response":{"players":[{"gameextrainfo":"Stardew Valley","personaname":"wyn"}]}}"#,
            "1",
        )
        .unwrap();
        assert!(status.is_playing_game);
        assert_eq!(status.game_name.as_deref(), Some("Stardew Valley"));
        assert_eq!(status.persona_name.as_deref(), Some("wyn"));
    }

    #[test]
    fn test_parse_absent_and_null_game() {
        let absent = parse_player_status(r#"{"response":{"players":[{}]}}"#, "1").unwrap();
        assert!(!absent.is_playing_game);

        let null =
            parse_player_status(r#"{"response":{"players":[{"gameextrainfo":null}]}}"#, "1")
                .unwrap();
        assert!(!null.is_playing_game);
    }

    #[test]
    fn test_parse_unknown_player() {
        let result = parse_player_status(r#"{"response":{"players":[]}}"#, "1");
        assert!(matches!(result, Err(AppError::StatusQuery { .. })));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_player_status("<html>", "1").is_err());
        assert!(parse_player_status(r#"{"players":[]}"#, "1").is_err());
    }

    #[test]
    fn test_summaries_url_carries_query() {
        let client = SteamClient::new(Client::new(), "https://api.steampowered.com");
        let url = client.summaries_url("KEY", "7656").unwrap();
        assert_eq!(url.path(), "/ISteamUser/GetPlayerSummaries/v2/");
        assert_eq!(url.query(), Some("key=KEY&format=json&steamids=7656"));
    }
}
