use crate::adapters::http::{describe, join_url};
use crate::adapters::token_cache::TokenCache;
use crate::config::HangoutsConfig;
use crate::core::{MessagingSink, NotificationMessage};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    #[serde(default)]
    contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Deserialize)]
struct Contact {
    id: String,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    text: &'a str,
}

struct Session {
    access_token: String,
    roster: Option<Vec<Contact>>,
}

/// Hangouts chat client speaking the REST relay contract: token login,
/// roster listing, per-conversation messages and an explicit session close.
pub struct HangoutsSink {
    client: Client,
    config: HangoutsConfig,
    token_cache: TokenCache,
    session: Option<Session>,
}

impl HangoutsSink {
    pub fn new(client: Client, config: HangoutsConfig, token_cache: TokenCache) -> Self {
        Self {
            client,
            config,
            token_cache,
            session: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.endpoint, path)
    }

    /// `conversations/<id>/messages` with the contact id escaped as a single
    /// path segment.
    fn messages_url(&self, contact_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url("conversations")).map_err(|e| AppError::SinkDelivery {
            message: format!("invalid Hangouts endpoint: {}", e),
        })?;
        url.path_segments_mut()
            .map_err(|_| AppError::SinkDelivery {
                message: "Hangouts endpoint cannot carry a path".to_string(),
            })?
            .push(contact_id)
            .push("messages");
        Ok(url)
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| AppError::SinkDelivery {
            message: "not connected".to_string(),
        })
    }

    async fn fetch_roster(&self, access_token: &str) -> Result<Vec<Contact>> {
        let response = self
            .client
            .get(self.url("roster"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::SinkDelivery {
                message: describe(e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::SinkDelivery {
                message: format!("roster request returned HTTP {}", response.status()),
            });
        }

        let roster: RosterResponse = response.json().await.map_err(|e| AppError::SinkDelivery {
            message: format!("malformed roster: {}", describe(e)),
        })?;
        Ok(roster.contacts)
    }

    async fn send_to(&self, access_token: &str, contact: &Contact, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.messages_url(&contact.id)?)
            .bearer_auth(access_token)
            .json(&OutgoingMessage { text })
            .send()
            .await
            .map_err(|e| AppError::SinkDelivery {
                message: describe(e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::SinkDelivery {
                message: format!("HTTP {}", response.status()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingSink for HangoutsSink {
    async fn connect(&mut self) -> Result<()> {
        let cached = self.token_cache.load()?;
        let grant_type = if cached.is_some() {
            "refresh_token"
        } else {
            "client_credentials"
        };
        tracing::debug!("Logging in to Hangouts with {} grant", grant_type);

        let request = TokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            grant_type,
            refresh_token: cached.as_deref(),
        };

        let response = self
            .client
            .post(self.url("oauth/token"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SinkConnect {
                message: describe(e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::SinkConnect {
                message: format!("login returned HTTP {}", response.status()),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| AppError::SinkConnect {
            message: format!("malformed token response: {}", describe(e)),
        })?;

        if let Some(refresh_token) = token.refresh_token.as_deref() {
            self.token_cache.store(refresh_token)?;
            tracing::debug!("Cached refresh token at {}", self.token_cache.path().display());
        }

        self.session = Some(Session {
            access_token: token.access_token,
            roster: None,
        });
        tracing::info!("Connected to Hangouts");
        Ok(())
    }

    async fn roster_size(&mut self) -> Result<usize> {
        let access_token = self.session()?.access_token.clone();
        let contacts = self.fetch_roster(&access_token).await?;
        let size = contacts.len();

        if let Some(session) = self.session.as_mut() {
            session.roster = Some(contacts);
        }
        Ok(size)
    }

    async fn broadcast(&mut self, message: &NotificationMessage) -> Result<usize> {
        let session = self.session()?;
        let access_token = session.access_token.clone();
        let roster = match &session.roster {
            Some(roster) => roster.clone(),
            None => self.fetch_roster(&access_token).await?,
        };

        let mut delivered = 0;
        for contact in &roster {
            let who = contact.name.as_deref().unwrap_or(&contact.id);
            match self.send_to(&access_token, contact, message.as_str()).await {
                Ok(()) => {
                    tracing::debug!("Delivered to {}", who);
                    delivered += 1;
                }
                Err(e) => tracing::warn!("Could not deliver to {}: {}", who, e),
            }
        }

        if delivered == 0 && !roster.is_empty() {
            return Err(AppError::SinkDelivery {
                message: format!("no message delivered to {} recipients", roster.len()),
            });
        }
        Ok(delivered)
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let response = self
            .client
            .post(self.url("session/close"))
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AppError::SinkDelivery {
                message: describe(e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::SinkDelivery {
                message: format!("session close returned HTTP {}", response.status()),
            });
        }

        tracing::info!("Disconnected from Hangouts");
        Ok(())
    }
}
