use crate::domain::model::{NotificationMessage, PlayerStatus, RepoId, StarredRepoSet};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Current activity of `subject_id`. Errors cover transport, non-2xx and
    /// unparseable responses.
    async fn player_status(&self, api_key: &str, subject_id: &str) -> Result<PlayerStatus>;
}

/// A chat client with a connect/broadcast/disconnect lifecycle.
#[async_trait]
pub trait MessagingSink: Send {
    async fn connect(&mut self) -> Result<()>;

    /// Number of reachable recipients known so far. Fills in after `connect`.
    async fn roster_size(&mut self) -> Result<usize>;

    /// Sends `message` to every roster entry and returns how many received it.
    async fn broadcast(&mut self, message: &NotificationMessage) -> Result<usize>;

    /// Ends the session once delivery is flushed.
    async fn disconnect(&mut self) -> Result<()>;
}

#[async_trait]
pub trait StarredRepoHost: Send + Sync {
    async fn my_starred(&self) -> Result<StarredRepoSet>;
    async fn starred_by(&self, username: &str) -> Result<StarredRepoSet>;
    async fn star(&self, repo: &RepoId) -> Result<()>;
}
