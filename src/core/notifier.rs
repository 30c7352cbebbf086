use crate::core::{MessagingSink, StatusProvider};
use crate::domain::model::{NotificationMessage, NotifyResult, SkipReason};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_non_empty_string;
use std::time::Duration;
use tokio::time::Instant;

/// What a failed status query means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusErrorPolicy {
    /// End the run with `StatusQuery`.
    #[default]
    Fail,
    /// Log it and skip, like "not playing" but reported as `StatusUnavailable`.
    TreatAsIdle,
}

/// Precondition between `connect` and `broadcast`: the sink roster fills in
/// asynchronously, so sleep `settle` first and then poll until it is non-empty
/// or `timeout` runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterWait {
    pub settle: Duration,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for RosterWait {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RosterWait {
    pub fn new(settle: Duration, timeout: Duration) -> Self {
        Self {
            settle,
            timeout,
            ..Self::default()
        }
    }

    /// Returns the roster size seen last; zero means the timeout was hit.
    pub async fn wait<S: MessagingSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        tracing::debug!("Waiting {:?} for the roster to settle", self.settle);
        tokio::time::sleep(self.settle).await;

        let deadline = Instant::now() + self.timeout;
        loop {
            let size = sink.roster_size().await?;
            if size > 0 {
                tracing::debug!("Roster ready with {} recipients", size);
                return Ok(size);
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    "Roster still empty after {:?}",
                    self.settle + self.timeout
                );
                return Ok(0);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

pub struct StatusNotifier<P: StatusProvider> {
    provider: P,
    roster_wait: RosterWait,
    status_error_policy: StatusErrorPolicy,
}

impl<P: StatusProvider> StatusNotifier<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            roster_wait: RosterWait::default(),
            status_error_policy: StatusErrorPolicy::default(),
        }
    }

    pub fn with_roster_wait(mut self, roster_wait: RosterWait) -> Self {
        self.roster_wait = roster_wait;
        self
    }

    pub fn with_status_error_policy(mut self, policy: StatusErrorPolicy) -> Self {
        self.status_error_policy = policy;
        self
    }

    pub async fn check_and_notify<S: MessagingSink + ?Sized>(
        &self,
        api_key: &str,
        subject_id: &str,
        sink: &mut S,
    ) -> Result<NotifyResult> {
        validate_non_empty_string("api_key", api_key)?;
        validate_non_empty_string("subject_id", subject_id)?;

        let status = match self.provider.player_status(api_key, subject_id).await {
            Ok(status) => status,
            Err(e) => {
                let e = as_status_error(e);
                return match self.status_error_policy {
                    StatusErrorPolicy::Fail => Err(e),
                    StatusErrorPolicy::TreatAsIdle => {
                        tracing::warn!("{}; treating as not playing", e);
                        Ok(NotifyResult::Skipped(SkipReason::StatusUnavailable))
                    }
                };
            }
        };

        let Some(game) = status.game_name.as_deref() else {
            tracing::info!("Not gaming at the moment.");
            return Ok(NotifyResult::Skipped(SkipReason::NotPlaying));
        };

        tracing::info!(
            "{} is playing {}",
            status.persona_name.as_deref().unwrap_or(subject_id),
            game
        );
        let message = NotificationMessage::for_game(game);

        if let Err(e) = sink.connect().await {
            let e = as_connect_error(e);
            tracing::error!("Unable to connect to Hangouts: {}", e);
            return Err(e);
        }

        let delivered = self.deliver(sink, &message).await;
        let closed = sink.disconnect().await.map_err(as_delivery_error);

        let recipients = delivered?;
        closed?;

        tracing::info!("Sent \"{}\" to {} recipients", message, recipients);
        Ok(NotifyResult::Sent {
            message,
            recipients,
        })
    }

    async fn deliver<S: MessagingSink + ?Sized>(
        &self,
        sink: &mut S,
        message: &NotificationMessage,
    ) -> Result<usize> {
        self.roster_wait.wait(sink).await.map_err(as_delivery_error)?;
        let delivered = sink.broadcast(message).await.map_err(as_delivery_error)?;
        if delivered == 0 {
            return Err(AppError::SinkDelivery {
                message: "roster empty, nothing delivered".to_string(),
            });
        }
        Ok(delivered)
    }
}

fn as_status_error(e: AppError) -> AppError {
    match e {
        AppError::StatusQuery { .. } => e,
        other => AppError::StatusQuery {
            message: other.to_string(),
        },
    }
}

fn as_connect_error(e: AppError) -> AppError {
    match e {
        AppError::SinkConnect { .. } => e,
        other => AppError::SinkConnect {
            message: other.to_string(),
        },
    }
}

fn as_delivery_error(e: AppError) -> AppError {
    match e {
        AppError::SinkDelivery { .. } => e,
        other => AppError::SinkDelivery {
            message: other.to_string(),
        },
    }
}
