pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{NotifyArgs, SyncArgs};

pub use adapters::{GithubClient, HangoutsSink, SteamClient, TokenCache};
pub use core::notifier::{RosterWait, StatusErrorPolicy, StatusNotifier};
pub use core::star_sync::{FailurePolicy, StarredReposSync};
pub use core::{NotifyResult, SkipReason, SyncReport};
pub use utils::error::{AppError, Result};
pub use utils::logger::LogContext;
