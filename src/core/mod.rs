pub mod notifier;
pub mod star_sync;

pub use crate::domain::model::{
    NotificationMessage, NotifyResult, PlayerStatus, RepoId, SkipReason, StarredRepoSet,
    SyncReport,
};
pub use crate::domain::ports::{MessagingSink, StarredRepoHost, StatusProvider};
pub use crate::utils::error::Result;
