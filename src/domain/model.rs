use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

pub const NOTIFICATION_TEMPLATE: &str = "Hope you are enjoying {game}";

/// Result of one status query. Built fresh per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub is_playing_game: bool,
    pub game_name: Option<String>,
    pub persona_name: Option<String>,
}

impl PlayerStatus {
    pub fn new(game_name: Option<String>, persona_name: Option<String>) -> Self {
        let game_name = game_name.filter(|name| !name.trim().is_empty());
        Self {
            is_playing_game: game_name.is_some(),
            game_name,
            persona_name,
        }
    }

    pub fn idle() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    pub fn for_game(game_name: &str) -> Self {
        Self(NOTIFICATION_TEMPLATE.replace("{game}", game_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotPlaying,
    /// The status query failed and the run was configured to treat that as idle.
    StatusUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyResult {
    Sent {
        message: NotificationMessage,
        recipients: usize,
    },
    Skipped(SkipReason),
}

/// `owner/name` identity of a repository. Equality and ordering ignore ASCII case.
#[derive(Debug, Clone)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn key(&self) -> (String, String) {
        (self.owner.to_ascii_lowercase(), self.name.to_ascii_lowercase())
    }
}

impl PartialEq for RepoId {
    fn eq(&self, other: &Self) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for RepoId {}

impl PartialOrd for RepoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RepoId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarredRepoSet {
    repos: BTreeSet<RepoId>,
}

impl StarredRepoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, repo: RepoId) -> bool {
        self.repos.insert(repo)
    }

    pub fn contains(&self, repo: &RepoId) -> bool {
        self.repos.contains(repo)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoId> {
        self.repos.iter()
    }

    /// Repositories in `self` that `other` does not have, in sorted order.
    pub fn difference(&self, other: &StarredRepoSet) -> Vec<RepoId> {
        self.repos.difference(&other.repos).cloned().collect()
    }
}

impl FromIterator<RepoId> for StarredRepoSet {
    fn from_iter<I: IntoIterator<Item = RepoId>>(iter: I) -> Self {
        Self {
            repos: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub starred: Vec<RepoId>,
    pub failed: Vec<(RepoId, String)>,
    pub already_starred: usize,
    pub dry_run: bool,
}

impl SyncReport {
    /// Number of repositories newly starred (or that would be, in a dry run).
    pub fn count(&self) -> usize {
        self.starred.len()
    }
}
