use crate::core::StarredRepoHost;
use crate::domain::model::SyncReport;
use crate::utils::error::Result;
use crate::utils::validation::validate_github_login;

/// How a failed `star` call affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FailurePolicy {
    /// Log the failure, record it in the report and keep going.
    #[default]
    Continue,
    /// Stop at the first failure and return its error.
    Abort,
}

pub struct StarredReposSync<H: StarredRepoHost> {
    host: H,
    failure_policy: FailurePolicy,
    dry_run: bool,
}

impl<H: StarredRepoHost> StarredReposSync<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stars on the authenticated account every repository `target_username`
    /// has starred and it has not.
    pub async fn sync(&self, target_username: &str) -> Result<SyncReport> {
        validate_github_login("target_username", target_username)?;

        let mine = self.host.my_starred().await?;
        tracing::info!("Authenticated account has {} starred repositories", mine.len());

        let theirs = self.host.starred_by(target_username).await?;
        tracing::info!("{} has {} starred repositories", target_username, theirs.len());

        let missing = theirs.difference(&mine);
        let mut report = SyncReport {
            already_starred: theirs.len() - missing.len(),
            dry_run: self.dry_run,
            ..SyncReport::default()
        };

        if missing.is_empty() {
            tracing::info!("Nothing to star, already in sync with {}", target_username);
            return Ok(report);
        }

        for repo in missing {
            if self.dry_run {
                tracing::info!("Would star {}", repo);
                report.starred.push(repo);
                continue;
            }

            match self.host.star(&repo).await {
                Ok(()) => {
                    tracing::info!("Starred {}", repo);
                    report.starred.push(repo);
                }
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        tracing::error!(
                            "Failed to star {} after starring {}: {}",
                            repo,
                            report.count(),
                            e
                        );
                        return Err(e);
                    }
                    FailurePolicy::Continue => {
                        tracing::warn!("Skipping {}: {}", repo, e);
                        report.failed.push((repo, e.to_string()));
                    }
                },
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RepoId, StarredRepoSet};
    use crate::utils::error::AppError;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    struct MockHost {
        mine: Mutex<StarredRepoSet>,
        theirs: StarredRepoSet,
        broken: BTreeSet<String>,
        star_calls: Mutex<Vec<String>>,
    }

    fn set(repos: &[&str]) -> StarredRepoSet {
        repos.iter().filter_map(|r| RepoId::parse(r)).collect()
    }

    impl MockHost {
        fn new(mine: &[&str], theirs: &[&str]) -> Self {
            Self {
                mine: Mutex::new(set(mine)),
                theirs: set(theirs),
                broken: BTreeSet::new(),
                star_calls: Mutex::new(Vec::new()),
            }
        }

        fn star_calls(&self) -> Vec<String> {
            self.star_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<'a> StarredRepoHost for &'a MockHost {
        async fn my_starred(&self) -> Result<StarredRepoSet> {
            Ok(self.mine.lock().unwrap().clone())
        }

        async fn starred_by(&self, _username: &str) -> Result<StarredRepoSet> {
            Ok(self.theirs.clone())
        }

        async fn star(&self, repo: &RepoId) -> Result<()> {
            self.star_calls.lock().unwrap().push(repo.full_name());
            if self.broken.contains(&repo.full_name()) {
                return Err(AppError::Github {
                    operation: "star".to_string(),
                    message: "HTTP 404".to_string(),
                });
            }
            self.mine.lock().unwrap().insert(repo.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stars_only_the_difference() {
        let host = MockHost::new(&["a/x", "a/y"], &["a/y", "a/z"]);
        let report = StarredReposSync::new(&host).sync("friend").await.unwrap();

        assert_eq!(report.count(), 1);
        assert_eq!(report.starred, vec![RepoId::new("a", "z")]);
        assert_eq!(report.already_starred, 1);
        assert_eq!(host.star_calls(), vec!["a/z".to_string()]);
    }

    #[tokio::test]
    async fn test_second_run_stars_nothing() {
        let host = MockHost::new(&["a/x", "a/y"], &["a/y", "a/z"]);
        let sync = StarredReposSync::new(&host);

        assert_eq!(sync.sync("friend").await.unwrap().count(), 1);
        let second = sync.sync("friend").await.unwrap();

        assert_eq!(second.count(), 0);
        assert_eq!(host.star_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_continue_policy_skips_failures() {
        let mut host = MockHost::new(&[], &["a/broken", "a/fine", "b/also"]);
        host.broken.insert("a/broken".to_string());

        let report = StarredReposSync::new(&host).sync("friend").await.unwrap();

        assert_eq!(report.count(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, RepoId::new("a", "broken"));
        assert_eq!(host.star_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let mut host = MockHost::new(&[], &["a/broken", "a/fine"]);
        host.broken.insert("a/broken".to_string());

        let result = StarredReposSync::new(&host)
            .with_failure_policy(FailurePolicy::Abort)
            .sync("friend")
            .await;

        assert!(matches!(result, Err(AppError::Github { .. })));
        assert_eq!(host.star_calls(), vec!["a/broken".to_string()]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_star() {
        let host = MockHost::new(&["a/x"], &["a/x", "a/z", "b/q"]);
        let report = StarredReposSync::new(&host)
            .with_dry_run(true)
            .sync("friend")
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.count(), 2);
        assert!(host.star_calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_target_rejected() {
        let host = MockHost::new(&[], &["a/x"]);
        let result = StarredReposSync::new(&host).sync("not a login").await;
        assert!(matches!(result, Err(AppError::InvalidConfigValue { .. })));
    }
}
