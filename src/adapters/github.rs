use crate::adapters::http::{describe, join_url};
use crate::core::{RepoId, StarredRepoHost, StarredRepoSet};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

const API_VERSION: &str = "2022-11-28";
const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct StarredRepo {
    name: String,
    owner: Owner,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

/// GitHub REST client for the starred-repository endpoints.
pub struct GithubClient {
    client: Client,
    api_base_url: String,
    token: String,
    per_page: u32,
}

impl GithubClient {
    pub fn new(client: Client, api_base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            token: token.into(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, DEFAULT_PER_PAGE);
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, join_url(&self.api_base_url, path))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Walks `page=1..` until a page comes back shorter than `per_page`.
    async fn list_starred(&self, path: &str, operation: &str) -> Result<StarredRepoSet> {
        let mut repos = StarredRepoSet::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .request(Method::GET, path)
                .query(&[("per_page", self.per_page), ("page", page)])
                .send()
                .await
                .map_err(|e| github_error(operation, describe(e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(github_error(operation, format!("HTTP {}", status)));
            }

            let batch: Vec<StarredRepo> = response
                .json()
                .await
                .map_err(|e| github_error(operation, format!("malformed page: {}", describe(e))))?;
            let fetched = batch.len();
            tracing::debug!("{} page {}: {} repositories", operation, page, fetched);

            for repo in batch {
                repos.insert(RepoId::new(repo.owner.login, repo.name));
            }

            if fetched < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }
}

fn github_error(operation: &str, message: String) -> AppError {
    AppError::Github {
        operation: operation.to_string(),
        message,
    }
}

#[async_trait]
impl StarredRepoHost for GithubClient {
    async fn my_starred(&self) -> Result<StarredRepoSet> {
        self.list_starred("user/starred", "list my starred").await
    }

    async fn starred_by(&self, username: &str) -> Result<StarredRepoSet> {
        self.list_starred(&format!("users/{}/starred", username), "list starred")
            .await
    }

    async fn star(&self, repo: &RepoId) -> Result<()> {
        let path = format!("user/starred/{}/{}", repo.owner, repo.name);
        let operation = format!("star {}", repo);

        let response = self
            .request(Method::PUT, &path)
            .header(CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| github_error(&operation, describe(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(github_error(&operation, format!("HTTP {}", status)));
        }
        Ok(())
    }
}
