#![doc = include_str!("../README.md")]

mod types;

pub use types::{Issue, MergeOutcome, PullRequest};

use repopulse::RepoId;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use types::{CreateIssueRequest, CreatePullRequest, MergePullRequest};

/// Default base URL for the GitHub REST API v3.
const GITHUB_API_BASE: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("repopulse/", env!("CARGO_PKG_VERSION"));

pub type Result<T> = std::result::Result<T, GithubError>;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub returned {status} for {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blocking GitHub REST v3 client.
///
/// Construct once at startup and pass by reference into each activity; the
/// client holds no state besides the token and connection pool.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        GithubClient {
            http: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Create an issue with the given title, body, and labels.
    pub fn create_issue(
        &self,
        repo: &RepoId,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<Issue> {
        let url = self.repo_url(repo, "issues");
        let request = self.post(&url).json(&CreateIssueRequest {
            title,
            body,
            labels,
        });
        self.send(request, &url)
    }

    /// Open a pull request from `head` into `base`.
    pub fn create_pull(
        &self,
        repo: &RepoId,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        let url = self.repo_url(repo, "pulls");
        let request = self.post(&url).json(&CreatePullRequest {
            title,
            body,
            head,
            base,
        });
        self.send(request, &url)
    }

    /// Fetch a pull request, including its current `mergeable` state.
    pub fn get_pull(&self, repo: &RepoId, number: u64) -> Result<PullRequest> {
        let url = self.repo_url(repo, &format!("pulls/{}", number));
        let request = self.authorized(self.http.get(&url));
        self.send(request, &url)
    }

    /// Merge a pull request with the given commit message.
    pub fn merge_pull(
        &self,
        repo: &RepoId,
        number: u64,
        commit_message: &str,
    ) -> Result<MergeOutcome> {
        let url = self.repo_url(repo, &format!("pulls/{}/merge", number));
        let request = self
            .authorized(self.http.put(&url))
            .json(&MergePullRequest { commit_message });
        self.send(request, &url)
    }

    fn repo_url(&self, repo: &RepoId, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, repo.owner, repo.name, tail
        )
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.authorized(self.http.post(url))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        tracing::debug!("github request: {}", url);

        let response = request.send().map_err(|source| GithubError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().map_err(|source| GithubError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(GithubError::Status {
                status,
                url: url.to_string(),
                body: excerpt(&body, 200),
            });
        }

        serde_json::from_str(&body).map_err(|source| GithubError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn excerpt(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        let head: String = s.chars().take(n).collect();
        format!("{}…", head)
    }
}
