// github api interaction - lists the repositories to analyse

use crate::report::RepositoryInfo;
use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

const GITHUB_API: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

// only the fields the report uses
#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    html_url: String,
    updated_at: String,
}

impl From<GithubRepo> for RepositoryInfo {
    fn from(repo: GithubRepo) -> Self {
        RepositoryInfo {
            name: repo.name,
            url: repo.html_url,
            last_updated: repo.updated_at,
        }
    }
}

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
}

impl GithubClient {
    pub fn new(user: &str, token: &str) -> Result<Self> {
        Self::with_base_url(GITHUB_API, user, token)
    }

    /// point the client at another api root (used by tests)
    pub fn with_base_url(base_url: &str, user: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {token}"))
                .context("github token contains invalid header characters")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("railway-doctor/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
        })
    }

    /// every repository owned by the user, most recently updated first.
    /// a failing page stops the walk and keeps what was already fetched.
    pub async fn list_repositories(&self) -> Vec<RepositoryInfo> {
        let mut repos = Vec::new();
        let mut page = 1;

        loop {
            match self.fetch_page(page).await {
                Ok(page_repos) if page_repos.is_empty() => break,
                Ok(page_repos) => {
                    debug!(page, count = page_repos.len(), "fetched repository page");
                    repos.extend(page_repos.into_iter().map(RepositoryInfo::from));
                    page += 1;
                }
                Err(e) => {
                    warn!(page, error = %format!("{e:#}"), "error fetching repositories");
                    break;
                }
            }
        }

        repos
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<GithubRepo>> {
        let url = format!("{}/users/{}/repos", self.base_url, self.user);
        let page = page.to_string();
        let per_page = PER_PAGE.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("type", "owner"),
                ("sort", "updated"),
            ])
            .send()
            .await
            .context("failed to send request to github")?
            .error_for_status()
            .context("github returned an error status")?;

        response
            .json::<Vec<GithubRepo>>()
            .await
            .context("failed to parse github repository list")
    }
}
