use crate::error::{Result, ScanError};
use crate::query::build_search_query;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{info, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const SEARCH_PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// One code-search result: a workflow file that may reference the target
/// action, not yet confirmed to.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateFile {
    /// File basename, e.g. `ci.yml`.
    pub name: String,
    /// Path within the repository, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    /// Contents-API URL for fetching this file.
    pub url: String,
    pub repository: RepositoryRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Present on error bodies, including rate-limit reports.
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<CandidateFile>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

// ---------------------------------------------------------------------------
// GithubClient
// ---------------------------------------------------------------------------

/// Blocking GitHub REST client carrying the credential token and API base
/// URL. The base URL is overridable for GitHub Enterprise hosts and for
/// tests against a local mock server.
pub struct GithubClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, Self::DEFAULT_API_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("actionscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
    }

    /// Search the organization's workflow files for the target action.
    ///
    /// One first-page request, up to 100 results. Every failure mode
    /// (transport error, non-success status, rate limiting, malformed
    /// body) degrades to an empty candidate list with a diagnostic, so a
    /// bad search produces an empty report instead of aborting the run.
    pub fn search_workflow_files(
        &self,
        org: &str,
        action: &str,
        broad_search: bool,
    ) -> Vec<CandidateFile> {
        let query = build_search_query(org, action, broad_search);
        let url = format!("{}/search/code", self.base_url);

        info!("searching for workflow files in {org} organization");
        let params = [("q", query.as_str()), ("per_page", SEARCH_PAGE_SIZE)];
        let response = match self.get(&url, &params) {
            Ok(r) => r,
            Err(e) => {
                warn!("error searching for actions: {e}");
                return Vec::new();
            }
        };

        let status = response.status();
        let rate_limit_reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!("error searching for actions: HTTP {status}");
            warn!("response: {body}");
            return Vec::new();
        }

        let results: SearchResponse = match response.json() {
            Ok(r) => r,
            Err(e) => {
                warn!("malformed search response: {e}");
                return Vec::new();
            }
        };

        if let Some(message) = &results.message {
            if message.to_lowercase().contains("rate limit") {
                let wait = rate_limit_reset
                    .map(|reset| (reset - chrono::Utc::now().timestamp()).max(0))
                    .unwrap_or(0);
                warn!("rate limit exceeded, try again in {wait} seconds");
                return Vec::new();
            }
        }

        results.items
    }

    /// Fetch one file's text via its contents-API URL.
    ///
    /// Unlike search failures, a failed content fetch is an error: the
    /// caller decides how far it propagates (in practice, one file's
    /// worth). A `base64` transport encoding is decoded to UTF-8 text;
    /// anything else is returned verbatim.
    pub fn fetch_content(&self, url: &str) -> Result<String> {
        let response = self.get(url, &[])?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::ContentFetch {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let info: ContentResponse = response.json()?;
        if info.encoding == "base64" {
            // The contents API wraps base64 at 60 columns.
            let packed: String = info.content.split_whitespace().collect();
            let bytes = BASE64.decode(packed.as_bytes())?;
            Ok(String::from_utf8(bytes)?)
        } else {
            Ok(info.content)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
