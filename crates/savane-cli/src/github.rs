//! Issue creation on GitHub

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http::create_client;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Destination of exported issues
pub trait IssueTracker {
    /// Create an issue and return its number
    fn create_issue(&mut self, title: &str, body: &str, labels: &[&str]) -> Result<u64>;

    fn create_comment(&mut self, issue: u64, body: &str) -> Result<()>;

    fn close_issue(&mut self, issue: u64) -> Result<()>;
}

/// GitHub REST API client for one repository
pub struct GitHub {
    client: Client,
    api_url: String,
    repo_path: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
}

impl GitHub {
    pub fn new(repo_path: &str, token: &str) -> Result<Self> {
        Self::with_api_url(GITHUB_API_URL, repo_path, token)
    }

    pub fn with_api_url(api_url: &str, repo_path: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo_path: repo_path.to_string(),
            token: token.to_string(),
        })
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", self.api_url, self.repo_path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

impl IssueTracker for GitHub {
    fn create_issue(&mut self, title: &str, body: &str, labels: &[&str]) -> Result<u64> {
        let request = self.client.post(self.issues_url()).json(&json!({
            "title": title,
            "body": body,
            "labels": labels,
        }));
        let issue: CreatedIssue = self
            .authorized(request)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .with_context(|| format!("Failed to create issue '{}'", title))?;
        debug!(number = issue.number, "Created issue");
        Ok(issue.number)
    }

    fn create_comment(&mut self, issue: u64, body: &str) -> Result<()> {
        let url = format!("{}/{}/comments", self.issues_url(), issue);
        let request = self.client.post(url).json(&json!({ "body": body }));
        self.authorized(request)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to comment on issue #{}", issue))?;
        Ok(())
    }

    fn close_issue(&mut self, issue: u64) -> Result<()> {
        let url = format!("{}/{}", self.issues_url(), issue);
        let request = self.client.patch(url).json(&json!({ "state": "closed" }));
        self.authorized(request)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to close issue #{}", issue))?;
        Ok(())
    }
}
