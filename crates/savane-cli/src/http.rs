//! HTTP access to the Savane instance

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info};

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("savane2github/", env!("CARGO_PKG_VERSION"));

/// Timeout for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a blocking HTTP client with a cookie store.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")
}

/// A browsing session on a Savane instance
pub struct SavaneSession {
    client: Client,
    instance: String,
}

impl SavaneSession {
    pub fn new(instance: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            instance: instance.trim_end_matches('/').to_string(),
        })
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log in so that private items are visible. The session cookie is kept
    /// by the client.
    pub fn login(&self, project: &str, username: &str, password: &str) -> Result<()> {
        info!("Authenticating at '{}' as '{}'...", self.instance, username);
        let uri = format!("/projects/{}/", project);
        let form = [
            ("login", "Login"),
            ("uri", uri.as_str()),
            ("form_loginname", username),
            ("form_pw", password),
            ("stay_in_ssl", "1"),
            ("cookie_for_a_year", "1"),
            ("brotherhood", "0"),
        ];

        self.client
            .post(format!("{}/account/login.php", self.instance))
            .form(&form)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Login at '{}' failed", self.instance))?;
        Ok(())
    }

    /// Fetch a page as text
    pub fn get(&self, url: &str) -> Result<String> {
        debug!("Loading page '{}'...", url);
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("Failed to load '{}'", url))
    }
}
