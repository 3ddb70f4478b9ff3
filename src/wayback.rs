use crate::error::{ArchiveError, ConfigError};
use std::time::Duration;

/// Endpoint that asks the Wayback Machine to take a fresh snapshot.
pub const SAVE_PREFIX: &str = "https://web.archive.org/save/";

/// Prefix of every dated snapshot URL.
pub const SNAPSHOT_PREFIX: &str = "https://web.archive.org/web/";

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (archiving reddit posts)"
);

/// Anything that can ask an archiving service to snapshot a URL.
pub trait ArchiveTransport {
    /// Submits `url`, returning the HTTP status of the response.
    fn request(&self, url: &str) -> Result<u16, ArchiveError>;
}

/// A blocking client for the Wayback Machine's save endpoint.
pub struct WaybackClient {
    client: reqwest::blocking::Client,
}

impl WaybackClient {
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self::with_client(client))
    }

    /// Creates a new client with the given backing [`reqwest::blocking::Client`].
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ArchiveTransport for WaybackClient {
    fn request(&self, url: &str) -> Result<u16, ArchiveError> {
        let save_url = format!("{SAVE_PREFIX}{url}");
        tracing::debug!(url = %url, "Submitting URL to Wayback Machine");

        let response = self.client.get(save_url).send()?;
        Ok(response.status().as_u16())
    }
}
