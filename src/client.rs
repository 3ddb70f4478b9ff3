use crate::config::BotProfile;
use crate::error::{ConfigError, FetchError};
use crate::fetcher::SubmissionSource;
use crate::models::{Listing, Submission};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const INFO_URL: &str = "https://oauth.reddit.com/api/info";

/// Refresh tokens this long before reddit says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// An authenticated, blocking client for the reddit API.
///
/// The client is built on top of a [`reqwest::blocking::Client`], so as per that
/// documentation it is advised you create a single one and **reuse** it. An access
/// token is only requested once the first post is looked up.
pub struct Client {
    client: reqwest::blocking::Client,
    profile: BotProfile,
    token: Mutex<Option<AccessToken>>,
}

impl Client {
    /// Creates a new client authenticating as `profile`.
    pub fn new(profile: BotProfile) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(profile.user_agent())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self::with_client(client, profile))
    }

    /// Creates a new client with the given backing [`reqwest::blocking::Client`].
    ///
    /// The backing client is expected to send a user agent describing the bot.
    pub fn with_client(client: reqwest::blocking::Client, profile: BotProfile) -> Self {
        Self {
            client,
            profile,
            token: Mutex::new(None),
        }
    }

    /// The cached token, if it is still good for a while.
    fn cached_token(&self) -> Option<String> {
        let cached = self.token.lock().ok()?;
        cached
            .as_ref()
            .filter(|token| token.is_fresh())
            .map(|token| token.value.clone())
    }

    /// Returns a valid bearer token, fetching a new one if needed.
    ///
    /// The token cache is not locked while the token request is in flight.
    fn access_token(&self) -> Result<String, FetchError> {
        if let Some(value) = self.cached_token() {
            return Ok(value);
        }

        let token = self.request_token()?;
        let value = token.value.clone();
        if let Ok(mut cached) = self.token.lock() {
            *cached = Some(token);
        }
        Ok(value)
    }

    fn request_token(&self) -> Result<AccessToken, FetchError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
            expires_in: Option<u64>,
            error: Option<String>,
        }

        tracing::debug!(username = %self.profile.username, "Requesting access token");
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.profile.client_id, Some(&self.profile.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.profile.username.as_str()),
                ("password", self.profile.password.as_str()),
            ])
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::OAuth(format!("token request rejected ({status})")));
        }
        if !status.is_success() {
            return Err(FetchError::Response {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = serde_json::from_str(&response.text()?)?;
        match (body.access_token, body.error) {
            (Some(value), None) => {
                let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
                Ok(AccessToken {
                    value,
                    expires_at: Instant::now() + lifetime,
                })
            }
            (_, Some(error)) => Err(FetchError::OAuth(error)),
            (None, None) => Err(FetchError::OAuth("no access token granted".to_string())),
        }
    }

    fn forget_token(&self) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
    }
}

impl SubmissionSource for Client {
    fn submission(&self, id: &str) -> Result<Option<Submission>, FetchError> {
        if id.is_empty() {
            return Err(FetchError::Client("empty post ID".to_string()));
        }

        let token = self.access_token()?;
        let fullname = format!("t3_{id}");
        let response = self
            .client
            .get(INFO_URL)
            .bearer_auth(token)
            .query(&[("id", fullname.as_str()), ("raw_json", "1")])
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.forget_token();
            return Err(FetchError::OAuth(format!("request rejected ({status})")));
        }
        if !status.is_success() {
            return Err(FetchError::Response {
                status: status.as_u16(),
            });
        }

        parse_info(&response.text()?)
    }
}

/// Parses an `/api/info` body, which is either a listing or an error object.
fn parse_info(body: &str) -> Result<Option<Submission>, FetchError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum InfoResponse {
        Listing(Box<Listing<serde_json::Value>>),
        Error { error: serde_json::Value, message: Option<String> },
    }

    match serde_json::from_str(body)? {
        InfoResponse::Listing(listing) => match listing.into_first() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        },
        InfoResponse::Error { error, message } => Err(FetchError::Api(
            message.unwrap_or_else(|| error.to_string()),
        )),
    }
}
