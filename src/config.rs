use crate::error::ConfigError;
use crate::pacing::RetryPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Credentials for a reddit script application.
#[derive(Clone, Deserialize)]
pub struct BotProfile {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: Option<String>,
}

impl BotProfile {
    /// The user agent to send, falling back to one naming the bot account.
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            format!(
                "{}:{} (by /u/{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.username
            )
        })
    }
}

impl std::fmt::Debug for BotProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotProfile")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    bots: HashMap<String, BotProfile>,
}

/// Loads the profile named `bot` from the TOML file at `path`.
///
/// ```toml
/// [bots.archivebot]
/// client_id = "..."
/// client_secret = "..."
/// username = "archivebot"
/// password = "..."
/// ```
pub fn load_profile(path: &Path, bot: &str) -> Result<BotProfile, ConfigError> {
    if bot.is_empty() {
        return Err(ConfigError::MissingBot);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&contents, bot).map_err(|err| match err {
        ProfileError::Parse(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ProfileError::Unknown => ConfigError::UnknownBot(bot.to_string()),
    })
}

enum ProfileError {
    Parse(toml::de::Error),
    Unknown,
}

fn parse_profile(contents: &str, bot: &str) -> Result<BotProfile, ProfileError> {
    let mut file: ProfileFile = toml::from_str(contents).map_err(ProfileError::Parse)?;
    file.bots.remove(bot).ok_or(ProfileError::Unknown)
}

/// Everything a single run needs to know.
#[derive(Clone, Debug)]
pub struct Settings {
    /// File listing post IDs, newest first.
    pub input: PathBuf,
    /// Where the report is written.
    pub output: PathBuf,
    /// Replace `output` if it already exists.
    pub overwrite: bool,
    /// Name of the bot profile to authenticate as.
    pub bot: String,
    pub metadata_retry: RetryPolicy,
}

impl Settings {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>, S: Into<String>>(
        input: P,
        output: Q,
        bot: S,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            overwrite: false,
            bot: bot.into(),
            metadata_retry: RetryPolicy::metadata(),
        }
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn metadata_retry(mut self, policy: RetryPolicy) -> Self {
        self.metadata_retry = policy;
        self
    }
}
