use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve a post through the reddit API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("reddit reported an error: {0}")]
    Api(String),

    #[error("request rejected before sending: {0}")]
    Client(String),

    #[error("reddit responded with status {status}")]
    Response { status: u16 },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("authorization failed: {0}")]
    OAuth(String),

    #[error("could not connect to reddit: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("unexpected response from reddit: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether retrying the same request could succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FetchError::Decode(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            FetchError::Connection(err)
        } else {
            FetchError::Request(err)
        }
    }
}

/// Failure to submit a URL to the archiving service.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("could not connect to the archiving service: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("archive request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl ArchiveError {
    /// Only connection-level failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArchiveError::Connection(_))
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ArchiveError::Connection(Box::new(err))
        } else {
            ArchiveError::Request(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no bot identity configured; pass --bot or set SUBREDDIT_ARCHIVER_BOT")]
    MissingBot,

    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no profile for bot '{0}' in config file")]
    UnknownBot(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Every way a run can stop early.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "output file '{0}' already exists; choose a different name or use --overwrite to replace it"
    )]
    OutputExists(PathBuf),

    #[error("failed to read ID file '{path}': {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report '{path}': {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not fetch post {id} after {attempts} attempts: {source}")]
    MetadataUnavailable {
        id: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error("could not fetch post {id}: {source}")]
    Metadata {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error(
        "can not connect to web.archive.org after {attempts} attempts; check your connection and retry later"
    )]
    ArchiveRetriesExhausted {
        attempts: u32,
        #[source]
        source: ArchiveError,
    },

    #[error("could not archive {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: ArchiveError,
    },
}

impl PipelineError {
    /// Process exit status for this error.
    ///
    /// The conditions a user is expected to hit in normal use (no bot, an existing
    /// report, the archive being unreachable) exit cleanly.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(ConfigError::MissingBot)
            | PipelineError::OutputExists(_)
            | PipelineError::ArchiveRetriesExhausted { .. } => 0,
            _ => 1,
        }
    }
}
