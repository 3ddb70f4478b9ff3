//! # subreddit-archiver
//!
//! The `subreddit_archiver` crate takes a list of reddit post IDs, looks each one
//! up through the reddit API, asks the [Wayback Machine](https://web.archive.org/)
//! to snapshot it and writes a plain-text report of the results.
//!
//! ## Archiving a list of posts
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use subreddit_archiver::config::{load_profile, Settings};
//! use subreddit_archiver::pacing::{Pacer, ThreadSleeper};
//! use subreddit_archiver::{Client, Pipeline, WaybackClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::new("ids.txt", "report.txt", "archivebot");
//! let reddit = Client::new(load_profile(Path::new("bots.toml"), &settings.bot)?)?;
//! let wayback = WaybackClient::new()?;
//! let pacer = Pacer::new(Duration::from_secs(5));
//!
//! let posts = Pipeline::new(&settings, &reddit, &wayback, &ThreadSleeper, &pacer).run()?;
//! println!("archived {} posts", posts.len());
//! # Ok(())
//! # }
//! ```
//!
//! The input file lists one ID per line, newest post first. Posts are processed
//! and reported oldest first.
//!
//! **NOTE**: Everything runs on the calling thread, one post at a time. Waiting
//! between retries and between archive requests goes through a
//! [`pacing::Sleeper`], so the whole pipeline can be driven without real delays.

pub mod archiver;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod wayback;

mod client;

pub use client::Client;
pub use error::PipelineError;
pub use pipeline::{preflight, Pipeline};
pub use record::PostRecord;
pub use wayback::WaybackClient;
