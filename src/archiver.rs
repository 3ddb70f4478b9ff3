use crate::error::{ArchiveError, PipelineError};
use crate::pacing::{Pace, RetryPolicy, Sleeper};
use crate::record::{PostRecord, Phase};
use crate::wayback::{ArchiveTransport, SNAPSHOT_PREFIX};
use chrono::{DateTime, Utc};

/// The status the archiving service answers with when it will not snapshot a page.
const NOT_ARCHIVABLE: u16 = 404;

/// Builds the snapshot URL for `post_url` archived on `compact_date` (`YYYYMMDD`).
pub fn archive_url(compact_date: &str, post_url: &str) -> String {
    format!("{SNAPSHOT_PREFIX}{compact_date}/{post_url}")
}

/// `(YYYYMMDD, YYYY/MM/DD)` for `when`.
pub fn archive_dates(when: DateTime<Utc>) -> (String, String) {
    (
        when.format("%Y%m%d").to_string(),
        when.format("%Y/%m/%d").to_string(),
    )
}

/// Submits each post to the archiving service, one at a time.
pub struct Archiver<'a> {
    transport: &'a dyn ArchiveTransport,
    sleeper: &'a dyn Sleeper,
    pacer: &'a dyn Pace,
    retry: RetryPolicy,
    now: fn() -> DateTime<Utc>,
}

impl<'a> Archiver<'a> {
    pub fn new(
        transport: &'a dyn ArchiveTransport,
        sleeper: &'a dyn Sleeper,
        pacer: &'a dyn Pace,
    ) -> Self {
        Self {
            transport,
            sleeper,
            pacer,
            retry: RetryPolicy::archive(),
            now: Utc::now,
        }
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the source of the archive date.
    #[must_use]
    pub fn clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Archives every enriched post in `posts`.
    ///
    /// A post the service refuses is flagged with `cant_archive` and still gets
    /// its archive fields. Posts that were never resolved have no URL to submit
    /// and are skipped.
    pub fn archive_posts(&self, posts: &mut [PostRecord]) -> Result<(), PipelineError> {
        tracing::info!(
            count = posts.len(),
            "Archiving posts. This may take a while."
        );

        for post in posts.iter_mut() {
            if post.phase() == Phase::Bare {
                tracing::warn!(id = %post.id(), "Skipping post with no metadata");
                continue;
            }
            self.archive_post(post)?;
        }

        tracing::info!("All archive links collected");
        Ok(())
    }

    fn archive_post(&self, post: &mut PostRecord) -> Result<(), PipelineError> {
        let status = self
            .retry
            .run(self.sleeper, ArchiveError::is_retryable, || {
                self.transport.request(&post.post_url)
            })
            .map_err(|(err, attempts)| {
                if err.is_retryable() {
                    PipelineError::ArchiveRetriesExhausted {
                        attempts,
                        source: err,
                    }
                } else {
                    PipelineError::Archive {
                        url: post.post_url.clone(),
                        source: err,
                    }
                }
            })?;

        if status == NOT_ARCHIVABLE {
            tracing::debug!(id = %post.id(), "Archiving service cannot archive post");
            post.cant_archive = true;
        }

        let (compact, slashed) = archive_dates((self.now)());
        let url = archive_url(&compact, &post.post_url);
        post.mark_archived(compact, slashed, url);

        self.pacer.pause(self.sleeper);
        Ok(())
    }
}
