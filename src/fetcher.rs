use crate::error::{FetchError, PipelineError};
use crate::models::Submission;
use crate::pacing::{RetryPolicy, Sleeper};
use crate::record::PostRecord;

/// Anything that can resolve a post ID into its metadata.
pub trait SubmissionSource {
    /// Looks up a single post. `Ok(None)` means reddit has no such post.
    fn submission(&self, id: &str) -> Result<Option<Submission>, FetchError>;
}

/// Fills in every record from `source`, in order.
///
/// Recoverable errors are retried according to `policy`. A post reddit cannot
/// find is left bare and the rest of the batch carries on.
pub fn enrich_posts(
    posts: &mut [PostRecord],
    source: &dyn SubmissionSource,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<(), PipelineError> {
    tracing::info!(count = posts.len(), "Collecting post data");

    for post in posts.iter_mut() {
        let resolved = policy
            .run(sleeper, FetchError::is_recoverable, || {
                source.submission(post.id())
            })
            .map_err(|(err, attempts)| {
                if err.is_recoverable() {
                    PipelineError::MetadataUnavailable {
                        id: post.id().to_string(),
                        attempts,
                        source: err,
                    }
                } else {
                    PipelineError::Metadata {
                        id: post.id().to_string(),
                        source: err,
                    }
                }
            })?;

        match resolved {
            Some(submission) => post.enrich(&submission),
            None => tracing::debug!(id = %post.id(), "Submission could not be found"),
        }
    }

    tracing::info!("All post data collected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::self_post_json;
    use crate::pacing::tests::RecordingSleeper;
    use crate::pacing::{Attempts, Backoff};
    use crate::record::Phase;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays scripted responses, one per call.
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Option<Submission>, FetchError>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Option<Submission>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SubmissionSource for ScriptedSource {
        fn submission(&self, id: &str) -> Result<Option<Submission>, FetchError> {
            self.calls.borrow_mut().push(id.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    fn submission() -> Submission {
        serde_json::from_value(self_post_json()).unwrap()
    }

    #[test]
    fn test_retries_transient_errors() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::Response { status: 503 }),
            Err(FetchError::OAuth("expired".into())),
            Ok(Some(submission())),
        ]);
        let sleeper = RecordingSleeper::default();
        let mut posts = vec![PostRecord::new("abc123")];

        enrich_posts(&mut posts, &source, &RetryPolicy::metadata(), &sleeper).unwrap();

        assert_eq!(posts[0].phase(), Phase::Enriched);
        assert_eq!(source.calls.borrow().len(), 3);
        assert_eq!(
            *sleeper.slept.borrow(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[test]
    fn test_missing_post_is_left_bare() {
        let source = ScriptedSource::new(vec![Ok(None), Ok(Some(submission()))]);
        let sleeper = RecordingSleeper::default();
        let mut posts = vec![PostRecord::new("gone00"), PostRecord::new("abc123")];

        enrich_posts(&mut posts, &source, &RetryPolicy::metadata(), &sleeper).unwrap();

        assert_eq!(posts[0].phase(), Phase::Bare);
        assert_eq!(posts[0].score, crate::record::UNFETCHED_SCORE);
        assert_eq!(posts[1].phase(), Phase::Enriched);
        assert_eq!(*source.calls.borrow(), vec!["gone00", "abc123"]);
    }

    #[test]
    fn test_bounded_retries_give_up() {
        let source = ScriptedSource::new(
            (0..3)
                .map(|_| Err(FetchError::Api("busy".into())))
                .collect(),
        );
        let policy = RetryPolicy::new(Backoff::fixed(Duration::from_secs(5)), Attempts::Limited(3));
        let mut posts = vec![PostRecord::new("abc123")];

        let err = enrich_posts(&mut posts, &source, &policy, &RecordingSleeper::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MetadataUnavailable { attempts: 3, .. }
        ));
    }

    #[test]
    fn test_decode_error_is_fatal() {
        let decode = serde_json::from_str::<u8>("{}").unwrap_err();
        let source = ScriptedSource::new(vec![Err(FetchError::Decode(decode))]);
        let mut posts = vec![PostRecord::new("abc123")];

        let err = enrich_posts(
            &mut posts,
            &source,
            &RetryPolicy::metadata_best_effort(),
            &RecordingSleeper::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Metadata { .. }));
        assert_eq!(source.calls.borrow().len(), 1);
    }
}
