use crate::archiver::Archiver;
use crate::config::Settings;
use crate::error::{ConfigError, PipelineError};
use crate::fetcher::{enrich_posts, SubmissionSource};
use crate::loader::load_ids;
use crate::pacing::{Pace, Sleeper};
use crate::record::PostRecord;
use crate::report::write_report_file;
use crate::wayback::ArchiveTransport;

/// Checks that must pass before any request is made.
pub fn preflight(settings: &Settings) -> Result<(), PipelineError> {
    if settings.bot.is_empty() {
        return Err(ConfigError::MissingBot.into());
    }

    if settings.output.exists() && !settings.overwrite {
        return Err(PipelineError::OutputExists(settings.output.clone()));
    }
    Ok(())
}

/// One archiving run: load, enrich, archive and report.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    source: &'a dyn SubmissionSource,
    transport: &'a dyn ArchiveTransport,
    sleeper: &'a dyn Sleeper,
    pacer: &'a dyn Pace,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        source: &'a dyn SubmissionSource,
        transport: &'a dyn ArchiveTransport,
        sleeper: &'a dyn Sleeper,
        pacer: &'a dyn Pace,
    ) -> Self {
        Self {
            settings,
            source,
            transport,
            sleeper,
            pacer,
        }
    }

    /// Runs every stage in order. The report is only written once every post has
    /// been archived, so a failure leaves the output path untouched.
    pub fn run(&self) -> Result<Vec<PostRecord>, PipelineError> {
        preflight(self.settings)?;
        if self.settings.output.exists() {
            tracing::info!(path = %self.settings.output.display(), "Overwriting existing file");
        } else {
            tracing::info!("Running...");
        }

        let mut posts = load_ids(&self.settings.input)?;
        enrich_posts(
            &mut posts,
            self.source,
            &self.settings.metadata_retry,
            self.sleeper,
        )?;
        Archiver::new(self.transport, self.sleeper, self.pacer).archive_posts(&mut posts)?;
        write_report_file(&posts, &self.settings.output)?;

        tracing::info!("Archive completed");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArchiveError, FetchError};
    use crate::models::tests::self_post_json;
    use crate::models::Submission;
    use crate::pacing::tests::RecordingSleeper;
    use crate::pacing::Pacer;
    use crate::record::Phase;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::time::Duration;

    /// Resolves every ID to the same post, under that ID.
    #[derive(Default)]
    struct EchoSource {
        calls: Cell<usize>,
    }

    impl SubmissionSource for EchoSource {
        fn submission(&self, id: &str) -> Result<Option<Submission>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let mut value = self_post_json();
            value["id"] = id.into();
            value["permalink"] = format!("/r/test/comments/{id}/title/").into();
            Ok(Some(serde_json::from_value(value)?))
        }
    }

    /// Answers 404 for URLs containing `missing`, refuses connections when `down`.
    #[derive(Default)]
    struct FakeArchive {
        missing: Option<&'static str>,
        down: bool,
        requests: RefCell<Vec<String>>,
    }

    impl ArchiveTransport for FakeArchive {
        fn request(&self, url: &str) -> Result<u16, ArchiveError> {
            self.requests.borrow_mut().push(url.to_string());
            if self.down {
                return Err(ArchiveError::Connection(Box::new(io::Error::from(
                    io::ErrorKind::ConnectionRefused,
                ))));
            }
            match self.missing {
                Some(id) if url.contains(id) => Ok(404),
                _ => Ok(200),
            }
        }
    }

    fn write_ids(dir: &Path, ids: &[&str]) -> std::path::PathBuf {
        let path = dir.join("ids.txt");
        fs::write(&path, ids.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_full_run_in_chronological_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ids(dir.path(), &["ccc333", "bbb222", "aaa111"]);
        let settings = Settings::new(input, dir.path().join("report.txt"), "archivebot");

        let source = EchoSource::default();
        let archive = FakeArchive::default();
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::from_secs(5));

        let posts = Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap();

        let ids: Vec<_> = posts.iter().map(PostRecord::id).collect();
        assert_eq!(ids, vec!["aaa111", "bbb222", "ccc333"]);
        assert!(posts.iter().all(|post| post.phase() == Phase::Archived));

        let report = fs::read_to_string(&settings.output).unwrap();
        assert_eq!(report.matches("Title: ").count(), 3);
        let first = report.find("/aaa111/").unwrap();
        let last = report.find("/ccc333/").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_existing_output_stops_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ids(dir.path(), &["aaa111"]);
        let output = dir.path().join("report.txt");
        fs::write(&output, "previous report").unwrap();
        let settings = Settings::new(input, &output, "archivebot");

        let source = EchoSource::default();
        let archive = FakeArchive::default();
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::ZERO);

        let err = Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap_err();

        assert!(matches!(err, PipelineError::OutputExists(_)));
        assert_eq!(err.exit_code(), 0);
        assert_eq!(source.calls.get(), 0);
        assert!(archive.requests.borrow().is_empty());
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous report");
    }

    #[test]
    fn test_overwrite_replaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ids(dir.path(), &["aaa111"]);
        let output = dir.path().join("report.txt");
        fs::write(&output, "previous report").unwrap();
        let settings = Settings::new(input, &output, "archivebot").overwrite(true);

        let source = EchoSource::default();
        let archive = FakeArchive::default();
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::ZERO);

        Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap();
        assert!(fs::read_to_string(&output)
            .unwrap()
            .starts_with("Title: "));
    }

    #[test]
    fn test_missing_bot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path().join("ids.txt"), dir.path().join("out.txt"), "");
        let err = preflight(&settings).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::MissingBot)));
    }

    #[test]
    fn test_not_archivable_post_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ids(dir.path(), &["bbb222", "aaa111"]);
        let settings = Settings::new(input, dir.path().join("report.txt"), "archivebot");

        let source = EchoSource::default();
        let archive = FakeArchive {
            missing: Some("aaa111"),
            ..FakeArchive::default()
        };
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::ZERO);

        let posts = Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap();

        assert!(posts[0].cant_archive);
        assert!(!posts[1].cant_archive);
        assert_eq!(archive.requests.borrow().len(), 2);
        assert_eq!(
            fs::read_to_string(&settings.output)
                .unwrap()
                .matches("Archive Link: https://web.archive.org/web/")
                .count(),
            2
        );
    }

    #[test]
    fn test_exhausted_archive_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_ids(dir.path(), &["aaa111"]);
        let settings = Settings::new(input, dir.path().join("report.txt"), "archivebot");

        let source = EchoSource::default();
        let archive = FakeArchive {
            down: true,
            ..FakeArchive::default()
        };
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::ZERO);

        let err = Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ArchiveRetriesExhausted { attempts: 1000, .. }
        ));
        assert_eq!(err.exit_code(), 0);
        assert_eq!(archive.requests.borrow().len(), 1000);
        assert!(!settings.output.exists());
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(
            dir.path().join("missing.txt"),
            dir.path().join("report.txt"),
            "archivebot",
        );

        let source = EchoSource::default();
        let archive = FakeArchive::default();
        let sleeper = RecordingSleeper::default();
        let pacer = Pacer::new(Duration::ZERO);

        let err = Pipeline::new(&settings, &source, &archive, &sleeper, &pacer)
            .run()
            .unwrap_err();
        assert!(matches!(err, PipelineError::ReadInput { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(!settings.output.exists());
    }
}
