use crate::models::Submission;

/// Host used to build canonical post URLs.
pub const CANONICAL_HOST: &str = "https://old.reddit.com";

/// Author name recorded when reddit no longer knows who posted.
pub const DELETED_AUTHOR: &str = "Deleted";

/// Score recorded until the post has been fetched.
pub const UNFETCHED_SCORE: i64 = -100_000;

/// Comment count recorded until the post has been fetched.
pub const UNFETCHED_COMMENTS: i64 = -1;

/// How far a [`PostRecord`] has made it through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Only the ID is known.
    Bare,
    /// Metadata has been copied from reddit.
    Enriched,
    /// The archive URL has been recorded.
    Archived,
}

/// Everything collected about a single post.
#[derive(Clone, Debug, PartialEq)]
pub struct PostRecord {
    id: String,
    phase: Phase,

    pub post_url: String,
    pub archive_url: String,
    pub link: String,
    pub title: String,
    pub self_text: String,
    pub author: String,
    pub flair: String,
    pub subreddit: String,

    /// `YYYYMMDD`, as used inside archive URLs.
    pub archived_date_compact: String,
    /// `YYYY/MM/DD`, as shown in the report.
    pub archived_date: String,

    pub stickied: bool,
    pub locked: bool,
    pub edited: bool,
    pub distinguished: bool,
    pub is_self: bool,
    pub spoiler: bool,
    pub cant_archive: bool,

    pub score: i64,
    pub num_comments: i64,
    pub upvote_ratio: f64,
    pub created_utc: f64,
}

impl PostRecord {
    /// A bare record holding nothing but `id`.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            phase: Phase::Bare,
            post_url: String::new(),
            archive_url: String::new(),
            link: String::new(),
            title: String::new(),
            self_text: String::new(),
            author: String::new(),
            flair: String::new(),
            subreddit: String::new(),
            archived_date_compact: String::new(),
            archived_date: String::new(),
            stickied: false,
            locked: false,
            edited: false,
            distinguished: false,
            is_self: false,
            spoiler: false,
            cant_archive: false,
            score: UNFETCHED_SCORE,
            num_comments: UNFETCHED_COMMENTS,
            upvote_ratio: 0.0,
            created_utc: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Copies the attributes of a resolved post into this record.
    ///
    /// Exactly one of `link` and `self_text` is filled, depending on `is_self`.
    pub fn enrich(&mut self, post: &Submission) {
        self.post_url = format!("{}{}", CANONICAL_HOST, post.permalink);
        self.title = post.title.clone();
        self.author = post
            .author
            .name
            .clone()
            .unwrap_or_else(|| DELETED_AUTHOR.to_string());
        self.flair = post.flair.clone().unwrap_or_default();
        if post.is_self {
            self.link = String::new();
            self.self_text = post.self_text.clone();
        } else {
            self.link = post.content_url.clone();
            self.self_text = String::new();
        }
        self.subreddit = post.subreddit.name.clone();

        self.stickied = post.stickied;
        self.locked = post.locked;
        self.edited = post.edited;
        self.distinguished = post.distinguished.is_some();
        self.is_self = post.is_self;
        self.spoiler = post.spoiler;

        self.score = post.score;
        self.num_comments = post.num_comments;
        self.upvote_ratio = post.upvote_ratio;
        self.created_utc = post.created_utc;

        self.phase = Phase::Enriched;
    }

    /// Records where (and when) this post was archived.
    pub fn mark_archived(&mut self, compact_date: String, date: String, archive_url: String) {
        self.archived_date_compact = compact_date;
        self.archived_date = date;
        self.archive_url = archive_url;
        self.phase = Phase::Archived;
    }

    /// Estimated upvotes, `score * upvote_ratio`.
    pub fn upvotes(&self) -> f64 {
        self.score as f64 * self.upvote_ratio
    }

    /// Estimated downvotes, `score - upvotes`.
    pub fn downvotes(&self) -> f64 {
        self.score as f64 - self.upvotes()
    }
}
