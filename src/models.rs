//! The subset of the reddit data model needed to describe a post.
use serde::{Deserialize, Deserializer};

/// The author name reddit reports once an account or post has been deleted.
const DELETED_AUTHOR: &str = "[deleted]";

/// A reddit listing, as returned by `/api/info`.
#[derive(Clone, Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

/// A single wrapped object inside a [`Listing`].
#[derive(Clone, Debug, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

impl<T> Listing<T> {
    /// Consumes the listing, returning its first item (if any).
    pub fn into_first(self) -> Option<T> {
        self.data.children.into_iter().next().map(|thing| thing.data)
    }
}

/// A single reddit post.
#[derive(Clone, Debug, Deserialize)]
pub struct Submission {
    /// The base36 ID of this post.
    pub id: String,

    #[serde(flatten)]
    pub author: Author,

    #[serde(flatten)]
    pub subreddit: SubReddit,

    /// Path of the comment page, relative to the reddit host.
    pub permalink: String,

    pub title: String,

    /// URL of the linked content. For a self post this points back at the post.
    #[serde(rename = "url")]
    pub content_url: String,

    /// The text of this post, if a self-post.
    #[serde(rename = "selftext", default)]
    pub self_text: String,

    #[serde(rename = "link_flair_text")]
    pub flair: Option<String>,

    pub is_self: bool,
    pub stickied: bool,
    pub locked: bool,
    pub spoiler: bool,

    /// `false`, or the time of the last edit.
    #[serde(deserialize_with = "edited_flag")]
    pub edited: bool,

    /// `null`, or the kind of distinguishment (`"moderator"`, `"admin"`, ...).
    pub distinguished: Option<String>,

    pub score: i64,
    pub num_comments: i64,
    pub upvote_ratio: f64,

    /// Seconds since the unix epoch.
    pub created_utc: f64,
}

/// The author of a [`Submission`].
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    #[serde(rename = "author_fullname")]
    pub id: Option<String>,
    #[serde(rename = "author", deserialize_with = "author_name")]
    pub name: Option<String>,
}

/// The subreddit associated to a [`Submission`].
#[derive(Clone, Debug, Deserialize)]
pub struct SubReddit {
    #[serde(rename = "subreddit_id")]
    pub id: String,
    #[serde(rename = "subreddit")]
    pub name: String,
}

fn author_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|name| name != DELETED_AUTHOR))
}

fn edited_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Edited {
        Flag(bool),
        At(f64),
    }

    Ok(match Edited::deserialize(deserializer)? {
        Edited::Flag(flag) => flag,
        Edited::At(_) => true,
    })
}
