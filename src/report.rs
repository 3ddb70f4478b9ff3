use crate::error::PipelineError;
use crate::record::PostRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes the report for `posts` to `path`, replacing anything already there.
pub fn write_report_file(posts: &[PostRecord], path: &Path) -> Result<(), PipelineError> {
    tracing::info!(path = %path.display(), "Writing data to file");

    let write = || -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        write_report(posts, &mut out)?;
        out.flush()
    };
    write().map_err(|source| PipelineError::WriteReport {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one block per post, each followed by two blank lines.
pub fn write_report<W: Write>(posts: &[PostRecord], out: &mut W) -> io::Result<()> {
    for post in posts {
        write_post(post, out)?;
    }
    Ok(())
}

fn write_post<W: Write>(post: &PostRecord, out: &mut W) -> io::Result<()> {
    let post_type = if post.is_self { "Self Post" } else { "Link Post" };

    writeln!(out, "Title: {}", post.title)?;
    writeln!(out, "Posted by: {}", post.author)?;
    writeln!(out, "Sub Posted on: {}", post.subreddit)?;
    writeln!(out, "Date Posted: {}", post.archived_date)?;
    writeln!(out, "Original Link: {}", post.post_url)?;
    // Debug formatting keeps the decimal point on whole floats (75.0, not 75).
    writeln!(
        out,
        "Score: {}\t% Upvoted: {:?}\t# of Upvotes: {:?}\t# of Downvotes: {:?}",
        post.score,
        post.upvote_ratio,
        post.upvotes(),
        post.downvotes()
    )?;
    writeln!(out, "Flair: {}", post.flair)?;
    writeln!(out, "Post Type: {}", post_type)?;
    writeln!(
        out,
        "Stickied: {}\tLocked: {}\tSpoiler: {}",
        post.stickied, post.locked, post.spoiler
    )?;
    writeln!(out, "Date Archived: {}", post.archived_date)?;
    writeln!(out, "Archive Link: {}\n\n", post.archive_url)
}
