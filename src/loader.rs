use crate::error::PipelineError;
use crate::record::PostRecord;
use std::fs;
use std::path::Path;

/// Reads one post ID per line from `path`.
///
/// The file is expected to list the newest post first; the returned records are
/// in chronological order. Empty lines are skipped and every other line is
/// taken as-is, whitespace included.
pub fn load_ids(path: &Path) -> Result<Vec<PostRecord>, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|source| PipelineError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_ids(&contents);
    tracing::info!(count = records.len(), "Post IDs loaded");
    Ok(records)
}

fn parse_ids(contents: &str) -> Vec<PostRecord> {
    contents
        .lines()
        .filter(|line| !line.is_empty())
        .rev()
        .map(PostRecord::new)
        .collect()
}
