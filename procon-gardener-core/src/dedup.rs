use crate::index::ArchiveIndex;
use crate::submission::Submission;

/// Keeps the submissions whose archive key is not in `index`, in order.
///
/// Survivors are not deduplicated against each other.
pub fn filter_unarchived(submissions: Vec<Submission>, index: &ArchiveIndex) -> Vec<Submission> {
    submissions
        .into_iter()
        .filter(|s| !index.contains(&s.archive_key()))
        .collect()
}
