//! Error taxonomy for `start-story`.
//!
//! Every variant is terminal: the binary prints it and exits with
//! [`crate::exit_codes::FAILURE`]. I/O adapters report `anyhow` errors; the
//! orchestration layer folds them into these variants with their full
//! context chain.

use thiserror::Error;

use crate::core::types::{ProjectId, StoryId, StoryState, UserId};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not turn '{input}' into a story id: {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("could not find story {story_id}{}", describe_lookup_failures(.suppressed))]
    StoryNotFound {
        story_id: StoryId,
        suppressed: Vec<LookupFailure>,
    },

    #[error(transparent)]
    StoryState(#[from] StoryStateError),

    #[error("a branch name is required")]
    EmptyBranchName,

    #[error("you cannot put the story id ({story_id}) in the branch name ({branch})")]
    BranchNameCollision { branch: String, story_id: StoryId },

    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("could not update story {story_id}: {reason}")]
    RemoteUpdate { story_id: StoryId, reason: String },

    #[error("repository error: {0}")]
    Repository(String),
}

/// Why a located story cannot be started by the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryStateError {
    #[error("story {story_id} is in an unexpected state: {state}")]
    UnexpectedState { story_id: StoryId, state: StoryState },

    #[error("story {story_id} already has an owner ({})", join_ids(.owners))]
    AlreadyOwned { story_id: StoryId, owners: Vec<UserId> },
}

/// A lookup error absorbed while scanning projects for a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub project_id: ProjectId,
    pub message: String,
}

fn describe_lookup_failures(failures: &[LookupFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nlookup errors:");
    for failure in failures {
        out.push_str(&format!(
            "\n- project {}: {}",
            failure.project_id, failure.message
        ));
    }
    out
}

fn join_ids(ids: &[UserId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
