//! Orchestration for starting a story.
//!
//! Starting a story: parse the id, check the branch name, open the repository,
//! locate the story, check it can be claimed, claim it on the tracker, then
//! create and check out `<branch>-<id>` (or `<id>-<branch>`).
//!
//! The tracker claim and the local branch are independent side effects. If
//! branch creation fails the story stays claimed; the error says so.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::core::branch_name::{BranchLayout, check_base_name, compose_branch_name};
use crate::core::eligibility::{Eligibility, check_story_state};
use crate::core::identifier::parse_story_id;
use crate::core::types::{ProjectId, StoryId, StoryUpdate, UserId};
use crate::error::StartError;
use crate::io::git::Repository;
use crate::io::tracker::Tracker;
use crate::locate::{ProjectScope, locate_story};

pub const DEFAULT_BASE_BRANCH: &str = "master";

/// Inputs for one `start-story` invocation.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Story id as typed by the user (`42` or `#42`).
    pub raw_id: String,
    /// Free-text part of the branch name.
    pub branch: String,
    /// Branch to create the new branch from.
    pub base: String,
    pub repo_path: PathBuf,
    pub user_id: UserId,
    pub scope: ProjectScope,
    pub layout: BranchLayout,
}

/// Outcome of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub story_id: StoryId,
    pub project_id: ProjectId,
    pub story_name: String,
    pub story_url: Option<String>,
    pub branch: String,
    /// The story was already started by this user.
    pub resumed: bool,
    /// False when an existing local branch was reused.
    pub branch_created: bool,
}

/// Claim a story and check out its branch.
///
/// `open_repository` is called once, after the cheap local checks and before
/// any tracker call.
pub fn start_story<T, R, F>(
    request: &StartRequest,
    tracker: &T,
    open_repository: F,
) -> Result<StartOutcome, StartError>
where
    T: Tracker,
    R: Repository,
    F: FnOnce(&Path) -> Result<R>,
{
    let story_id = parse_story_id(&request.raw_id)?;
    check_base_name(&request.branch, story_id)?;
    debug!(story = %story_id, branch = %request.branch, "inputs accepted");

    let repo = open_repository(&request.repo_path)
        .map_err(|err| StartError::Repository(format!("{err:#}")))?;

    let located = locate_story(tracker, request.scope, story_id)?;
    let eligibility = check_story_state(&located.story, request.user_id)?;
    let resumed = eligibility == Eligibility::Resume;
    debug!(project = %located.project_id, ?eligibility, "story can be claimed");

    tracker
        .update_story(
            located.project_id,
            story_id,
            &StoryUpdate::claim(request.user_id),
        )
        .map_err(|err| StartError::RemoteUpdate {
            story_id,
            reason: format!("{err:#}"),
        })?;
    info!(story = %story_id, project = %located.project_id, user = %request.user_id, resumed, "story claimed");

    let branch = compose_branch_name(&request.branch, story_id, request.layout)?;
    let branch_created = switch_to_branch(&repo, &branch, &request.base).map_err(|err| {
        StartError::Repository(format!(
            "{err:#} (story {story_id} is already claimed on the tracker)"
        ))
    })?;

    Ok(StartOutcome {
        story_id,
        project_id: located.project_id,
        story_name: located.story.name,
        story_url: located.story.url,
        branch,
        resumed,
        branch_created,
    })
}

/// Create `branch` from `base` unless it already exists, then check it out.
///
/// Returns whether the branch was created.
fn switch_to_branch<R: Repository>(repo: &R, branch: &str, base: &str) -> Result<bool> {
    let created = if repo.branch_exists(branch)? {
        info!(branch, "reusing existing branch");
        false
    } else {
        repo.create_branch(branch, base)?;
        info!(branch, base, "created branch");
        true
    };
    repo.checkout(branch)?;
    Ok(created)
}
