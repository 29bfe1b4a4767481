//! Story lookup for `start-story`.
//!
//! A story id is global in the tracker but the API addresses stories through
//! their project. When no project is configured every visible project is
//! tried in turn.

use tracing::{debug, info, instrument, warn};

use crate::core::types::{ProjectId, Story, StoryId};
use crate::error::{LookupFailure, StartError};
use crate::io::tracker::Tracker;

/// Where to look for a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    /// Look only in this project.
    Fixed(ProjectId),
    /// Scan all projects visible to the authenticated user.
    Search,
}

impl From<Option<ProjectId>> for ProjectScope {
    fn from(project: Option<ProjectId>) -> Self {
        match project {
            Some(project) => ProjectScope::Fixed(project),
            None => ProjectScope::Search,
        }
    }
}

/// A story together with the project it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedStory {
    pub project_id: ProjectId,
    pub story: Story,
}

#[instrument(skip_all, fields(story = %story_id, scope = ?scope))]
pub fn locate_story<T: Tracker>(
    tracker: &T,
    scope: ProjectScope,
    story_id: StoryId,
) -> Result<LocatedStory, StartError> {
    match scope {
        ProjectScope::Fixed(project_id) => locate_in_project(tracker, project_id, story_id),
        ProjectScope::Search => search_projects(tracker, story_id),
    }
}

fn locate_in_project<T: Tracker>(
    tracker: &T,
    project_id: ProjectId,
    story_id: StoryId,
) -> Result<LocatedStory, StartError> {
    match tracker.get_story(project_id, story_id) {
        Ok(Some(story)) => Ok(LocatedStory { project_id, story }),
        Ok(None) => Err(StartError::StoryNotFound {
            story_id,
            suppressed: Vec::new(),
        }),
        Err(err) => Err(StartError::StoryNotFound {
            story_id,
            suppressed: vec![LookupFailure {
                project_id,
                message: format!("{err:#}"),
            }],
        }),
    }
}

/// Try each visible project in tracker order and return the first hit.
///
/// Lookup errors on a single project count as "not there" so one failing
/// project cannot hide the story in another; they are kept and reported if
/// the story is not found anywhere.
fn search_projects<T: Tracker>(
    tracker: &T,
    story_id: StoryId,
) -> Result<LocatedStory, StartError> {
    let projects = tracker
        .list_projects()
        .map_err(|err| StartError::Tracker(format!("could not list projects: {err:#}")))?;
    debug!(count = projects.len(), "searching projects");

    let mut suppressed = Vec::new();
    for project in projects {
        match tracker.get_story(project.id, story_id) {
            Ok(Some(story)) => {
                info!(project = %project.id, name = %project.name, "story found");
                return Ok(LocatedStory {
                    project_id: project.id,
                    story,
                });
            }
            Ok(None) => debug!(project = %project.id, "story not in project"),
            Err(err) => {
                warn!(project = %project.id, err = %format!("{err:#}"), "story lookup failed");
                suppressed.push(LookupFailure {
                    project_id: project.id,
                    message: format!("{err:#}"),
                });
            }
        }
    }

    Err(StartError::StoryNotFound {
        story_id,
        suppressed,
    })
}
