//! Shared deterministic types for the story workflow.
//!
//! These mirror the tracker's entities closely enough for the core decisions
//! (eligibility, naming) without depending on any wire format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Story identifier in the tracker's global namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub i64);

/// Tracker project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

/// Tracker user identifier (the invoking human, or a story owner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a story.
///
/// Only `unstarted` and `started` drive decisions; every other tracker state
/// is carried verbatim so it can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryState {
    Unstarted,
    Started,
    Other(String),
}

impl StoryState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "unstarted" => StoryState::Unstarted,
            "started" => StoryState::Started,
            other => StoryState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StoryState::Unstarted => "unstarted",
            StoryState::Started => "started",
            StoryState::Other(value) => value,
        }
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A story as read from the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: StoryId,
    pub project_id: ProjectId,
    pub name: String,
    pub state: StoryState,
    pub owner_ids: Vec<UserId>,
    pub url: Option<String>,
}

impl Story {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_ids.contains(&user)
    }
}

/// A project visible to the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

/// The single mutation issued against a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryUpdate {
    pub owner_ids: Vec<UserId>,
    pub state: StoryState,
}

impl StoryUpdate {
    /// Claim payload: `user` becomes the sole owner and the story is started.
    pub fn claim(user: UserId) -> Self {
        Self {
            owner_ids: vec![user],
            state: StoryState::Started,
        }
    }
}
