//! Branch naming for a claimed story.
//!
//! The story id is appended (or prepended) by the tool itself, so a base name
//! that already carries the id is refused: the id is later used to find the
//! branch and must appear exactly once.

use std::fmt;
use std::str::FromStr;

use crate::core::types::StoryId;
use crate::error::StartError;

pub const SEPARATOR: char = '-';

/// Where the story id goes in the final branch name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchLayout {
    /// `<base>-<id>`, e.g. `feature-x-42`.
    #[default]
    BaseThenId,
    /// `<id>-<base>`, e.g. `42-feature-x`.
    IdThenBase,
}

impl BranchLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchLayout::BaseThenId => "base-id",
            BranchLayout::IdThenBase => "id-base",
        }
    }
}

impl fmt::Display for BranchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchLayout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "base-id" => Ok(BranchLayout::BaseThenId),
            "id-base" => Ok(BranchLayout::IdThenBase),
            other => Err(format!(
                "unknown branch layout '{other}' (expected 'base-id' or 'id-base')"
            )),
        }
    }
}

/// Refuse base names that are empty or already contain the story id.
pub fn check_base_name(base: &str, story_id: StoryId) -> Result<(), StartError> {
    if base.trim().is_empty() {
        return Err(StartError::EmptyBranchName);
    }
    if base.contains(&story_id.to_string()) {
        return Err(StartError::BranchNameCollision {
            branch: base.to_string(),
            story_id,
        });
    }
    Ok(())
}

/// Combine `base` and `story_id` into the final branch name.
pub fn compose_branch_name(
    base: &str,
    story_id: StoryId,
    layout: BranchLayout,
) -> Result<String, StartError> {
    check_base_name(base, story_id)?;
    let name = match layout {
        BranchLayout::BaseThenId => format!("{base}{SEPARATOR}{story_id}"),
        BranchLayout::IdThenBase => format!("{story_id}{SEPARATOR}{base}"),
    };
    Ok(name)
}
