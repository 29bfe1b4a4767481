//! Decides whether a located story may be claimed by the requesting user.
//!
//! Only two situations are safe:
//! - the story is `unstarted` and has no owners (fresh claim);
//! - the story is `started` and the user is among its owners (resume).
//!
//! Everything else is refused so a story owned by someone else is never
//! reassigned and a finished/rejected story is never restarted.

use crate::core::types::{Story, StoryState, UserId};
use crate::error::StoryStateError;

/// Why a story is eligible to be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Unstarted and unowned.
    Fresh,
    /// Already started by this user; claiming again is a no-op.
    Resume,
}

pub fn check_story_state(story: &Story, user: UserId) -> Result<Eligibility, StoryStateError> {
    match &story.state {
        StoryState::Started if story.is_owned_by(user) => Ok(Eligibility::Resume),
        StoryState::Unstarted if story.owner_ids.is_empty() => Ok(Eligibility::Fresh),
        StoryState::Unstarted => Err(StoryStateError::AlreadyOwned {
            story_id: story.id,
            owners: story.owner_ids.clone(),
        }),
        state => Err(StoryStateError::UnexpectedState {
            story_id: story.id,
            state: state.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ProjectId, StoryId};

    const ME: UserId = UserId(7);
    const OTHER: UserId = UserId(3);

    fn story(state: StoryState, owners: &[UserId]) -> Story {
        Story {
            id: StoryId(42),
            project_id: ProjectId(9),
            name: "Login page".to_string(),
            state,
            owner_ids: owners.to_vec(),
            url: None,
        }
    }

    #[test]
    fn started_and_owned_by_user_resumes() {
        let outcome = check_story_state(&story(StoryState::Started, &[ME]), ME);
        assert_eq!(outcome, Ok(Eligibility::Resume));
    }

    #[test]
    fn started_with_user_among_several_owners_resumes() {
        let outcome = check_story_state(&story(StoryState::Started, &[OTHER, ME]), ME);
        assert_eq!(outcome, Ok(Eligibility::Resume));
    }

    #[test]
    fn started_by_someone_else_is_unexpected_state() {
        let err = check_story_state(&story(StoryState::Started, &[OTHER]), ME).unwrap_err();
        assert_eq!(
            err,
            StoryStateError::UnexpectedState {
                story_id: StoryId(42),
                state: StoryState::Started,
            }
        );
    }

    #[test]
    fn started_without_owners_is_unexpected_state() {
        let err = check_story_state(&story(StoryState::Started, &[]), ME).unwrap_err();
        assert!(matches!(err, StoryStateError::UnexpectedState { .. }));
    }

    #[test]
    fn unstarted_and_unowned_is_fresh() {
        let outcome = check_story_state(&story(StoryState::Unstarted, &[]), ME);
        assert_eq!(outcome, Ok(Eligibility::Fresh));
    }

    #[test]
    fn unstarted_with_owner_is_already_owned() {
        for owners in [&[OTHER][..], &[ME][..]] {
            let err = check_story_state(&story(StoryState::Unstarted, owners), ME).unwrap_err();
            assert!(
                matches!(err, StoryStateError::AlreadyOwned { .. }),
                "owners {owners:?}"
            );
        }
    }

    #[test]
    fn other_states_are_refused_regardless_of_owners() {
        for state in ["finished", "delivered", "accepted", "rejected", "unscheduled"] {
            for owners in [&[][..], &[ME][..], &[OTHER][..]] {
                let err = check_story_state(&story(StoryState::from_wire(state), owners), ME)
                    .unwrap_err();
                assert!(
                    matches!(err, StoryStateError::UnexpectedState { .. }),
                    "state {state} owners {owners:?}"
                );
            }
        }
    }
}
