//! Parsing of user-supplied story identifiers.

use crate::core::types::StoryId;
use crate::error::StartError;

/// Marker users commonly copy along with the id from the tracker UI.
pub const ID_MARKER: char = '#';

/// Parse `input` into a [`StoryId`].
///
/// At most one leading [`ID_MARKER`] is stripped; the remainder must be a
/// base-10 integer. Negative values are accepted structurally, existence is
/// checked later against the tracker.
pub fn parse_story_id(input: &str) -> Result<StoryId, StartError> {
    let invalid = |reason: &str| StartError::InvalidIdentifier {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if input.is_empty() {
        return Err(invalid("a story id is required"));
    }
    let digits = input.strip_prefix(ID_MARKER).unwrap_or(input);
    digits
        .parse::<i64>()
        .map(StoryId)
        .map_err(|err| invalid(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_prefix_is_optional() {
        for digits in ["1", "42", "190283746", "007"] {
            let with_marker = parse_story_id(&format!("#{digits}")).expect("with marker");
            let without = parse_story_id(digits).expect("without marker");
            assert_eq!(with_marker, without, "input {digits}");
        }
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = parse_story_id("").unwrap_err();
        assert!(matches!(err, StartError::InvalidIdentifier { .. }));
    }

    #[test]
    fn non_numeric_remainder_is_invalid() {
        for input in ["#", "abc", "#abc", "12a", "##12", " 12", "1.5"] {
            let err = parse_story_id(input).unwrap_err();
            assert!(
                matches!(err, StartError::InvalidIdentifier { .. }),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn negative_ids_are_accepted_structurally() {
        assert_eq!(parse_story_id("-7").expect("parse"), StoryId(-7));
        assert_eq!(parse_story_id("#-7").expect("parse"), StoryId(-7));
    }

    #[test]
    fn error_message_names_input() {
        let err = parse_story_id("#nope").unwrap_err();
        assert!(err.to_string().contains("'#nope'"));
    }
}
