//! Stable exit codes for `start-story`.

/// Story claimed and branch checked out.
pub const OK: i32 = 0;
/// Any failure: bad config or flags, story not startable, tracker or git error.
pub const FAILURE: i32 = 1;
