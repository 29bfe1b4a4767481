//! Claim a tracker story and check out a git branch for it.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (id parsing, eligibility, branch
//!   naming). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (config file, tracker API, git),
//!   each behind a trait or a small function so tests can substitute them.
//!
//! Orchestration modules ([`locate`], [`start`]) combine the two. Every
//! failure is a [`error::StartError`] returned to the binary, which prints it
//! and exits with [`exit_codes::FAILURE`].

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod locate;
pub mod logging;
pub mod start;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
