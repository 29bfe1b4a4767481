//! I/O adapters: configuration file, tracker HTTP API, local git.

pub mod config;
pub mod git;
pub mod tracker;
