//! Claim a Pivotal Tracker story and start a git branch for it.
//!
//! Reads `~/.pivotaltrackerrc`, claims the story for the configured user
//! (owner = you, state = started) and checks out `<branch>-<id>` created from
//! `--base`.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use start_story::core::branch_name::BranchLayout;
use start_story::core::types::ProjectId;
use start_story::error::StartError;
use start_story::exit_codes;
use start_story::io::config::{TrackerConfig, default_config_path, load_config};
use start_story::io::git::Git;
use start_story::io::tracker::PivotalTracker;
use start_story::locate::ProjectScope;
use start_story::logging;
use start_story::start::{DEFAULT_BASE_BRANCH, StartOutcome, StartRequest, start_story};

#[derive(Debug, Parser)]
#[command(
    name = "start-story",
    version,
    about = "Claim a tracker story and check out a branch for it"
)]
struct Cli {
    /// The id of the story to start (`42` or `#42`).
    #[arg(long, allow_hyphen_values = true)]
    id: String,

    /// The new branch name, without the story id.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    branch: String,

    /// The branch to create the new branch from.
    #[arg(long, default_value = DEFAULT_BASE_BRANCH)]
    base: String,

    /// Where the story id goes: `base-id` gives `<branch>-<id>`, `id-base`
    /// gives `<id>-<branch>`. Overrides `branch_layout` in the config file.
    #[arg(long)]
    layout: Option<BranchLayout>,

    /// Look the story up in this project only. Overrides `project_id` in the
    /// config file; without either, all visible projects are searched.
    #[arg(long)]
    project_id: Option<i64>,

    /// Config file (default: `~/.pivotaltrackerrc`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path inside the git repository to branch in.
    #[arg(long, default_value = ".")]
    repo: PathBuf,
}

fn main() {
    logging::init();
    // Usage errors share the single failure code instead of clap's own.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::FAILURE
            } else {
                exit_codes::OK
            };
            if err.print().is_err() {
                // Help and version go to stdout; retry the message on stderr.
                eprintln!("{err}");
            }
            std::process::exit(code);
        }
    };
    match run(cli) {
        Ok(outcome) => {
            report(&outcome);
            std::process::exit(exit_codes::OK);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run(cli: Cli) -> Result<StartOutcome, StartError> {
    let config = load(&cli)?;
    let tracker = PivotalTracker::from_config(&config)
        .map_err(|err| StartError::Tracker(format!("{err:#}")))?;
    let request = build_request(cli, &config);
    start_story(&request, &tracker, Git::open)
}

fn load(cli: &Cli) -> Result<TrackerConfig, StartError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path().map_err(|err| StartError::Config(format!("{err:#}")))?,
    };
    load_config(&path).map_err(|err| StartError::Config(format!("{err:#}")))
}

/// Merge flags over config values.
fn build_request(cli: Cli, config: &TrackerConfig) -> StartRequest {
    let project = cli.project_id.map(ProjectId).or(config.project_id);
    StartRequest {
        raw_id: cli.id,
        branch: cli.branch,
        base: cli.base,
        repo_path: cli.repo,
        user_id: config.user_id,
        scope: ProjectScope::from(project),
        layout: cli.layout.unwrap_or(config.branch_layout),
    }
}

fn report(outcome: &StartOutcome) {
    let verb = if outcome.resumed { "resumed" } else { "started" };
    println!(
        "{verb} story {} ({}) in project {}",
        outcome.story_id, outcome.story_name, outcome.project_id
    );
    if let Some(url) = &outcome.story_url {
        println!("{url}");
    }
    if outcome.branch_created {
        println!("created and checked out branch {}", outcome.branch);
    } else {
        println!("checked out existing branch {}", outcome.branch);
    }
}
