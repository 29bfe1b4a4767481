//! Test-only collaborators and fixtures.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{Project, ProjectId, Story, StoryId, StoryState, StoryUpdate, UserId};
use crate::io::git::Repository;
use crate::io::tracker::Tracker;

/// Create a story with deterministic defaults.
pub fn story(id: StoryId, project_id: ProjectId, state: StoryState, owners: &[UserId]) -> Story {
    Story {
        id,
        project_id,
        name: format!("Story {id}"),
        state,
        owner_ids: owners.to_vec(),
        url: None,
    }
}

/// A call received by [`ScriptedTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    ListProjects,
    GetStory(ProjectId, StoryId),
    UpdateStory(ProjectId, StoryId, StoryUpdate),
}

/// In-memory tracker that records every call.
#[derive(Debug, Default)]
pub struct ScriptedTracker {
    projects: Vec<Project>,
    stories: HashMap<(ProjectId, StoryId), Story>,
    failing_projects: HashSet<ProjectId>,
    fail_project_list: bool,
    fail_updates: bool,
    calls: RefCell<Vec<TrackerCall>>,
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visible project; listing order follows insertion order.
    pub fn with_project(mut self, id: ProjectId) -> Self {
        self.projects.push(Project {
            id,
            name: format!("Project {id}"),
        });
        self
    }

    /// Serve `story` from its own project.
    pub fn with_story(mut self, story: Story) -> Self {
        self.stories.insert((story.project_id, story.id), story);
        self
    }

    /// Make every story lookup against `id` fail.
    pub fn failing_project(mut self, id: ProjectId) -> Self {
        self.failing_projects.insert(id);
        self
    }

    pub fn failing_project_list(mut self) -> Self {
        self.fail_project_list = true;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.borrow().clone()
    }

    /// Only the update calls, as `(project, story, update)`.
    pub fn updates(&self) -> Vec<(ProjectId, StoryId, StoryUpdate)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                TrackerCall::UpdateStory(project, story, update) => {
                    Some((*project, *story, update.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TrackerCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Tracker for ScriptedTracker {
    fn get_story(&self, project: ProjectId, story: StoryId) -> Result<Option<Story>> {
        self.record(TrackerCall::GetStory(project, story));
        if self.failing_projects.contains(&project) {
            return Err(anyhow!("scripted failure for project {project}"));
        }
        Ok(self.stories.get(&(project, story)).cloned())
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.record(TrackerCall::ListProjects);
        if self.fail_project_list {
            return Err(anyhow!("scripted project list failure"));
        }
        Ok(self.projects.clone())
    }

    fn update_story(
        &self,
        project: ProjectId,
        story: StoryId,
        update: &StoryUpdate,
    ) -> Result<Story> {
        self.record(TrackerCall::UpdateStory(project, story, update.clone()));
        if self.fail_updates {
            return Err(anyhow!("scripted update failure"));
        }
        let mut updated = self
            .stories
            .get(&(project, story))
            .cloned()
            .ok_or_else(|| anyhow!("story {story} not in project {project}"))?;
        updated.owner_ids = update.owner_ids.clone();
        updated.state = update.state.clone();
        Ok(updated)
    }
}

/// A mutating call received by [`RecordingRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    CreateBranch { name: String, base: String },
    Checkout(String),
}

/// In-memory repository that records branch operations.
#[derive(Debug, Default)]
pub struct RecordingRepository {
    branches: RefCell<BTreeSet<String>>,
    fail_create: bool,
    calls: RefCell<Vec<RepoCall>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` already exists locally.
    pub fn with_branch(self, name: &str) -> Self {
        self.branches.borrow_mut().insert(name.to_string());
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.borrow().clone()
    }
}

impl Repository for RecordingRepository {
    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches.borrow().contains(name))
    }

    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        self.calls.borrow_mut().push(RepoCall::CreateBranch {
            name: name.to_string(),
            base: base.to_string(),
        });
        if self.fail_create {
            return Err(anyhow!("scripted create failure for {name}"));
        }
        self.branches.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(RepoCall::Checkout(name.to_string()));
        if !self.branches.borrow().contains(name) {
            return Err(anyhow!("no such branch {name}"));
        }
        Ok(())
    }
}

/// A real git repository in a temp dir with one commit on `master`.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let repo = Self { dir };
        repo.git(&["init", "--quiet"])?;
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/master"])?;
        repo.git(&["config", "user.email", "dev@example.com"])?;
        repo.git(&["config", "user.name", "Dev"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        std::fs::write(repo.path().join("README.md"), "# test\n").context("write readme")?;
        repo.git(&["add", "README.md"])?;
        repo.git(&["commit", "--quiet", "-m", "initial"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn current_branch(&self) -> Result<String> {
        Ok(self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string())
    }

    pub fn branches(&self) -> Result<Vec<String>> {
        let out = self.git(&["branch", "--format=%(refname:short)"])?;
        Ok(out.lines().map(|line| line.trim().to_string()).collect())
    }

    /// Run git in the repo and return stdout.
    pub fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
