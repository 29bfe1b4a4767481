//! Tracker abstraction and the Pivotal Tracker v5 HTTP client.
//!
//! The [`Tracker`] trait decouples the workflow from the HTTP API. Tests use
//! a scripted tracker that serves stories from memory and records calls.

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::types::{Project, ProjectId, Story, StoryId, StoryState, StoryUpdate, UserId};
use crate::io::config::TrackerConfig;

const TOKEN_HEADER: &str = "X-TrackerToken";
const USER_AGENT: &str = concat!("start-story/", env!("CARGO_PKG_VERSION"));

/// Operations the workflow needs from a project tracker.
pub trait Tracker {
    /// Fetch a story from a project. `Ok(None)` when the tracker has no such
    /// story in that project.
    fn get_story(&self, project: ProjectId, story: StoryId) -> Result<Option<Story>>;

    /// Projects visible to the authenticated user, in tracker order.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// Apply `update` to a story and return the updated story.
    fn update_story(
        &self,
        project: ProjectId,
        story: StoryId,
        update: &StoryUpdate,
    ) -> Result<Story>;
}

/// Story resource as returned by `/projects/{id}/stories/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryResource {
    pub id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub name: String,
    pub current_state: String,
    #[serde(default)]
    pub owner_ids: Vec<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<StoryResource> for Story {
    fn from(resource: StoryResource) -> Self {
        Story {
            id: StoryId(resource.id),
            project_id: ProjectId(resource.project_id),
            name: resource.name,
            state: StoryState::from_wire(&resource.current_state),
            owner_ids: resource.owner_ids.into_iter().map(UserId).collect(),
            url: resource.url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectResource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl From<ProjectResource> for Project {
    fn from(resource: ProjectResource) -> Self {
        Project {
            id: ProjectId(resource.id),
            name: resource.name,
        }
    }
}

/// Body of `PUT /projects/{id}/stories/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryUpdateRequest {
    pub owner_ids: Vec<i64>,
    pub current_state: String,
}

impl From<&StoryUpdate> for StoryUpdateRequest {
    fn from(update: &StoryUpdate) -> Self {
        StoryUpdateRequest {
            owner_ids: update.owner_ids.iter().map(|id| id.0).collect(),
            current_state: update.state.as_str().to_string(),
        }
    }
}

/// Error body the tracker sends with non-success responses.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResource {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    general_problem: Option<String>,
}

/// Blocking client for the Pivotal Tracker v5 REST API.
#[derive(Debug, Clone)]
pub struct PivotalTracker {
    client: Client,
    api_url: String,
    token: String,
}

impl PivotalTracker {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(cfg: &TrackerConfig) -> Result<Self> {
        Self::new(cfg.api_url.clone(), cfg.token.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self
            .client
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .send()
            .with_context(|| format!("GET {path}"))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "resource not found");
            return Ok(None);
        }
        let response = ensure_success(response, "GET", path)?;
        let value = response
            .json::<T>()
            .with_context(|| format!("decode GET {path} response"))?;
        Ok(Some(value))
    }
}

impl Tracker for PivotalTracker {
    #[instrument(skip_all, fields(project = %project, story = %story))]
    fn get_story(&self, project: ProjectId, story: StoryId) -> Result<Option<Story>> {
        let path = story_path(project, story);
        debug!("fetching story");
        let resource: Option<StoryResource> = self.get_json(&path)?;
        Ok(resource.map(Story::from))
    }

    #[instrument(skip_all)]
    fn list_projects(&self) -> Result<Vec<Project>> {
        debug!("listing projects");
        let resources: Vec<ProjectResource> = self
            .get_json("/projects")?
            .ok_or_else(|| anyhow!("GET /projects returned 404"))?;
        debug!(count = resources.len(), "projects listed");
        Ok(resources.into_iter().map(Project::from).collect())
    }

    #[instrument(skip_all, fields(project = %project, story = %story))]
    fn update_story(
        &self,
        project: ProjectId,
        story: StoryId,
        update: &StoryUpdate,
    ) -> Result<Story> {
        let path = story_path(project, story);
        let body = StoryUpdateRequest::from(update);
        debug!(state = %body.current_state, owners = ?body.owner_ids, "updating story");
        let response = self
            .client
            .put(self.url(&path))
            .header(TOKEN_HEADER, &self.token)
            .json(&body)
            .send()
            .with_context(|| format!("PUT {path}"))?;
        let response = ensure_success(response, "PUT", &path)?;
        let resource: StoryResource = response
            .json()
            .with_context(|| format!("decode PUT {path} response"))?;
        Ok(resource.into())
    }
}

fn story_path(project: ProjectId, story: StoryId) -> String {
    format!("/projects/{project}/stories/{story}")
}

fn ensure_success(response: Response, method: &str, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(anyhow!(
        "{method} {path} returned {status}: {}",
        describe_api_error(&body)
    ))
}

fn describe_api_error(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResource>(body) {
        Ok(ApiErrorResource {
            error: Some(error),
            general_problem,
        }) => match general_problem {
            Some(problem) => format!("{error} ({problem})"),
            None => error,
        },
        _ => body.trim().to_string(),
    }
}
