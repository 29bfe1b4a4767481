//! Tracker configuration stored in `~/.pivotaltrackerrc`.
//!
//! The file is INI. Keys may sit at the top level or under `[DEFAULT]`;
//! values are unquoted:
//!
//! ```ini
//! [DEFAULT]
//! token = abc123
//! user_id = 123
//! project_id = 456      ; optional, search all projects when absent
//! branch_layout = base-id
//! ```
//!
//! Your user id is listed at <https://www.pivotaltracker.com/services/v5/me>.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use ini::{Ini, Properties};
use tracing::{debug, warn};

use crate::core::branch_name::BranchLayout;
use crate::core::types::{ProjectId, UserId};

pub const CONFIG_FILE_NAME: &str = ".pivotaltrackerrc";
pub const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v5";
pub const DEFAULT_SECTION: &str = "DEFAULT";

const KNOWN_KEYS: [&str; 5] = ["token", "user_id", "project_id", "branch_layout", "api_url"];

/// Tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// API token sent as `X-TrackerToken`.
    pub token: String,

    /// Id of the user the story is claimed for.
    pub user_id: UserId,

    /// Fixed project to look the story up in.
    pub project_id: Option<ProjectId>,

    pub branch_layout: BranchLayout,

    pub api_url: String,
}

impl TrackerConfig {
    /// Build a config from the default-scope keys of a parsed INI document.
    pub fn from_ini(doc: &Ini) -> Result<Self> {
        let keys = DefaultScope::new(doc);
        let token = keys.required("token")?.to_string();
        let user_id = UserId(keys.parse_required("user_id")?);
        let project_id = keys.parse_optional("project_id")?.map(ProjectId);
        let branch_layout = keys
            .get("branch_layout")
            .map(|raw| BranchLayout::from_str(raw).map_err(|err| anyhow!("branch_layout: {err}")))
            .transpose()?
            .unwrap_or_default();
        let api_url = keys
            .get("api_url")
            .map_or_else(|| DEFAULT_API_URL.to_string(), str::to_string);
        keys.warn_unknown();

        let cfg = Self {
            token,
            user_id,
            project_id,
            branch_layout,
            api_url,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(anyhow!("token must not be empty"));
        }
        if self.api_url.trim().is_empty() {
            return Err(anyhow!("api_url must not be empty"));
        }
        Ok(())
    }
}

/// Keys outside any section, overlaid by keys under `[DEFAULT]`.
struct DefaultScope<'a> {
    layers: Vec<&'a Properties>,
}

impl<'a> DefaultScope<'a> {
    fn new(doc: &'a Ini) -> Self {
        let mut layers = Vec::with_capacity(2);
        if let Some(section) = doc.section(Some(DEFAULT_SECTION)) {
            layers.push(section);
        }
        layers.push(doc.general_section());
        Self { layers }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.layers
            .iter()
            .copied()
            .find_map(|props| props.get(key))
            .map(str::trim)
    }

    fn required(&self, key: &str) -> Result<&'a str> {
        self.get(key).ok_or_else(|| anyhow!("missing key {key}"))
    }

    fn parse_required(&self, key: &str) -> Result<i64> {
        parse_int(key, self.required(key)?)
    }

    fn parse_optional(&self, key: &str) -> Result<Option<i64>> {
        self.get(key).map(|raw| parse_int(key, raw)).transpose()
    }

    fn warn_unknown(&self) {
        for props in self.layers.iter().copied() {
            for (key, _) in props.iter() {
                if !KNOWN_KEYS.contains(&key) {
                    warn!(key, "ignoring unknown config key");
                }
            }
        }
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|err| anyhow!("{key} must be an integer, got {raw:?}: {err}"))
}

/// `$HOME/.pivotaltrackerrc`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not find home directory")?;
    Ok(home.join(CONFIG_FILE_NAME))
}

/// Load and validate config from an INI file. A missing file is an error.
pub fn load_config(path: &Path) -> Result<TrackerConfig> {
    debug!(path = %path.display(), "loading tracker config");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let doc = Ini::load_from_str(&contents)
        .with_context(|| format!("parse config {}", path.display()))?;
    let cfg = TrackerConfig::from_ini(&doc)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(user_id = %cfg.user_id, project_id = ?cfg.project_id, layout = %cfg.branch_layout, "config loaded");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, contents).expect("write config");
        (temp, path)
    }

    #[test]
    fn loads_unquoted_top_level_keys() {
        let (_temp, path) = write("token = abc123def\nproject_id = 9\nuser_id = 7\n");
        let cfg = load_config(&path).expect("load");
        assert_eq!(
            cfg,
            TrackerConfig {
                token: "abc123def".to_string(),
                user_id: UserId(7),
                project_id: Some(ProjectId(9)),
                branch_layout: BranchLayout::BaseThenId,
                api_url: DEFAULT_API_URL.to_string(),
            }
        );
    }

    #[test]
    fn loads_keys_under_default_section() {
        let (_temp, path) = write(
            "[DEFAULT]\ntoken = t\nuser_id = 7\nbranch_layout = id-base\napi_url = http://localhost:8080\n",
        );
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.token, "t");
        assert_eq!(cfg.project_id, None);
        assert_eq!(cfg.branch_layout, BranchLayout::IdThenBase);
        assert_eq!(cfg.api_url, "http://localhost:8080");
    }

    #[test]
    fn default_section_wins_over_top_level() {
        let (_temp, path) = write("token = outer\nuser_id = 1\n[DEFAULT]\nuser_id = 7\n");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.token, "outer");
        assert_eq!(cfg.user_id, UserId(7));
    }

    #[test]
    fn keys_in_other_sections_are_ignored() {
        let (_temp, path) = write("[work]\ntoken = t\nuser_id = 7\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing key token"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_config(&temp.path().join("missing")).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let (_temp, path) = write("token = t\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing key user_id"));
    }

    #[test]
    fn non_integer_id_is_an_error() {
        let (_temp, path) = write("token = t\nuser_id = seven\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("user_id must be an integer"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let (_temp, path) = write("token =\nuser_id = 7\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("token must not be empty"));
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let (_temp, path) = write("token = t\nuser_id = 7\nbranch_layout = sideways\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("branch_layout"));
    }
}
