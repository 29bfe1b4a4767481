//! Git adapter for the story workflow.
//!
//! Branch creation and checkout go through `git` subprocess calls so the
//! user's own git configuration (hooks, credentials, worktrees) applies.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Branch operations the workflow performs on the local repository.
pub trait Repository {
    /// Check whether a local branch exists.
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Create local branch `name` pointing at `base`, without switching to it.
    fn create_branch(&self, name: &str, base: &str) -> Result<()>;

    /// Switch the working tree to an existing local branch.
    fn checkout(&self, name: &str) -> Result<()>;
}

impl<R: Repository + ?Sized> Repository for &R {
    fn branch_exists(&self, name: &str) -> Result<bool> {
        (**self).branch_exists(name)
    }

    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        (**self).create_branch(name, base)
    }

    fn checkout(&self, name: &str) -> Result<()> {
        (**self).checkout(name)
    }
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// Fails when `path` is not inside a git work tree. The returned handle
    /// runs commands from the work tree root.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .context("spawn git rev-parse")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "could not open a git repository in {}: {}",
                path.display(),
                stderr.trim()
            ));
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(root = %root, "opened repository");
        Ok(Self {
            workdir: PathBuf::from(root),
        })
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

impl Repository for Git {
    fn branch_exists(&self, name: &str) -> Result<bool> {
        let status = self
            .run(&[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{name}"),
            ])?
            .status;
        Ok(status.success())
    }

    #[instrument(skip_all, fields(branch = name, base))]
    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        debug!("creating branch");
        self.run_checked(&["branch", name, base])
            .with_context(|| format!("could not create branch {name} from {base}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(branch = name))]
    fn checkout(&self, name: &str) -> Result<()> {
        debug!("checking out branch");
        self.run_checked(&["checkout", name, "--"])
            .with_context(|| format!("could not check out branch {name}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    #[test]
    fn open_fails_outside_a_repository() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = Git::open(temp.path()).unwrap_err();
        assert!(err.to_string().contains("could not open a git repository"));
    }

    #[test]
    fn open_resolves_work_tree_root_from_subdirectory() {
        let repo = TestRepo::new().expect("repo");
        let nested = repo.path().join("src");
        std::fs::create_dir_all(&nested).expect("mkdir");
        let git = Git::open(&nested).expect("open");
        assert_eq!(
            git.workdir.canonicalize().expect("canonical workdir"),
            repo.path().canonicalize().expect("canonical root")
        );
    }

    #[test]
    fn create_then_checkout_switches_branch() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::open(repo.path()).expect("open");

        assert!(!git.branch_exists("feature-x-42").expect("exists"));
        git.create_branch("feature-x-42", "master").expect("create");
        assert!(git.branch_exists("feature-x-42").expect("exists"));
        assert_eq!(repo.current_branch().expect("branch"), "master");

        git.checkout("feature-x-42").expect("checkout");
        assert_eq!(repo.current_branch().expect("branch"), "feature-x-42");
    }

    #[test]
    fn create_from_missing_base_fails() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::open(repo.path()).expect("open");
        let err = git.create_branch("feature-x-42", "no-such-base").unwrap_err();
        assert!(format!("{err:#}").contains("could not create branch feature-x-42"));
    }
}
