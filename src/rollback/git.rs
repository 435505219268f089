//! [`WorkTree`] backed by git.
//!
//! Read-only checks go through `git2`; anything that mutates the tree runs
//! the `git` command line in the destination directory.

use std::path::PathBuf;

use git2::{Repository, StatusOptions};

use crate::error::{Error, Result};
use crate::process::{run_checked, CommandOutput};

use super::WorkTree;

pub struct GitWorkTree {
    dir: PathBuf,
    component: String,
}

impl GitWorkTree {
    pub fn new<P: Into<PathBuf>>(dir: P, component: &str) -> Self {
        Self { dir: dir.into(), component: component.to_string() }
    }

    fn open(&self) -> Result<Repository> {
        let not_a_repository = || Error::NotARepository {
            component: self.component.clone(),
            dir: self.dir.display().to_string(),
        };
        let repo = Repository::discover(&self.dir).map_err(|_| not_a_repository())?;
        if repo.is_bare() {
            return Err(not_a_repository());
        }
        Ok(repo)
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        run_checked("git", args, &self.dir)
    }
}

impl WorkTree for GitWorkTree {
    fn ensure_repository(&self) -> Result<()> {
        let repo = self.open()?;
        let no_commit = || Error::NoCurrentCommit {
            component: self.component.clone(),
            dir: self.dir.display().to_string(),
        };
        let head = repo.head().map_err(|_| no_commit())?;
        head.peel_to_commit().map_err(|_| no_commit())?;
        Ok(())
    }

    fn has_local_changes(&self) -> Result<bool> {
        let repo = self.open()?;
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true).include_ignored(false);
        let statuses = repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn snapshot(&self) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["stash", "push", "--include-untracked"])?;
        Ok(())
    }

    fn revert(&self) -> Result<()> {
        self.git(&["reset", "--hard", "HEAD"])?;
        self.git(&["clean", "-f", "-d"])?;
        Ok(())
    }

    fn restore(&self) -> Result<()> {
        self.git(&["stash", "pop"])?;
        Ok(())
    }
}
