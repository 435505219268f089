//! Transactional installs over a version-controlled working tree.
//!
//! A [`Transaction`] snapshots uncommitted work before running one unit of
//! work, reverts the tree when that work fails and always restores the
//! snapshot afterwards.

pub mod git;

use crate::constants::targets::ROLLBACK_SUFFIX;
use crate::error::Result;

pub use git::GitWorkTree;

/// Version-control operations a [`Transaction`] needs from the tree it
/// protects.
pub trait WorkTree {
    /// Fails with `NotARepository` or `NoCurrentCommit` when the tree
    /// cannot be rolled back.
    fn ensure_repository(&self) -> Result<()>;

    /// Whether tracked or untracked (but not ignored) files differ from the
    /// current commit.
    fn has_local_changes(&self) -> Result<bool>;

    /// Moves every local change, untracked files included, into a snapshot
    /// and leaves the tree at the current commit.
    fn snapshot(&self) -> Result<()>;

    /// Discards tracked modifications and removes untracked files and
    /// directories.
    fn revert(&self) -> Result<()>;

    /// Re-applies and drops the snapshot taken by [`WorkTree::snapshot`].
    fn restore(&self) -> Result<()>;
}

pub struct Transaction<W: WorkTree> {
    worktree: W,
    target: String,
}

impl<W: WorkTree> Transaction<W> {
    pub fn new(worktree: W, component: &str) -> Self {
        Self { worktree, target: format!("{component}{ROLLBACK_SUFFIX}") }
    }

    pub fn worktree(&self) -> &W {
        &self.worktree
    }

    /// Runs `work` inside the transaction.
    ///
    /// Preconditions are checked before `work` runs. When `work` fails the
    /// tree is reverted and the snapshot restored; errors raised while doing
    /// so are logged and the error from `work` is returned. When `work`
    /// succeeds a failing restore is returned instead.
    pub fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let target = self.target.as_str();
        self.worktree.ensure_repository()?;

        let snapshot = self.worktree.has_local_changes()?;
        if snapshot {
            log::info!(target: target, "Stashing local changes");
            self.worktree.snapshot()?;
        }

        match work() {
            Ok(value) => {
                if snapshot {
                    log::info!(target: target, "Restoring local changes");
                    self.worktree.restore()?;
                }
                Ok(value)
            }
            Err(err) => {
                log::warn!(target: target, "Install failed, rolling back: {err}");
                if let Err(revert_err) = self.worktree.revert() {
                    log::error!(target: target, "Rollback failed: {revert_err}");
                }
                if snapshot {
                    log::info!(target: target, "Restoring local changes");
                    if let Err(restore_err) = self.worktree.restore() {
                        log::error!(target: target, "Restoring local changes failed: {restore_err}");
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingWorkTree {
        dirty: bool,
        fail_on: Option<&'static str>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl RecordingWorkTree {
        fn record(&self, call: &'static str) -> Result<()> {
            self.calls.borrow_mut().push(call);
            if self.fail_on == Some(call) {
                return Err(Error::CommandError {
                    command: format!("git {call}"),
                    code: Some(1),
                    stdout: String::new(),
                    stderr: format!("{call} failed"),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }
    }

    impl WorkTree for RecordingWorkTree {
        fn ensure_repository(&self) -> Result<()> {
            self.record("check")
        }

        fn has_local_changes(&self) -> Result<bool> {
            self.record("status")?;
            Ok(self.dirty)
        }

        fn snapshot(&self) -> Result<()> {
            self.record("snapshot")
        }

        fn revert(&self) -> Result<()> {
            self.record("revert")
        }

        fn restore(&self) -> Result<()> {
            self.record("restore")
        }
    }

    fn failing_work() -> Result<()> {
        Err(Error::Other(anyhow::anyhow!("post-install failed")))
    }

    #[test]
    fn clean_tree_success_touches_nothing() {
        let tx = Transaction::new(RecordingWorkTree::default(), "python");
        assert_eq!(tx.run(|| Ok(42)).unwrap(), 42);
        assert_eq!(tx.worktree().calls(), ["check", "status"]);
    }

    #[test]
    fn dirty_tree_success_restores_snapshot() {
        let tx =
            Transaction::new(RecordingWorkTree { dirty: true, ..Default::default() }, "python");
        tx.run(|| Ok(())).unwrap();
        assert_eq!(tx.worktree().calls(), ["check", "status", "snapshot", "restore"]);
    }

    #[test]
    fn failure_reverts_then_restores() {
        let tx =
            Transaction::new(RecordingWorkTree { dirty: true, ..Default::default() }, "python");
        let err = tx.run(failing_work).unwrap_err();

        assert!(err.to_string().contains("post-install failed"));
        assert_eq!(tx.worktree().calls(), ["check", "status", "snapshot", "revert", "restore"]);
    }

    #[test]
    fn failure_on_clean_tree_only_reverts() {
        let tx = Transaction::new(RecordingWorkTree::default(), "python");
        tx.run(failing_work).unwrap_err();
        assert_eq!(tx.worktree().calls(), ["check", "status", "revert"]);
    }

    #[test]
    fn precondition_failure_skips_work() {
        let tx = Transaction::new(
            RecordingWorkTree { fail_on: Some("check"), ..Default::default() },
            "python",
        );
        let mut ran = false;
        let result = tx.run(|| {
            ran = true;
            Ok(())
        });

        assert!(result.is_err());
        assert!(!ran);
        assert_eq!(tx.worktree().calls(), ["check"]);
    }

    #[test]
    fn original_error_survives_failed_cleanup() {
        let tx = Transaction::new(
            RecordingWorkTree { dirty: true, fail_on: Some("revert"), ..Default::default() },
            "python",
        );
        let err = tx.run(failing_work).unwrap_err();

        assert!(matches!(err, Error::Other(_)));
        assert_eq!(tx.worktree().calls(), ["check", "status", "snapshot", "revert", "restore"]);
    }

    #[test]
    fn failed_restore_after_success_is_reported() {
        let tx = Transaction::new(
            RecordingWorkTree { dirty: true, fail_on: Some("restore"), ..Default::default() },
            "python",
        );
        let err = tx.run(|| Ok(())).unwrap_err();
        assert!(matches!(err, Error::CommandError { .. }));
    }
}
