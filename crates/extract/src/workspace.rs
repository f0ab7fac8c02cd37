//! Per-request workspace lifecycle.
//!
//! A [`Workspace`] is a uniquely named temporary directory owned by exactly one
//! request. It is removed when dropped, including during unwinding, and removal
//! failures are logged and swallowed so they can never replace the request's
//! own result.
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::ExtractConfig;
use crate::error::ExtractError;

/// Exclusive, disposable extraction directory.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace according to `cfg`.
    ///
    /// Names are `<prefix><random>`; the random suffix comes from `tempfile`,
    /// which retries on collision, so concurrent requests never share a directory.
    pub fn create(cfg: &ExtractConfig) -> Result<Self, ExtractError> {
        let dir = match &cfg.workspace_parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                tempfile::Builder::new()
                    .prefix(&cfg.workspace_prefix)
                    .tempdir_in(parent)?
            }
            None => tempfile::Builder::new()
                .prefix(&cfg.workspace_prefix)
                .tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!(workspace = %path.display(), "workspace_created");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Root directory of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the workspace now instead of waiting for drop.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => debug!(workspace = %self.path.display(), "workspace_removed"),
            Err(err) => warn!(
                workspace = %self.path.display(),
                error = %err,
                "workspace_cleanup_failed"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Run `f` inside a fresh workspace and tear it down afterwards.
///
/// The workspace is removed on every exit path of `f`: success, error, or panic.
///
/// ```rust
/// use extract::{with_workspace, ExtractConfig, ExtractError};
///
/// let mut seen = None;
/// let result: Result<(), ExtractError> = with_workspace(&ExtractConfig::default(), |ws| {
///     seen = Some(ws.path().to_path_buf());
///     Ok(())
/// });
/// assert!(result.is_ok());
/// assert!(!seen.unwrap().exists());
/// ```
pub fn with_workspace<T, E, F>(cfg: &ExtractConfig, f: F) -> Result<T, E>
where
    F: FnOnce(&Workspace) -> Result<T, E>,
    E: From<ExtractError>,
{
    let workspace = Workspace::create(cfg)?;
    let result = f(&workspace);
    workspace.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_config(parent: &Path) -> ExtractConfig {
        ExtractConfig::default().with_workspace_parent(parent)
    }

    #[test]
    fn workspace_is_created_under_parent_with_prefix() {
        let parent = tempfile::tempdir().unwrap();
        let ws = Workspace::create(&scratch_config(parent.path())).unwrap();

        assert!(ws.path().is_dir());
        assert!(ws.path().starts_with(parent.path()));
        let name = ws.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("locstat-"));
    }

    #[test]
    fn drop_removes_directory_and_contents() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let ws = Workspace::create(&scratch_config(parent.path())).unwrap();
            fs::create_dir_all(ws.path().join("a/b")).unwrap();
            fs::write(ws.path().join("a/b/c.txt"), b"data").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn names_are_unique() {
        let parent = tempfile::tempdir().unwrap();
        let cfg = scratch_config(parent.path());
        let a = Workspace::create(&cfg).unwrap();
        let b = Workspace::create(&cfg).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn cleanup_swallows_already_removed_directory() {
        let parent = tempfile::tempdir().unwrap();
        let ws = Workspace::create(&scratch_config(parent.path())).unwrap();
        fs::remove_dir_all(ws.path()).unwrap();
        ws.close();
    }

    #[test]
    fn with_workspace_cleans_up_on_error() {
        let parent = tempfile::tempdir().unwrap();
        let mut seen = None;
        let result: Result<(), ExtractError> =
            with_workspace(&scratch_config(parent.path()), |ws| {
                seen = Some(ws.path().to_path_buf());
                Err(ExtractError::NoEntries)
            });

        assert_eq!(result, Err(ExtractError::NoEntries));
        assert!(!seen.unwrap().exists());
    }

    #[test]
    fn workspace_is_removed_during_unwind() {
        let parent = tempfile::tempdir().unwrap();
        let cfg = scratch_config(parent.path());
        let outcome = std::panic::catch_unwind(|| {
            let ws = Workspace::create(&cfg).unwrap();
            fs::write(ws.path().join("f.txt"), b"x").unwrap();
            panic!("boom");
        });
        assert!(outcome.is_err());
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
