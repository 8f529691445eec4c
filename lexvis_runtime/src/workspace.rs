//! # Workspace Manager
//!
//! Every tokenization request gets its own scratch directory
//! `<base>/lexvis-<request-id>-XXXXXX`. The [`Workspace`] guard removes it
//! exactly once, either through [`Workspace::close`] or on drop.

use lexvis_compiler::logging::codes;
use lexvis_compiler::{log_debug, log_success, log_warning};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Allocates request workspaces under a base directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    base: PathBuf,
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self {
            base: std::env::temp_dir(),
        }
    }
}

impl WorkspaceManager {
    /// Use `base`, or the system temp directory when `None`
    pub fn new(base: Option<PathBuf>) -> Self {
        match base {
            Some(base) => Self { base },
            None => Self::default(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Create an empty, uniquely named workspace for one request
    pub fn open(&self, request_id: &str) -> Result<Workspace, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("lexvis-{}-", request_id))
            .rand_bytes(6)
            .tempdir_in(&self.base)
            .map_err(|source| WorkspaceError::Allocation {
                base: self.base.clone(),
                source,
            })?;

        let root = dir.path().to_path_buf();
        log_success!(codes::success::WORKSPACE_OPENED, "Workspace opened",
            "request_id" => request_id,
            "path" => root.display());

        Ok(Workspace {
            dir: Some(dir),
            root,
            request_id: request_id.to_string(),
        })
    }
}

/// Scoped guard over a request's scratch directory
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    request_id: String,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Path of a file directly inside the workspace
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Remove the workspace now. Failures are logged, never returned.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => {
                log_success!(codes::success::WORKSPACE_CLOSED, "Workspace removed",
                    "request_id" => &self.request_id);
            }
            Err(error) => {
                log_warning!(codes::warnings::WORKSPACE_CLEANUP_FAILED, "Failed to remove workspace",
                    "request_id" => &self.request_id,
                    "path" => self.root.display(),
                    "error" => error);
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            log_debug!("Workspace released on drop", "request_id" => &self.request_id);
        }
        self.release();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("cannot allocate workspace under {}: {source}", base.display())]
    Allocation {
        base: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    pub fn error_code(&self) -> codes::Code {
        codes::runtime::WORKSPACE_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_prefixed_empty_directory() {
        let base = tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(base.path().to_path_buf()));
        let workspace = manager.open("req-1").unwrap();

        assert!(workspace.root().is_dir());
        assert_eq!(workspace.root().parent(), Some(base.path()));
        let name = workspace.root().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("lexvis-req-1-"));
        assert_eq!(name.len(), "lexvis-req-1-".len() + 6);
        assert_eq!(std::fs::read_dir(workspace.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_close_removes_contents() {
        let base = tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(base.path().to_path_buf()));
        let workspace = manager.open("req-2").unwrap();
        std::fs::write(workspace.file("G.g4"), "lexer grammar G;").unwrap();
        std::fs::create_dir(workspace.file("nested")).unwrap();
        let root = workspace.root().to_path_buf();

        workspace.close();
        assert!(!root.exists());
    }

    #[test]
    fn test_drop_removes_workspace_on_panic() {
        let base = tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(base.path().to_path_buf()));
        let root = std::panic::catch_unwind(|| {
            let workspace = manager.open("req-3").unwrap();
            let root = workspace.root().to_path_buf();
            std::fs::write(workspace.file("x"), "x").unwrap();
            assert!(root.exists());
            std::panic::panic_any(root)
        })
        .unwrap_err()
        .downcast::<PathBuf>()
        .unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_distinct_workspaces_for_same_request_id() {
        let base = tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(base.path().to_path_buf()));
        let a = manager.open("same").unwrap();
        let b = manager.open("same").unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_missing_base_is_allocation_error() {
        let base = tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(base.path().join("does-not-exist")));
        assert_matches!(manager.open("r"), Err(WorkspaceError::Allocation { .. }));
    }
}
