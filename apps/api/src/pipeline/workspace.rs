//! Per-request compilation workspaces.
//!
//! Every request gets a fresh temp directory so concurrent compilations can
//! never collide. What happens to the directory after the artifact has been
//! read back is a deployment decision (`CLEANUP` env var): tear it down
//! immediately, keep it around briefly for debugging, or leave it forever.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::CleanupPolicy;

/// How long a `deferred` workspace survives after the response is sent.
const DEFERRED_CLEANUP_DELAY: Duration = Duration::from_secs(60);

/// An isolated, disposable directory holding one request's LaTeX source and
/// compiler output.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocates a fresh, uniquely named directory under the system temp root.
    pub fn create() -> std::io::Result<Self> {
        let dir = TempDir::with_prefix("typeset-")?;
        debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Disposes of the workspace according to `policy`. Called after the
    /// artifact bytes have been read into memory; cleanup failures are logged,
    /// never surfaced to the caller.
    pub fn finish(self, policy: CleanupPolicy) {
        match policy {
            CleanupPolicy::Immediate => {
                if let Err(e) = self.dir.close() {
                    warn!("failed to remove workspace: {e}");
                }
            }
            CleanupPolicy::Deferred => {
                let path = self.dir.keep();
                debug!(path = %path.display(), "workspace cleanup deferred");
                tokio::spawn(async move {
                    tokio::time::sleep(DEFERRED_CLEANUP_DELAY).await;
                    if let Err(e) = tokio::fs::remove_dir_all(&path).await {
                        warn!(path = %path.display(), "deferred workspace cleanup failed: {e}");
                    }
                });
            }
            CleanupPolicy::Never => {
                let path = self.dir.keep();
                debug!(path = %path.display(), "workspace kept (cleanup=never)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspaces_are_unique() {
        let a = Workspace::create().unwrap();
        let b = Workspace::create().unwrap();
        assert_ne!(a.path(), b.path(), "two live workspaces must never share a path");
        a.finish(CleanupPolicy::Immediate);
        b.finish(CleanupPolicy::Immediate);
    }

    #[test]
    fn test_immediate_cleanup_removes_directory() {
        let ws = Workspace::create().unwrap();
        let path = ws.path().to_path_buf();
        std::fs::write(path.join("resume.tex"), "x").unwrap();
        ws.finish(CleanupPolicy::Immediate);
        assert!(!path.exists(), "immediate cleanup must remove the workspace");
    }

    #[test]
    fn test_never_policy_keeps_directory() {
        let ws = Workspace::create().unwrap();
        let path = ws.path().to_path_buf();
        ws.finish(CleanupPolicy::Never);
        assert!(path.exists(), "cleanup=never must leave the workspace in place");
        std::fs::remove_dir_all(&path).unwrap();
    }
}
