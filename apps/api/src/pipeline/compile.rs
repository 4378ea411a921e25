//! Compiler invocation — turns rendered LaTeX source into a PDF.
//!
//! Two backends behind one trait: `LocalCompiler` shells out to pdflatex,
//! `RemoteCompiler` posts the source to a cloud compile service
//! (latexonline.cc-style). Selected by `COMPILER_BACKEND` at startup.
//!
//! The local backend runs pdflatex twice over the same source. A first-pass
//! failure is fatal and carries the captured log; a second-pass failure is
//! best-effort only — cross-reference warnings must not void an otherwise
//! valid first-pass artifact. Either way the artifact file must actually
//! exist afterwards: pdflatex can exit zero without producing output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::document::DocumentKind;
use crate::pipeline::workspace::Workspace;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("latex compilation failed:\n{log}")]
    PassFailed { log: String },

    #[error("latex compiler timed out after {0:?}")]
    Timeout(Duration),

    #[error("compiler reported success but produced no artifact")]
    ArtifactMissing,

    #[error("failed to launch latex compiler: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("workspace I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote compile service unreachable: {0}")]
    Remote(String),
}

/// A strategy for compiling rendered LaTeX source into a PDF artifact.
///
/// Implementations write whatever they need into the request's workspace and
/// return the path of the artifact inside it.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(
        &self,
        source: &str,
        kind: DocumentKind,
        workspace: &Workspace,
    ) -> Result<PathBuf, CompileError>;
}

/// Outcome of one pdflatex invocation. `log` is the decoded stdout+stderr;
/// pdflatex writes its diagnostics to stdout.
#[derive(Debug)]
struct PassOutput {
    success: bool,
    log: String,
}

/// Runs a local pdflatex binary inside the workspace.
pub struct LocalCompiler {
    bin: String,
    pass_timeout: Duration,
}

impl LocalCompiler {
    pub fn new(bin: String, pass_timeout: Duration) -> Self {
        Self { bin, pass_timeout }
    }

    /// One compiler pass: non-interactive, output captured, cwd = workspace,
    /// bounded wall-clock time. The child is killed if the timeout fires.
    async fn run_pass(
        &self,
        kind: DocumentKind,
        workspace: &Workspace,
    ) -> Result<PassOutput, CompileError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-interaction=nonstopmode")
            .arg(kind.source_filename())
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.pass_timeout, cmd.output())
            .await
            .map_err(|_| CompileError::Timeout(self.pass_timeout))?
            .map_err(CompileError::Spawn)?;

        // Lossy decode: a bad byte in the log must not break the error path.
        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            log.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(PassOutput {
            success: output.status.success(),
            log,
        })
    }
}

#[async_trait]
impl Compiler for LocalCompiler {
    async fn compile(
        &self,
        source: &str,
        kind: DocumentKind,
        workspace: &Workspace,
    ) -> Result<PathBuf, CompileError> {
        let source_path = workspace.path().join(kind.source_filename());
        tokio::fs::write(&source_path, source).await?;

        // Pass 1: authoritative. Non-zero exit surfaces the log to the caller.
        let first = self.run_pass(kind, workspace).await?;
        if !first.success {
            return Err(CompileError::PassFailed { log: first.log });
        }
        debug!(kind = %kind, "first pdflatex pass succeeded");

        // Pass 2: resolves cross-references. Best-effort only.
        match self.run_pass(kind, workspace).await {
            Ok(second) if !second.success => {
                warn!(kind = %kind, "second pdflatex pass failed; keeping first-pass artifact");
            }
            Ok(_) => debug!(kind = %kind, "second pdflatex pass succeeded"),
            Err(e) => warn!(kind = %kind, "second pdflatex pass did not run: {e}"),
        }

        let artifact = workspace.path().join(kind.artifact_filename());
        if !artifact.is_file() {
            return Err(CompileError::ArtifactMissing);
        }
        info!(kind = %kind, artifact = %artifact.display(), "compilation produced artifact");
        Ok(artifact)
    }
}

/// Sends the source to a cloud LaTeX compile endpoint and stores the returned
/// PDF in the workspace. The service runs its own passes, so one round trip
/// replaces the local two-pass dance.
pub struct RemoteCompiler {
    client: reqwest::Client,
    url: String,
}

impl RemoteCompiler {
    pub fn new(url: String, request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .expect("failed to build HTTP client"),
            url,
        }
    }
}

#[async_trait]
impl Compiler for RemoteCompiler {
    async fn compile(
        &self,
        source: &str,
        kind: DocumentKind,
        workspace: &Workspace,
    ) -> Result<PathBuf, CompileError> {
        // Keep a copy of the source on disk for debugging parity with the
        // local backend.
        let source_path = workspace.path().join(kind.source_filename());
        tokio::fs::write(&source_path, source).await?;

        let response = self
            .client
            .get(&self.url)
            .query(&[("text", source)])
            .send()
            .await
            .map_err(|e| CompileError::Remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompileError::PassFailed {
                log: format!("remote compiler returned {status}: {body}"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CompileError::Remote(e.to_string()))?;
        if bytes.is_empty() {
            return Err(CompileError::ArtifactMissing);
        }

        let artifact = workspace.path().join(kind.artifact_filename());
        tokio::fs::write(&artifact, &bytes).await?;
        info!(kind = %kind, bytes = bytes.len(), "remote compilation produced artifact");
        Ok(artifact)
    }
}
