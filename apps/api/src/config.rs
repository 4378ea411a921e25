use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// What happens to a request's compilation workspace after the PDF has been
/// read back: remove it right away, keep it briefly for debugging, or leave
/// it on disk forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    Immediate,
    Deferred,
    Never,
}

impl FromStr for CleanupPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(CleanupPolicy::Immediate),
            "deferred" => Ok(CleanupPolicy::Deferred),
            "never" => Ok(CleanupPolicy::Never),
            other => bail!("invalid CLEANUP value '{other}' (expected immediate|deferred|never)"),
        }
    }
}

/// Which compiler backend to run: a local pdflatex binary or a cloud compile
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerBackend {
    Local,
    Remote,
}

impl FromStr for CompilerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(CompilerBackend::Local),
            "remote" => Ok(CompilerBackend::Remote),
            other => bail!("invalid COMPILER_BACKEND value '{other}' (expected local|remote)"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a sensible default; nothing is required.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding one template file per document kind.
    pub template_dir: String,
    /// pdflatex binary name or path (local backend).
    pub latex_bin: String,
    /// Wall-clock budget per compiler pass.
    pub compile_timeout_secs: u64,
    pub cleanup: CleanupPolicy,
    pub compiler_backend: CompilerBackend,
    /// Cloud compile endpoint (remote backend).
    pub remote_compile_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            template_dir: env_or("TEMPLATE_DIR", "templates"),
            latex_bin: env_or("LATEX_BIN", "pdflatex"),
            compile_timeout_secs: env_or("COMPILE_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("COMPILE_TIMEOUT_SECS must be a number of seconds")?,
            cleanup: env_or("CLEANUP", "immediate").parse()?,
            compiler_backend: env_or("COMPILER_BACKEND", "local").parse()?,
            remote_compile_url: env_or("REMOTE_COMPILE_URL", "https://latexonline.cc/compile"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
