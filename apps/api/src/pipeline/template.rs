//! Template rendering — binds sanitized request data into LaTeX templates.
//!
//! LaTeX already uses `{`/`}` and `%` for its own syntax, so the engine runs
//! minijinja with delimiters that cannot collide with LaTeX source:
//! `((( var )))`, `((* block *))` and `((# comment #))`.
//!
//! Templates are read from disk and registered once at startup; a missing or
//! unparsable template file is a configuration error that fails the boot, not
//! something discovered on the first request.

use std::path::{Path, PathBuf};

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::document::DocumentKind;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{0}' is not registered")]
    NotFound(String),

    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template '{name}' has invalid syntax: {detail}")]
    Syntax { name: String, detail: String },

    #[error("template '{name}' failed to render: {detail}")]
    Render { name: String, detail: String },
}

/// Wraps a minijinja environment configured for LaTeX output.
#[derive(Debug)]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Loads every known document template from `dir` and registers it.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut engine = Self::empty();
        for kind in DocumentKind::ALL {
            let path = dir.join(kind.template_name());
            let source = std::fs::read_to_string(&path)
                .map_err(|source| TemplateError::Io { path: path.clone(), source })?;
            engine.add_template(kind.template_name(), source)?;
            debug!(template = kind.template_name(), path = %path.display(), "template registered");
        }
        Ok(engine)
    }

    /// An engine with LaTeX-safe syntax but no templates. Templates are added
    /// via [`add_template`](Self::add_template).
    pub fn empty() -> Self {
        let mut env = Environment::new();
        env.set_syntax(latex_syntax());
        // Absent variables render as empty strings, and attribute access on
        // an absent variable stays undefined instead of raising.
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        Self { env }
    }

    /// Registers a template under `name`. Parses eagerly, so malformed
    /// template syntax surfaces here.
    pub fn add_template(&mut self, name: &str, source: String) -> Result<(), TemplateError> {
        self.env
            .add_template_owned(name.to_string(), source)
            .map_err(|e| TemplateError::Syntax {
                name: name.to_string(),
                detail: e.to_string(),
            })
    }

    /// Renders the template for `kind` with the given (already escaped) data.
    pub fn render(&self, kind: DocumentKind, data: &Value) -> Result<String, TemplateError> {
        self.render_named(kind.template_name(), data)
    }

    fn render_named(&self, name: &str, data: &Value) -> Result<String, TemplateError> {
        let template = self.env.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.to_string())
            } else {
                TemplateError::Render {
                    name: name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;
        template.render(data).map_err(|e| TemplateError::Render {
            name: name.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Delimiters chosen to never appear in ordinary LaTeX source.
fn latex_syntax() -> SyntaxConfig {
    SyntaxConfig::builder()
        .block_delimiters("((*", "*))")
        .variable_delimiters("(((", ")))")
        .comment_delimiters("((#", "#))")
        .build()
        .expect("static delimiter configuration is valid")
}
