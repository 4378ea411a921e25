//! Document generation pipeline.
//!
//! Flow: JSON body → escape → render template → write LaTeX source into a
//! fresh workspace → compile (two passes) → read PDF bytes → respond.
//!
//! Everything here is synchronous per request: the handler blocks until the
//! compiler subprocess finishes. Isolation between concurrent requests comes
//! entirely from per-request workspaces.

pub mod compile;
pub mod escape;
pub mod handlers;
pub mod template;
pub mod workspace;

use anyhow::Context;
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::document::DocumentKind;
use crate::errors::AppError;
use crate::pipeline::workspace::Workspace;
use crate::state::AppState;

/// Runs the full pipeline for one request and returns the PDF bytes.
pub async fn generate_document(
    state: &AppState,
    kind: DocumentKind,
    payload: Value,
) -> Result<Bytes, AppError> {
    if !payload.is_object() {
        return Err(AppError::Validation(
            "request body must be a JSON object".to_string(),
        ));
    }

    // Escape once, at ingestion. Templates receive only sanitized data.
    let sanitized = escape::escape_value(payload);

    let source = state.templates.render(kind, &sanitized)?;
    info!(kind = %kind, bytes = source.len(), "template rendered");

    let workspace = Workspace::create()
        .context("failed to allocate compilation workspace")
        .map_err(AppError::Internal)?;

    // The cleanup policy applies on failure as well.
    let artifact = match state.compiler.compile(&source, kind, &workspace).await {
        Ok(path) => path,
        Err(e) => {
            workspace.finish(state.config.cleanup);
            return Err(e.into());
        }
    };

    let pdf = match tokio::fs::read(&artifact).await {
        Ok(bytes) => bytes,
        Err(e) => {
            workspace.finish(state.config.cleanup);
            return Err(AppError::Internal(
                anyhow::Error::new(e).context("failed to read compiled artifact"),
            ));
        }
    };

    workspace.finish(state.config.cleanup);

    info!(kind = %kind, bytes = pdf.len(), "document generated");
    Ok(Bytes::from(pdf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    use crate::pipeline::template::TemplateEngine;

    /// The shipped templates, as loaded at startup. Tests run with the crate
    /// root as cwd, so the relative default path works.
    fn shipped_templates() -> TemplateEngine {
        TemplateEngine::from_dir(Path::new("templates")).expect("shipped templates must load")
    }

    #[test]
    fn test_resume_template_renders_escaped_ampersand() {
        let engine = shipped_templates();
        let payload = json!({
            "summary": "Built A & B",
            "work_experience": [],
            "projects": [],
            "skills": []
        });
        let source = engine
            .render(DocumentKind::Resume, &escape::escape_value(payload))
            .unwrap();
        assert!(
            source.contains(r"Built A \& B"),
            "rendered source must contain the escaped ampersand"
        );
        assert!(!source.contains("Built A & B"), "no bare ampersand may remain");
    }

    #[test]
    fn test_resume_template_renders_experience_entries() {
        let engine = shipped_templates();
        let payload = json!({
            "summary": "Engineer",
            "work_experience": [{
                "company": "Initech",
                "dates": "2022 - 2024",
                "role": "Backend Engineer",
                "bullets": ["Cut costs by 20%", "Owned the billing service"]
            }],
            "projects": [],
            "skills": [{"title": "Languages", "items": "Rust, Python"}]
        });
        let source = engine
            .render(DocumentKind::Resume, &escape::escape_value(payload))
            .unwrap();
        assert!(source.contains("Initech"));
        assert!(source.contains(r"Cut costs by 20\%"));
        assert!(source.contains(r"\item"));
        assert!(source.contains("Rust, Python"));
    }

    #[test]
    fn test_cover_letter_template_renders_escaped_company_name() {
        let engine = shipped_templates();
        let payload = json!({
            "date": "August 26, 2026",
            "company_name": "R&D Corp",
            "body": "I would like to apply."
        });
        let source = engine
            .render(DocumentKind::CoverLetter, &escape::escape_value(payload))
            .unwrap();
        assert!(
            source.contains(r"R\&D Corp"),
            "company name must be escaped in the rendered source"
        );
        assert!(source.contains("August 26, 2026"));
        assert!(source.contains("I would like to apply."));
    }

    #[test]
    fn test_missing_fields_render_as_empty_not_error() {
        let engine = shipped_templates();
        for kind in DocumentKind::ALL {
            engine
                .render(kind, &escape::escape_value(json!({})))
                .unwrap_or_else(|e| panic!("{kind} template must tolerate an empty body: {e}"));
        }
    }

    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::config::{CleanupPolicy, CompilerBackend, Config};
    use crate::pipeline::compile::{CompileError, Compiler};

    /// Compiler stand-in: records the workspace it ran in and optionally
    /// skips writing the artifact it claims to have produced.
    struct StubCompiler {
        write_artifact: bool,
        seen_workspace: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl Compiler for StubCompiler {
        async fn compile(
            &self,
            _source: &str,
            kind: DocumentKind,
            workspace: &Workspace,
        ) -> Result<PathBuf, CompileError> {
            *self.seen_workspace.lock().unwrap() = Some(workspace.path().to_path_buf());
            let artifact = workspace.path().join(kind.artifact_filename());
            if self.write_artifact {
                tokio::fs::write(&artifact, b"%PDF-1.5 stub").await?;
            }
            Ok(artifact)
        }
    }

    fn test_state(compiler: Arc<dyn Compiler>, cleanup: CleanupPolicy) -> AppState {
        let mut templates = TemplateEngine::empty();
        templates
            .add_template(
                DocumentKind::Resume.template_name(),
                "(((summary)))".to_string(),
            )
            .unwrap();
        AppState {
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                template_dir: "templates".to_string(),
                latex_bin: "pdflatex".to_string(),
                compile_timeout_secs: 5,
                cleanup,
                compiler_backend: CompilerBackend::Local,
                remote_compile_url: String::new(),
            },
            templates: Arc::new(templates),
            compiler,
        }
    }

    #[tokio::test]
    async fn test_generate_document_returns_pdf_bytes() {
        let stub = Arc::new(StubCompiler {
            write_artifact: true,
            seen_workspace: Mutex::new(None),
        });
        let state = test_state(stub.clone(), CleanupPolicy::Immediate);

        let pdf = generate_document(&state, DocumentKind::Resume, json!({"summary": "hi"}))
            .await
            .expect("pipeline with a well-behaved compiler must succeed");
        assert_eq!(&pdf[..], b"%PDF-1.5 stub");

        let ws = stub.seen_workspace.lock().unwrap().clone().unwrap();
        assert!(!ws.exists(), "immediate cleanup must remove the workspace");
    }

    #[tokio::test]
    async fn test_non_object_body_is_a_validation_error() {
        let stub = Arc::new(StubCompiler {
            write_artifact: true,
            seen_workspace: Mutex::new(None),
        });
        let state = test_state(stub, CleanupPolicy::Immediate);

        let err = generate_document(&state, DocumentKind::Resume, json!(["not", "an", "object"]))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Validation(_)),
            "expected Validation error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_artifact_read_failure_honors_cleanup_policy() {
        // The compiler claims success but never writes the artifact, so the
        // read-back fails. Even on that path the configured policy decides
        // the workspace's fate.
        let stub = Arc::new(StubCompiler {
            write_artifact: false,
            seen_workspace: Mutex::new(None),
        });
        let state = test_state(stub.clone(), CleanupPolicy::Never);

        let err = generate_document(&state, DocumentKind::Resume, json!({"summary": "hi"}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Internal(_)),
            "expected Internal error, got {err:?}"
        );

        let ws = stub.seen_workspace.lock().unwrap().clone().unwrap();
        assert!(
            ws.exists(),
            "cleanup=never must keep the workspace even when reading the artifact fails"
        );
        std::fs::remove_dir_all(&ws).unwrap();
    }
}
