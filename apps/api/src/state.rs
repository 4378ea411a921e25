use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::compile::Compiler;
use crate::pipeline::template::TemplateEngine;

/// Shared application state injected into all route handlers via Axum
/// extractors. Built once at startup; read-only afterwards, so concurrent
/// requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Template engine with every document template pre-registered.
    pub templates: Arc<TemplateEngine>,
    /// Compiler backend selected by `COMPILER_BACKEND` (local pdflatex or
    /// remote compile API).
    pub compiler: Arc<dyn Compiler>,
}
