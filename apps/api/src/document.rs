//! Document kinds — the closed set of pipelines this service knows how to run.
//!
//! Each kind ties together a template, the source filename written into the
//! compilation workspace, and the artifact/download filenames. Adding a new
//! document type means adding a variant here plus a template file; the rest of
//! the pipeline is kind-agnostic.

use std::fmt;

/// A document pipeline supported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Every kind, in a fixed order. Used to load all templates at startup.
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Resume, DocumentKind::CoverLetter];

    /// Template file name under the configured template directory.
    /// Also the name the template is registered under in the engine.
    pub fn template_name(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume.tex",
            DocumentKind::CoverLetter => "cover_letter.tex",
        }
    }

    /// Name of the LaTeX source file written into the workspace.
    pub fn source_filename(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume.tex",
            DocumentKind::CoverLetter => "cover_letter.tex",
        }
    }

    /// Name of the PDF pdflatex is expected to leave in the workspace.
    pub fn artifact_filename(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume.pdf",
            DocumentKind::CoverLetter => "cover_letter.pdf",
        }
    }

    /// Filename offered to the client in the Content-Disposition header.
    pub fn download_filename(self) -> &'static str {
        self.artifact_filename()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => write!(f, "resume"),
            DocumentKind::CoverLetter => write!(f, "cover_letter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names_are_distinct_per_kind() {
        assert_ne!(
            DocumentKind::Resume.artifact_filename(),
            DocumentKind::CoverLetter.artifact_filename(),
            "resume and cover letter pipelines must not share an artifact name"
        );
    }

    #[test]
    fn test_artifact_matches_source_stem() {
        for kind in DocumentKind::ALL {
            let source = kind.source_filename();
            let artifact = kind.artifact_filename();
            assert_eq!(
                source.trim_end_matches(".tex"),
                artifact.trim_end_matches(".pdf"),
                "pdflatex derives the output name from the source stem"
            );
        }
    }

    #[test]
    fn test_download_filenames_end_with_pdf() {
        for kind in DocumentKind::ALL {
            assert!(kind.download_filename().ends_with(".pdf"));
        }
    }
}
