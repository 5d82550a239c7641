//! Typed failure taxonomy for the pipeline.
//!
//! Element-level malformations during segmentation are absorbed locally
//! (logged and skipped); everything that escapes to a caller is one of
//! these variants, carrying enough context (fingerprint, stage) to explain
//! the failure without re-deriving it.

use thiserror::Error;

/// Stage label attached to an index build failure.
pub type BuildStage = &'static str;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The segmentation input had neither a `<main>` nor a `<body>` root.
    #[error("no extractable content: input has neither a <main> nor a <body> element")]
    NoContent,

    /// Embedding or persistence failed while building the vector index.
    #[error("index build failed for '{fingerprint}' during {stage}: {source}")]
    IndexBuild {
        fingerprint: String,
        stage: BuildStage,
        #[source]
        source: anyhow::Error,
    },

    /// A query hit an empty or corrupt index, or could not embed the
    /// question against the index's model.
    #[error("retrieval failed for '{fingerprint}': {reason}")]
    Retrieval { fingerprint: String, reason: String },

    /// The generation service was unreachable or returned an error.
    #[error("generation failed: {source}")]
    Generation {
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn index_build(
        fingerprint: impl Into<String>,
        stage: BuildStage,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::IndexBuild {
            fingerprint: fingerprint.into(),
            stage,
            source: source.into(),
        }
    }

    pub fn retrieval(fingerprint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Retrieval {
            fingerprint: fingerprint.into(),
            reason: reason.into(),
        }
    }

    pub fn generation(source: impl Into<anyhow::Error>) -> Self {
        Self::Generation {
            source: source.into(),
        }
    }
}
