//! Retrieval-augmented query processing.
//!
//! Embeds the question with the same model the index was built with,
//! retrieves the top-k nearest chunks, binds them into a grounded prompt,
//! and makes a single generation call. The model's text comes back
//! verbatim — no post-processing, no truncation.

use tracing::debug;

use crate::embedding::{embed_query, Embedder};
use crate::error::PipelineError;
use crate::fingerprint::sanitize_component;
use crate::generation::Generator;
use crate::index::VectorIndex;

/// Answers `question` about `character` from `game`, grounded on the
/// chunks retrieved from `index`.
///
/// Fails with a retrieval error when the index is empty or was built with
/// a different embedding model than `embedder`, and with a generation
/// error when the generation service fails. An empty index is never
/// reported as an empty-string success.
pub async fn answer(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
    game: &str,
    character: &str,
    question: &str,
    top_k: usize,
) -> Result<String, PipelineError> {
    let fingerprint = format!(
        "{}/{}",
        sanitize_component(game),
        sanitize_component(character)
    );

    if index.is_empty() {
        return Err(PipelineError::retrieval(
            &fingerprint,
            "index contains no chunks",
        ));
    }

    // Build-time and query-time embedding models must match; a silent
    // mismatch would make every similarity score meaningless.
    if index.model() != embedder.model_name() {
        return Err(PipelineError::retrieval(
            &fingerprint,
            format!(
                "embedding model mismatch: index built with '{}', queried with '{}'",
                index.model(),
                embedder.model_name()
            ),
        ));
    }

    let query_vec = embed_query(embedder, question)
        .await
        .map_err(|e| PipelineError::retrieval(&fingerprint, format!("question embedding failed: {e}")))?;

    let hits = index.top_k(&query_vec, top_k);
    debug!(fingerprint = %fingerprint, retrieved = hits.len(), "retrieved context chunks");

    let context = hits
        .iter()
        .map(|(chunk, _)| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = build_prompt(character, game, &context, question);

    generator
        .generate(&prompt)
        .await
        .map_err(PipelineError::generation)
}

/// Binds {character, game, retrieved context, question} into the grounded
/// prompt template.
fn build_prompt(character: &str, game: &str, context: &str, question: &str) -> String {
    format!(
        "Provide a concise summary answering the question about {character} from the game \
         {game}, based on the context. Focus on relevant details about the character's role, \
         background, or actions related to the question.\n\n\
         Context: {context}\n\n\
         Question: {question}\n\n\
         Summary:"
    )
}
