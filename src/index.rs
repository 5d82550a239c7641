//! Embedding-backed nearest-neighbor index over chunks, persisted as a
//! per-fingerprint directory artifact.
//!
//! On-disk layout (opaque to everything outside this module):
//!
//! ```text
//! <character>_index/
//!   meta.json     embedding model id, dims, chunk count, build timestamp
//!   chunks.json   chunk texts + hashes, in index order
//!   vectors.bin   little-endian f32 embeddings, dims * count values
//! ```
//!
//! Publication is atomic: the artifact is written to a temporary sibling
//! directory and `rename`d into place, so a reader never observes a
//! half-written index.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::models::Chunk;

const META_FILE: &str = "meta.json";
const CHUNKS_FILE: &str = "chunks.json";
const VECTORS_FILE: &str = "vectors.bin";

#[derive(Debug, Serialize, Deserialize)]
struct IndexMeta {
    /// Embedding model the vectors were produced with. Queries must use
    /// the same model; the query path enforces this.
    model: String,
    dims: usize,
    chunk_count: usize,
    built_at: chrono::DateTime<chrono::Utc>,
}

/// An in-memory vector index: chunk texts paired with their embeddings.
/// Search is brute-force cosine similarity over all vectors.
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dims: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Builds an index from parallel chunk/vector sequences.
    pub fn build(
        model: impl Into<String>,
        dims: usize,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != vectors.len() {
            bail!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dims {
                bail!("vector {} has {} dims, expected {}", i, v.len(), dims);
            }
        }
        Ok(Self {
            model: model.into(),
            dims,
            chunks,
            vectors,
        })
    }

    /// Embedding model this index was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The `k` chunks nearest to `query` by cosine similarity, best first.
    /// Ties break by chunk order, which keeps results deterministic.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<(&Chunk, f32)> {
        let mut scored: Vec<(&Chunk, f32)> = self
            .chunks
            .iter()
            .zip(self.vectors.iter())
            .map(|(chunk, vector)| (chunk, cosine_similarity(query, vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.index.cmp(&b.0.index))
        });
        scored.truncate(k);
        scored
    }

    /// Persists the index at `dir`, atomically.
    ///
    /// The artifact is staged in a `.tmp-<uuid>` sibling and renamed into
    /// place. If a concurrent build published `dir` first, the staged copy
    /// is discarded and the existing artifact wins — a race wastes a
    /// build, never tears one.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let parent = dir
            .parent()
            .context("index directory has no parent")?;
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let staging_name = format!(
            "{}.tmp-{}",
            dir.file_name()
                .and_then(|n| n.to_str())
                .context("index directory has no file name")?,
            uuid::Uuid::new_v4()
        );
        let staging = parent.join(staging_name);
        fs::create_dir(&staging)?;

        let meta = IndexMeta {
            model: self.model.clone(),
            dims: self.dims,
            chunk_count: self.chunks.len(),
            built_at: chrono::Utc::now(),
        };
        fs::write(staging.join(META_FILE), serde_json::to_vec_pretty(&meta)?)?;
        fs::write(
            staging.join(CHUNKS_FILE),
            serde_json::to_vec_pretty(&self.chunks)?,
        )?;

        let mut blob = Vec::with_capacity(self.chunks.len() * self.dims * 4);
        for vector in &self.vectors {
            blob.extend_from_slice(&vec_to_blob(vector));
        }
        fs::write(staging.join(VECTORS_FILE), blob)?;

        match fs::rename(&staging, dir) {
            Ok(()) => Ok(()),
            Err(e) if dir.exists() => {
                let _ = fs::remove_dir_all(&staging);
                tracing::debug!(error = %e, dir = %dir.display(), "index already published, discarding staged copy");
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                Err(e).with_context(|| format!("Failed to publish index at {}", dir.display()))
            }
        }
    }

    /// Loads a previously persisted index. Fails on any structural
    /// inconsistency (missing files, truncated vectors).
    pub fn load(dir: &Path) -> Result<Self> {
        let meta: IndexMeta = serde_json::from_slice(
            &fs::read(dir.join(META_FILE))
                .with_context(|| format!("Failed to read {}", dir.join(META_FILE).display()))?,
        )?;
        let chunks: Vec<Chunk> = serde_json::from_slice(&fs::read(dir.join(CHUNKS_FILE))?)?;
        let blob = fs::read(dir.join(VECTORS_FILE))?;

        if meta.dims == 0 {
            bail!("index at {} is corrupt: dims is 0", dir.display());
        }
        if chunks.len() != meta.chunk_count {
            bail!(
                "index at {} is corrupt: meta says {} chunks, found {}",
                dir.display(),
                meta.chunk_count,
                chunks.len()
            );
        }
        if blob.len() != meta.chunk_count * meta.dims * 4 {
            bail!(
                "index at {} is corrupt: vector blob is {} bytes, expected {}",
                dir.display(),
                blob.len(),
                meta.chunk_count * meta.dims * 4
            );
        }

        let vectors: Vec<Vec<f32>> = blob
            .chunks(meta.dims * 4)
            .map(blob_to_vec)
            .collect();

        Self::build(meta.model, meta.dims, chunks, vectors)
    }
}
