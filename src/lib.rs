//! # Lorebook
//!
//! Turns a harvested wiki page into a queryable knowledge snippet about a
//! game character: segments raw HTML into an ordered, typed document,
//! builds and caches a per-(game, character) vector index over it, and
//! answers natural-language questions with retrieval-augmented generation.
//!
//! ## Pipeline
//!
//! ```text
//! raw HTML ──▶ segment ──▶ canonical markdown ──▶ chunk ──▶ embed
//!                              │ (persisted)                  │
//!                              ▼                              ▼
//!                        processed/<game>/           index/<game>/
//!                        <character>.md              <character>_index/
//!                                                          │
//!                          question ──▶ retrieve top-k ────┘
//!                                          │
//!                                          ▼
//!                                 grounded prompt ──▶ generate ──▶ answer
//! ```
//!
//! Artifacts are keyed by a deterministic fingerprint derived from the
//! sanitized (game, character) pair; an index is built at most once per
//! fingerprint and reused on every later query.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration |
//! | [`models`] | Block / Section / Document / Chunk types |
//! | [`segment`] | HTML → structured document segmentation |
//! | [`markdown`] | Canonical markdown rendering |
//! | [`fingerprint`] | Cache-key sanitization and path resolution |
//! | [`chunk`] | Sliding-window chunking |
//! | [`embedding`] | Embedding provider + vector utilities |
//! | [`index`] | Persisted vector index |
//! | [`cache`] | Artifact lifecycle (`ensure_index`) |
//! | [`generation`] | Generation provider |
//! | [`query`] | Retrieval-augmented answering |
//! | [`error`] | Typed failure taxonomy |

pub mod cache;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod generation;
pub mod index;
pub mod markdown;
pub mod models;
pub mod query;
pub mod segment;

pub use error::PipelineError;
