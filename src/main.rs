//! # Lorebook CLI (`lore`)
//!
//! Command-line front end for the wiki-lore pipeline. A fetch collaborator
//! (browser automation, out of scope here) saves a character's wiki page
//! as HTML; `lore` segments it, caches a canonical markdown document and a
//! vector index per (game, character), and answers questions against them.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lore ingest <page.html> --game G --character C [--raw]` | Build (or reuse) the canonical document and vector index |
//! | `lore ask "<question>" --game G --character C [--html page.html]` | Answer a question with retrieval-augmented generation |
//! | `lore paths --game G --character C` | Print the resolved artifact paths for a pair |
//!
//! ## Examples
//!
//! ```bash
//! lore ingest malenia.html --game "Elden Ring" --character "Malenia, Blade of Miquella"
//! lore ask "Who is Malenia's twin?" --game "Elden Ring" --character "Malenia, Blade of Miquella"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lorebook::cache::{ensure_index, CanonicalMode};
use lorebook::config::load_config;
use lorebook::embedding::create_embedder;
use lorebook::fingerprint::resolve;
use lorebook::generation::create_generator;
use lorebook::query::answer;

/// Lorebook — wiki-page segmentation and retrieval-augmented lore Q&A.
#[derive(Parser)]
#[command(
    name = "lore",
    about = "Wiki-page segmentation and retrieval-augmented lore Q&A for game characters",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lore.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or reuse) the canonical document and vector index for a page.
    ///
    /// Segments the saved HTML into a heading-scoped markdown document,
    /// persists it, chunks and embeds it, and publishes the vector index.
    /// Both artifacts are cached: a second ingest for the same pair is a
    /// no-op that reports the reuse.
    Ingest {
        /// Saved wiki page HTML file.
        html: PathBuf,

        /// Game (wiki) name, e.g. "Elden Ring".
        #[arg(long)]
        game: String,

        /// Character (page) name, e.g. "Malenia, Blade of Miquella".
        #[arg(long)]
        character: String,

        /// Convert the whole body to text instead of heading-scoped
        /// segmentation (lower fidelity, no section structure).
        #[arg(long)]
        raw: bool,
    },

    /// Answer a question about a character using retrieved page context.
    ///
    /// Requires a previously built index, or `--html` to ingest the page
    /// first.
    Ask {
        /// The question to answer.
        question: String,

        /// Game (wiki) name.
        #[arg(long)]
        game: String,

        /// Character (page) name.
        #[arg(long)]
        character: String,

        /// Saved wiki page HTML, used only when no artifacts exist yet.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Print the resolved artifact paths for a (game, character) pair.
    Paths {
        /// Game (wiki) name.
        #[arg(long)]
        game: String,

        /// Character (page) name.
        #[arg(long)]
        character: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest {
            html,
            game,
            character,
            raw,
        } => {
            let page = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read HTML file: {}", html.display()))?;
            let embedder = create_embedder(&config.embedding)?;
            let mode = if raw {
                CanonicalMode::WholeBody
            } else {
                CanonicalMode::Structured
            };

            let (index, report) =
                ensure_index(&config, embedder.as_ref(), &game, &character, Some(&page), mode)
                    .await?;

            let paths = resolve(&config.storage, &game, &character);
            println!("ingest {}", paths.fingerprint);
            if report.reused_index {
                println!("  index reused: {}", paths.index_dir.display());
            } else {
                println!(
                    "  canonical document: {} ({})",
                    paths.canonical.display(),
                    if report.reused_canonical {
                        "reused"
                    } else {
                        "written"
                    }
                );
                println!("  chunks embedded: {}", report.chunk_count);
                println!("  index written: {}", paths.index_dir.display());
            }
            println!("  indexed chunks: {}", index.len());
            println!("ok");
        }

        Commands::Ask {
            question,
            game,
            character,
            html,
        } => {
            let page = match &html {
                Some(path) => Some(std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read HTML file: {}", path.display())
                })?),
                None => None,
            };
            let embedder = create_embedder(&config.embedding)?;
            let generator = create_generator(&config.generation)?;

            let (index, _) = ensure_index(
                &config,
                embedder.as_ref(),
                &game,
                &character,
                page.as_deref(),
                CanonicalMode::Structured,
            )
            .await?;

            let text = answer(
                &index,
                embedder.as_ref(),
                generator.as_ref(),
                &game,
                &character,
                &question,
                config.retrieval.top_k,
            )
            .await?;

            println!("{text}");
        }

        Commands::Paths { game, character } => {
            let paths = resolve(&config.storage, &game, &character);
            println!("fingerprint: {}", paths.fingerprint);
            println!("canonical:   {}", paths.canonical.display());
            println!("index:       {}", paths.index_dir.display());
        }
    }

    Ok(())
}
