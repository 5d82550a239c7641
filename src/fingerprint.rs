//! Deterministic, filesystem-safe cache keys for (game, character) pairs.
//!
//! Both the canonical markdown artifact and the vector index artifact live
//! at paths derived from the same sanitized components, so the cache
//! manager and the index never disagree about where an entity's data
//! belongs. Resolution is a pure string transform and never fails.

use std::path::PathBuf;

use crate::config::StorageConfig;

/// Resolved artifact locations for one (game, character) fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Canonical markdown document: `<processed_root>/<game>/<character>.md`.
    pub canonical: PathBuf,
    /// Vector index directory: `<index_root>/<game>/<character>_index/`.
    pub index_dir: PathBuf,
    /// Human-readable `game/character` key used in logs and errors.
    pub fingerprint: String,
}

/// Sanitizes one identifier component into the restricted character set of
/// word characters, hyphen, and underscore.
///
/// Rule: trim surrounding whitespace, replace every character that is not
/// a word character, whitespace, or hyphen with `_`, then collapse each
/// whitespace run into a single `_`. Underscores produced by replacement
/// are kept (so
/// `"Elden Ring!"` becomes `"Elden_Ring_"`), which makes the transform
/// idempotent: sanitizing an already-sanitized string is a no-op.
///
/// Two raw identifiers that sanitize to the same string share a
/// fingerprint. That collision is an accepted boundary of the cache key
/// scheme, not something this function tries to disambiguate.
pub fn sanitize_component(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut out = String::with_capacity(replaced.len());
    let mut in_whitespace = false;
    for c in replaced.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// Derives the artifact paths for a (game, character) pair.
pub fn resolve(storage: &StorageConfig, game: &str, character: &str) -> ArtifactPaths {
    let game_folder = sanitize_component(game);
    let entity = sanitize_component(character);

    ArtifactPaths {
        canonical: storage
            .processed_root
            .join(&game_folder)
            .join(format!("{entity}.md")),
        index_dir: storage
            .index_root
            .join(&game_folder)
            .join(format!("{entity}_index")),
        fingerprint: format!("{game_folder}/{entity}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn storage() -> StorageConfig {
        StorageConfig {
            processed_root: PathBuf::from("/data/processed"),
            index_root: PathBuf::from("/data/index"),
        }
    }

    #[test]
    fn sanitize_replaces_punctuation_and_whitespace() {
        assert_eq!(sanitize_component("Elden Ring!"), "Elden_Ring_");
        assert_eq!(
            sanitize_component("Malenia, Blade of Miquella"),
            "Malenia__Blade_of_Miquella"
        );
    }

    #[test]
    fn sanitize_trims_surrounding_whitespace_only() {
        assert_eq!(sanitize_component("  Hollow Knight  "), "Hollow_Knight");
        assert_eq!(sanitize_component("already_clean-name"), "already_clean-name");
    }

    #[test]
    fn sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize_component("a \t\n b"), "a_b");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["Elden Ring!", "Malenia, Blade of Miquella", "Bio?", "  x  "] {
            let once = sanitize_component(raw);
            assert_eq!(sanitize_component(&once), once, "raw = {raw:?}");
        }
    }

    #[test]
    fn resolve_builds_expected_paths() {
        let paths = resolve(&storage(), "Elden Ring!", "Malenia, Blade of Miquella");
        assert_eq!(
            paths.canonical,
            Path::new("/data/processed/Elden_Ring_/Malenia__Blade_of_Miquella.md")
        );
        assert_eq!(
            paths.index_dir,
            Path::new("/data/index/Elden_Ring_/Malenia__Blade_of_Miquella_index")
        );
        assert_eq!(paths.fingerprint, "Elden_Ring_/Malenia__Blade_of_Miquella");
    }

    #[test]
    fn colliding_identifiers_share_a_fingerprint() {
        // Accepted boundary: distinct raw names, same cache key.
        let a = resolve(&storage(), "Elden Ring!", "Melina");
        let b = resolve(&storage(), "Elden Ring?", "Melina");
        assert_eq!(a, b);
    }
}
