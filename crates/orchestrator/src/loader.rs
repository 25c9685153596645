//! Parallel loading of every critic's normalized ratings.

use rayon::prelude::*;
use records::{CriticId, JsonLinesStore, NormalizedReview, RecordStore, Result, list_record_files};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Read every record file in `dir` into a map keyed by file stem (the
/// critic id). Unreadable files are logged and skipped.
pub fn load_critic_ratings(
    store: &JsonLinesStore,
    dir: &Path,
) -> Result<HashMap<CriticId, Vec<NormalizedReview>>> {
    let files = list_record_files(dir)?;

    let ratings: HashMap<CriticId, Vec<NormalizedReview>> = files
        .par_iter()
        .filter_map(|path| {
            let id = path.file_stem()?.to_str()?.to_string();
            match store.read::<NormalizedReview>(path) {
                Ok(reviews) => Some((id, reviews)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable ratings file");
                    None
                }
            }
        })
        .collect();

    info!(files = files.len(), critics = ratings.len(), "Loaded critic ratings");
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_keys_by_file_stem() {
        let dir = TempDir::new().unwrap();
        JsonLinesStore
            .write(&dir.path().join("ada.jsonl"), &[NormalizedReview::new(0.5, "/m/a")])
            .unwrap();
        JsonLinesStore
            .write(&dir.path().join("bo.jsonl"), &Vec::<NormalizedReview>::new())
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let ratings = load_critic_ratings(&JsonLinesStore, dir.path()).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings["ada"], vec![NormalizedReview::new(0.5, "/m/a")]);
        assert!(ratings["bo"].is_empty());
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_critic_ratings(&JsonLinesStore, &dir.path().join("nope")).is_err());
    }
}
