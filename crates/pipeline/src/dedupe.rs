//! Merging of per-worker media lists.

use records::Media;
use std::collections::HashMap;
use tracing::debug;

/// Flatten `lists` into one entry per `media_url`.
///
/// When several records share a url the last one's metadata wins, but the
/// entry keeps the position where the url first appeared. Deduplicating an
/// already deduplicated list therefore returns it unchanged.
pub fn dedupe<I>(lists: I) -> Vec<Media>
where
    I: IntoIterator<Item = Vec<Media>>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Media> = Vec::new();
    let mut seen = 0usize;

    for media in lists.into_iter().flatten() {
        seen += 1;
        match positions.get(&media.media_url) {
            Some(&idx) => merged[idx] = media,
            None => {
                positions.insert(media.media_url.clone(), merged.len());
                merged.push(media);
            }
        }
    }

    debug!(seen, unique = merged.len(), "Deduplicated media");
    merged
}
