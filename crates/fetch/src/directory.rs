//! Critics directory scanner.
//!
//! The directory is split into one listing page per initial letter. Each
//! listing is scanned independently: a partition that fails or yields no
//! entries is logged and skipped.

use crate::endpoints::{DEFAULT_PARTITIONS, Endpoints};
use crate::transport::Transport;
use once_cell::sync::Lazy;
use records::{Critic, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

static CRITIC_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<a class="critic-authors__name" href="/critics/([^"]+)" data-qa="critic-item-link">(.+?)</a>"#,
    )
    .expect("valid regex")
});

/// Enumerates every critic listed in the source's directory
pub struct DirectoryScanner<T: Transport> {
    transport: Arc<T>,
    endpoints: Endpoints,
    partitions: Vec<char>,
}

impl<T: Transport> DirectoryScanner<T> {
    pub fn new(transport: Arc<T>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            partitions: DEFAULT_PARTITIONS.chars().collect(),
        }
    }

    /// Configure the partition keys to scan (default: `a` to `z`)
    pub fn with_partitions(mut self, partitions: impl IntoIterator<Item = char>) -> Self {
        self.partitions = partitions.into_iter().collect();
        self
    }

    /// Scan every partition in order and concatenate their critics
    #[instrument(skip(self), fields(partitions = self.partitions.len()))]
    pub async fn scan_all(&self) -> Vec<Critic> {
        let mut critics = Vec::new();

        for &key in &self.partitions {
            match self.scan_partition(key).await {
                Ok(found) if found.is_empty() => {
                    warn!(partition = %key, "Partition listed no critics");
                }
                Ok(found) => {
                    debug!(partition = %key, count = found.len(), "Partition scanned");
                    critics.extend(found);
                }
                Err(err) => {
                    warn!(partition = %key, error = %err, "Skipping partition");
                }
            }
        }

        info!("Found {} critics", critics.len());
        critics
    }

    async fn scan_partition(&self, key: char) -> Result<Vec<Critic>> {
        let url = self.endpoints.directory_partition(key);
        let body = self.transport.get(&url).await?;
        Ok(extract_critics(&body))
    }
}

/// Pull every critic entry out of a directory listing page.
///
/// Entries whose id is not a single URL-safe segment are logged and dropped.
pub fn extract_critics(html: &str) -> Vec<Critic> {
    CRITIC_ENTRY
        .captures_iter(html)
        .map(|caps| Critic::new(caps[2].trim(), &caps[1]))
        .filter(|critic| {
            let safe = critic.has_safe_id();
            if !safe {
                warn!(id = %critic.id, "Skipping critic with unsafe id");
            }
            safe
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CannedTransport;

    const BASE: &str = "http://source.test";

    fn entry(id: &str, name: &str) -> String {
        format!(
            r#"<a class="critic-authors__name" href="/critics/{id}" data-qa="critic-item-link">{name}</a>"#
        )
    }

    #[test]
    fn test_extract_critics_from_single_line() {
        let html = format!("<ul><li>{}</li><li>{}</li></ul>", entry("ann-a", "Ann A"), entry("al-b", "Al B"));

        let critics = extract_critics(&html);
        assert_eq!(critics, vec![Critic::new("Ann A", "ann-a"), Critic::new("Al B", "al-b")]);
    }

    #[test]
    fn test_extract_critics_drops_unsafe_ids() {
        let html = [
            entry("../../etc/evil", "Evil"),
            entry("..", "Dots"),
            entry("a/b", "Nested"),
            entry("ok-id", "Ok"),
        ]
        .concat();

        let critics = extract_critics(&html);
        assert_eq!(critics, vec![Critic::new("Ok", "ok-id")]);
    }

    #[tokio::test]
    async fn test_scan_skips_failed_and_empty_partitions() {
        let endpoints = Endpoints::new(BASE);
        let transport = CannedTransport::new()
            .with_body(endpoints.directory_partition('a'), entry("ann-a", "Ann A"))
            .with_status(endpoints.directory_partition('b'), 503)
            .with_body(endpoints.directory_partition('c'), "<html>empty</html>")
            .with_body(
                endpoints.directory_partition('d'),
                format!("{}\n{}", entry("dan-d", "Dan D"), entry("dee-d", "Dee D")),
            );
        let transport = Arc::new(transport);

        let scanner = DirectoryScanner::new(Arc::clone(&transport), endpoints)
            .with_partitions(['a', 'b', 'c', 'd']);
        let critics = scanner.scan_all().await;

        let ids: Vec<&str> = critics.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ann-a", "dan-d", "dee-d"]);
        assert_eq!(transport.requests().len(), 4);
    }
}
