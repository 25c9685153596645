//! URL layout of the web source.

/// Base URL of the public source
pub const DEFAULT_BASE_URL: &str = "https://www.rottentomatoes.com";

/// Reviews requested per continuation page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Partition keys of the critics directory, in scan order
pub const DEFAULT_PARTITIONS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Builds every URL the scanner and the fetcher request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    page_size: u32,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Configure the continuation page size (default: 50)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Listing page of every critic whose name starts with `key`
    pub fn directory_partition(&self, key: char) -> String {
        format!("{}/critics/authors?letter={}", self.base_url, key)
    }

    /// HTML page embedding the first batch of a critic's reviews
    pub fn first_page(&self, critic_id: &str) -> String {
        format!("{}/critics/{}/movies", self.base_url, critic_id)
    }

    /// JSON endpoint returning the batch after `cursor`
    pub fn next_page(&self, critic_id: &str, cursor: &str) -> String {
        format!(
            "{}/napi/critics/{}/movies?after={}&pagecount={}",
            self.base_url,
            critic_id,
            urlencoding::encode(cursor),
            self.page_size
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
