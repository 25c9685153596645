//! # Records Crate
//!
//! Data model and persistence shared by every stage of the critics finder.
//!
//! ## Main Components
//!
//! - **types**: Domain types (Critic, RawReview, NormalizedReview, Media, ScoredCritic)
//! - **error**: The closed error taxonomy (`FinderError`, `ErrorKind`)
//! - **store**: JSON-lines `RecordStore` used for every on-disk list
//! - **paths**: Default file and directory locations
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::{Critic, JsonLinesStore, RecordStore};
//! use std::path::Path;
//!
//! let critics: Vec<Critic> = JsonLinesStore.read(Path::new("tmp/critics.jsonl"))?;
//! println!("Loaded {} critics", critics.len());
//! ```

pub mod error;
pub mod paths;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, FinderError, Result};
pub use store::{JsonLinesStore, RecordStore, ensure_dir, list_record_files};
pub use types::{
    // Type aliases
    CriticId,
    // Core types
    Critic,
    Media,
    NormalizedReview,
    RawReview,
    ScoredCritic,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critic_file_name() {
        let critic = Critic::new("Roger Ebert", "roger-ebert");
        assert_eq!(critic.file_name(), "roger-ebert.jsonl");
        assert_eq!(critic.to_string(), "Roger Ebert (roger-ebert)");
    }

    #[test]
    fn test_critic_id_safety() {
        for id in ["roger-ebert", "a_b.c", "x1"] {
            assert!(Critic::new("n", id).has_safe_id(), "{id}");
        }
        for id in ["", ".", "..", "../../etc/evil", "a/b", "a b", "a%2F", "é"] {
            assert!(!Critic::new("n", id).has_safe_id(), "{id}");
        }
    }

    #[test]
    fn test_media_from_review() {
        let review = RawReview {
            score: "3/4".to_string(),
            media_title: "Heat".to_string(),
            media_info: "1995".to_string(),
            media_url: "/m/heat".to_string(),
        };

        let media = Media::from(&review);
        assert_eq!(media.title, "Heat");
        assert_eq!(media.media_url, "/m/heat");
        assert_eq!(media.to_string(), "Heat [1995]");
    }

    #[test]
    fn test_scored_critic_comparable() {
        let critic = Critic::new("a", "a");
        let close = ScoredCritic { critic: critic.clone(), score: 0.0 };
        let unknown = ScoredCritic { critic, score: f64::INFINITY };

        assert!(close.is_comparable());
        assert!(!unknown.is_comparable());
    }
}
