//! Default on-disk locations used by the CLI.

pub const RECORD_EXTENSION: &str = "jsonl";

pub const DEFAULT_CRITICS_FILE: &str = "./tmp/critics.jsonl";
pub const DEFAULT_REVIEWS_DIR: &str = "./tmp/reviews";
pub const DEFAULT_NORMALIZED_DIR: &str = "./tmp/normalized";
pub const DEFAULT_MEDIA_FILE: &str = "./tmp/media.jsonl";
pub const DEFAULT_REFERENCE_FILE: &str = "./tmp/reference.jsonl";
