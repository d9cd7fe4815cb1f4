//! Structured transcript content stored as JSONB on the transcript row.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The editable transcript document.
///
/// `body` is optional at the serde level because ingested payloads are not
/// trusted; operations that need a body reject documents without one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranscriptContent {
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
    /// Attribution line, e.g. "username via tstbtc -- needs review"
    #[serde(default)]
    pub transcript_by: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub speakers: Vec<String>,
    /// Source media reference (YouTube URL, podcast link, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl TranscriptContent {
    /// Content-derived dedup key: sha256 over the normalized title and body.
    ///
    /// Whitespace runs collapse to a single space and casing is folded so
    /// re-ingesting the same document under trivial formatting differences
    /// maps to the same hash.
    pub fn transcript_hash(&self) -> String {
        let title = normalize(&self.title);
        let body = normalize(self.body.as_deref().unwrap_or(""));

        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(b"\n");
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
