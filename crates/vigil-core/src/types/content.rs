//! Daily content units.

use serde::{Deserialize, Serialize};

/// Where a content body came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Generated,
    Fallback,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Generated => "generated",
            ContentSource::Fallback => "fallback",
        }
    }
}

/// One day's devotional body. Cached per calendar date so repeated triggers
/// never re-invoke the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    pub date: chrono::NaiveDate,
    pub body: String,
    pub source: ContentSource,
}
