// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contract for movie/series metadata sources (IMDb, TMDb, TVmaze, ...).
//!
//! Only the interface lives here; jobs that look up release metadata are
//! written against it.

use async_trait::async_trait;
use thiserror::Error;

/// A request to a remote service failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RequestError(pub String);

/// What kind of release is being searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseType {
    #[default]
    Unknown,
    Movie,
    Series,
}

relprep_core::simple_display! {
    ReleaseType {
        Unknown => "unknown",
        Movie => "movie",
        Series => "series",
    }
}

/// Search parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub title: String,
    pub year: Option<String>,
    pub kind: ReleaseType,
}

impl Query {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Parse "Title year:2005 type:movie" style queries.
    pub fn parse(text: &str) -> Self {
        let mut query = Query::default();
        let mut words = Vec::new();
        for word in text.split_whitespace() {
            match word.split_once(':') {
                Some(("year", year)) if !year.is_empty() => query.year = Some(year.to_string()),
                Some(("type", "movie")) => query.kind = ReleaseType::Movie,
                Some(("type", "series" | "tv" | "season" | "episode")) => {
                    query.kind = ReleaseType::Series
                }
                _ => words.push(word),
            }
        }
        query.title = words.join(" ");
        query
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub year: String,
    pub kind: ReleaseType,
    pub url: String,
}

/// Adapter for a metadata web service
#[async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    /// Short name, e.g. "imdb"
    fn name(&self) -> &str;

    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, RequestError>;

    async fn summary(&self, id: &str) -> Result<String, RequestError>;

    async fn year(&self, id: &str) -> Result<String, RequestError>;

    async fn title_original(&self, id: &str) -> Result<String, RequestError>;

    async fn title_english(&self, id: &str) -> Result<String, RequestError>;

    async fn countries(&self, id: &str) -> Result<Vec<String>, RequestError>;

    async fn cast(&self, id: &str) -> Result<Vec<String>, RequestError>;
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
