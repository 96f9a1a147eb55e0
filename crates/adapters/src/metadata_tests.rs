// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain       = { "The Foo", Query { title: "The Foo".into(), year: None, kind: ReleaseType::Unknown } },
    year        = { "The Foo year:2005", Query { title: "The Foo".into(), year: Some("2005".into()), kind: ReleaseType::Unknown } },
    movie       = { "type:movie  Foo", Query { title: "Foo".into(), year: None, kind: ReleaseType::Movie } },
    series      = { "Foo type:tv year:1999", Query { title: "Foo".into(), year: Some("1999".into()), kind: ReleaseType::Series } },
    unknown_key = { "Foo: Bar", Query { title: "Foo: Bar".into(), year: None, kind: ReleaseType::Unknown } },
)]
fn parse_query(text: &str, expected: Query) {
    assert_eq!(Query::parse(text), expected);
}

struct StaticSource;

#[async_trait]
impl MetadataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, RequestError> {
        if query.title.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![SearchResult {
            id: "tt1".into(),
            title: query.title.clone(),
            year: "2001".into(),
            kind: ReleaseType::Movie,
            url: "https://example.org/tt1".into(),
        }])
    }

    async fn summary(&self, _id: &str) -> Result<String, RequestError> {
        Err(RequestError("Service unavailable".into()))
    }

    async fn year(&self, _id: &str) -> Result<String, RequestError> {
        Ok("2001".into())
    }

    async fn title_original(&self, _id: &str) -> Result<String, RequestError> {
        Ok("Le Foo".into())
    }

    async fn title_english(&self, _id: &str) -> Result<String, RequestError> {
        Ok("The Foo".into())
    }

    async fn countries(&self, _id: &str) -> Result<Vec<String>, RequestError> {
        Ok(vec!["France".into()])
    }

    async fn cast(&self, _id: &str) -> Result<Vec<String>, RequestError> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn sources_are_usable_as_trait_objects() {
    let source: Box<dyn MetadataSource> = Box::new(StaticSource);

    let results = source.search(&Query::parse("The Foo year:2001")).await.unwrap();
    assert_eq!(results[0].title, "The Foo");
    assert!(source.search(&Query::default()).await.unwrap().is_empty());
    assert_eq!(source.summary("tt1").await.unwrap_err().to_string(), "Service unavailable");
    assert_eq!(source.countries("tt1").await.unwrap(), vec!["France"]);
}
