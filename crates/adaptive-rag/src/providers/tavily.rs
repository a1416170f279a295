//! Tavily web search client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{RetrievalConfig, WebSearchConfig};
use crate::error::{Error, Result};
use crate::types::Document;

use super::web_search::WebSearch;

/// Tavily search API client
pub struct TavilySearch {
    client: Client,
    base_url: String,
    api_key: String,
    search_depth: String,
    max_results: usize,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(config: &WebSearchConfig, retrieval: &RetrievalConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("TAVILY_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            search_depth: config.search_depth.clone(),
            max_results: retrieval.web_search_k,
        })
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let url = format!("{}/search", self.base_url);
        let request = SearchRequest {
            query,
            search_depth: &self.search_depth,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::search(format!("Tavily request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::search(format!("Tavily search failed: HTTP {} - {}", status, body)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::search(format!("Failed to parse Tavily response: {}", e)))?;

        Ok(into_documents(parsed, self.max_results))
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

fn into_documents(response: SearchResponse, max_results: usize) -> Vec<Document> {
    response
        .results
        .into_iter()
        .filter(|r| !r.content.trim().is_empty())
        .take(max_results)
        .map(|r| Document::new(r.content, r.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = WebSearchConfig::default();
        assert!(matches!(
            TavilySearch::new(&config, &RetrievalConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_results_become_documents() {
        let raw = r#"{"results": [
            {"title": "a", "url": "https://a.example", "content": "Caleb Williams"},
            {"title": "b", "url": "https://b.example", "content": ""},
            {"title": "c", "url": "https://c.example", "content": "Bears draft"},
            {"title": "d", "url": "https://d.example", "content": "extra"}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        let docs = into_documents(response, 2);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source_id(), "https://a.example");
        assert_eq!(docs[1].content(), "Bears draft");
    }
}
