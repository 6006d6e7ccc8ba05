use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::CapabilityError;
use crate::search::{SearchEngine, SearchResult};

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    answer: Option<String>,
}

/// Tavily 检索客户端
pub struct TavilyClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl TavilyClient {
    pub fn new(config: SearchConfig) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CapabilityError::Client {
                capability: "search",
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchEngine for TavilyClient {
    fn name(&self) -> &str {
        "Tavily"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        tracing::info!("🔎 Tavily 检索: {}", query);

        let body = TavilyRequest {
            api_key: &self.config.api_key,
            query,
            max_results,
            search_depth: &self.config.search_depth,
            include_answer: true,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::Timeout {
                        capability: "search",
                        seconds: self.config.timeout_seconds,
                    }
                } else {
                    CapabilityError::Search(format!("Tavily request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Search(format!(
                "Tavily API error ({}): {}",
                status.as_u16(),
                err_body
            )));
        }

        let data: TavilyResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::Search(format!("Failed to parse Tavily response: {}", e)))?;

        if let Some(answer) = data.answer.as_deref().filter(|a| !a.is_empty()) {
            tracing::debug!("Tavily answer: {}", answer);
        }

        let mut results = data.results;
        results.truncate(max_results);
        tracing::info!("   找到 {} 条检索结果", results.len());
        Ok(results)
    }
}
