//! 检索能力

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

pub mod tavily;

pub use tavily::TavilyClient;

/// 一条排序后的检索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    /// 相关度
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score,
        }
    }
}

/// 检索能力：给定查询与结果数上限，返回排序后的文档
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// 服务名称，用于日志
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError>;
}
