use std::sync::Arc;

use crate::config::Config;
use crate::error::CapabilityError;
use crate::llm::{LLMClient, TextGenerator};
use crate::search::{SearchEngine, TavilyClient};

/// 生成器上下文：不可变配置 + 外部能力句柄，可在多个请求间共享
#[derive(Clone)]
pub struct GeneratorContext {
    /// 文本生成能力
    pub generator: Arc<dyn TextGenerator>,
    /// 检索能力
    pub search: Arc<dyn SearchEngine>,
    /// 配置
    pub config: Arc<Config>,
}

impl GeneratorContext {
    /// 按配置创建真实的LLM与检索客户端
    pub fn new(config: Config) -> Result<Self, CapabilityError> {
        let generator = Arc::new(LLMClient::new(config.llm.clone())?);
        let search = Arc::new(TavilyClient::new(config.search.clone())?);
        Ok(Self::with_capabilities(config, generator, search))
    }

    /// 使用外部提供的能力实现创建上下文
    pub fn with_capabilities(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn SearchEngine>,
    ) -> Self {
        Self {
            generator,
            search,
            config: Arc::new(config),
        }
    }
}
