//! LLM客户端 - 基于rig的文本生成能力实现

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::error::CapabilityError;
use crate::llm::{GenerationCall, TextGenerator};

mod providers;

use providers::ProviderClient;

/// LLM客户端
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self, CapabilityError> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<(), CapabilityError> {
        tracing::info!("🔄 正在检查模型连接 ({})...", self.config.model);
        let call = GenerationCall::new("You are a helpful assistant.", "Hello")
            .temperature(0.0)
            .max_tokens(16);
        match self.generate(&call).await {
            Ok(_) => {
                tracing::info!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, call: &GenerationCall) -> Result<String, CapabilityError> {
        let max_tokens = capped_max_tokens(call.max_tokens, self.config.max_tokens);
        let call = call.clone().max_tokens(max_tokens);
        tracing::debug!(
            model = %self.config.model,
            temperature = call.temperature,
            max_tokens = call.max_tokens,
            "调用模型服务"
        );

        let agent = self.client.create_agent(&self.config.model, &call);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        let content = tokio::time::timeout(timeout, agent.prompt(&call.prompt))
            .await
            .map_err(|_| CapabilityError::Timeout {
                capability: "text generation",
                seconds: self.config.timeout_seconds,
            })??;

        tracing::debug!("模型返回 {} 个字符", content.len());
        non_empty(content)
    }
}

/// 配置中的 max_tokens 是所有调用的上限
fn capped_max_tokens(requested: u32, ceiling: u32) -> u32 {
    requested.min(ceiling)
}

/// 空白回复视为生成失败
fn non_empty(content: String) -> Result<String, CapabilityError> {
    if content.trim().is_empty() {
        return Err(CapabilityError::Generation(
            "model returned an empty response".to_string(),
        ));
    }
    Ok(content)
}
