//! 文本生成能力

use async_trait::async_trait;

use crate::error::CapabilityError;

pub mod client;

pub use client::LLMClient;

/// 一次文本生成调用
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCall {
    /// 系统提示词
    pub preamble: String,
    /// 用户提示词
    pub prompt: String,
    /// 温度，范围 [0, ~1]
    pub temperature: f64,
    /// 最大输出tokens
    pub max_tokens: u32,
}

impl GenerationCall {
    pub fn new(preamble: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// 文本生成能力：给定提示词与温度，同步返回完整文本，要么成功要么整体失败
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 当前使用的模型名称
    fn model_name(&self) -> &str;

    async fn generate(&self, call: &GenerationCall) -> Result<String, CapabilityError>;
}
