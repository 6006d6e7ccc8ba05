//! LLM Provider支持模块

use rig::{agent::Agent, client::CompletionClient, completion::Prompt};

use crate::config::{LLMConfig, LLMProvider};
use crate::error::CapabilityError;
use crate::llm::GenerationCall;

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Mistral(rig::providers::mistral::Client),
    OpenRouter(rig::providers::openrouter::Client),
    Anthropic(rig::providers::anthropic::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    pub fn new(config: &LLMConfig) -> Result<Self, CapabilityError> {
        match config.provider {
            LLMProvider::OpenAI => {
                let client = rig::providers::openai::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::OpenAI(client))
            }
            LLMProvider::DeepSeek => {
                let client = rig::providers::deepseek::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build();
                Ok(ProviderClient::DeepSeek(client))
            }
            LLMProvider::Mistral => {
                let client = rig::providers::mistral::Client::builder(&config.api_key).build();
                Ok(ProviderClient::Mistral(client))
            }
            LLMProvider::OpenRouter => {
                let client = rig::providers::openrouter::Client::builder(&config.api_key).build();
                Ok(ProviderClient::OpenRouter(client))
            }
            LLMProvider::Anthropic => {
                let client = rig::providers::anthropic::ClientBuilder::new(&config.api_key)
                    .build()
                    .map_err(|e| CapabilityError::Client {
                        capability: "anthropic",
                        message: e.to_string(),
                    })?;
                Ok(ProviderClient::Anthropic(client))
            }
            LLMProvider::Ollama => {
                let client = rig::providers::ollama::Client::builder().build();
                Ok(ProviderClient::Ollama(client))
            }
        }
    }

    /// 按单次调用的温度与输出上限创建Agent
    pub fn create_agent(&self, model: &str, call: &GenerationCall) -> ProviderAgent {
        let max_tokens: u64 = call.max_tokens.into();

        match self {
            ProviderClient::OpenAI(client) => {
                let agent = client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(&call.preamble)
                    .max_tokens(max_tokens)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::OpenAI(agent)
            }
            ProviderClient::DeepSeek(client) => {
                let agent = client
                    .agent(model)
                    .preamble(&call.preamble)
                    .max_tokens(max_tokens)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::DeepSeek(agent)
            }
            ProviderClient::Mistral(client) => {
                let agent = client
                    .agent(model)
                    .preamble(&call.preamble)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::Mistral(agent)
            }
            ProviderClient::OpenRouter(client) => {
                let agent = client
                    .agent(model)
                    .preamble(&call.preamble)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::OpenRouter(agent)
            }
            ProviderClient::Anthropic(client) => {
                let agent = client
                    .agent(model)
                    .preamble(&call.preamble)
                    .max_tokens(max_tokens)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::Anthropic(agent)
            }
            ProviderClient::Ollama(client) => {
                let agent = client
                    .agent(model)
                    .preamble(&call.preamble)
                    .max_tokens(max_tokens)
                    .temperature(call.temperature)
                    .build();
                ProviderAgent::Ollama(agent)
            }
        }
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Mistral(Agent<rig::providers::mistral::CompletionModel>),
    OpenRouter(Agent<rig::providers::openrouter::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 执行单轮prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String, CapabilityError> {
        let result = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await,
            ProviderAgent::Mistral(agent) => agent.prompt(prompt).await,
            ProviderAgent::OpenRouter(agent) => agent.prompt(prompt).await,
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await,
        };
        result.map_err(|e| CapabilityError::Generation(e.to_string()))
    }
}
