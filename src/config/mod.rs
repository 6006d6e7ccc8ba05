use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "viral-agent.toml";

/// Groq OpenAI 兼容接口上经过验证可用的模型
pub const RECOMMENDED_MODELS: &[&str] = &[
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "meta-llama/llama-4-maverick-17b-128e-instruct",
    "openai/gpt-oss-120b",
    "llama-3.3-70b-versatile",
];

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    /// OpenAI 以及任何 OpenAI 兼容接口（Groq 等）
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "groq" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置，构造控制器时注入，运行期间不可变
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// 搜索服务配置
    pub search: SearchConfig,

    /// 修订循环配置
    pub workflow: WorkflowConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 单次调用的最大输出tokens上限
    pub max_tokens: u32,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 搜索服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API KEY
    pub api_key: String,

    /// Tavily API基地址
    pub api_base_url: String,

    /// 每次检索返回的最大结果数
    pub max_results: usize,

    /// 检索深度 (basic, advanced)
    pub search_depth: String,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 修订循环配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// 最大修订轮数
    pub max_iterations: u32,

    /// 通过审核所需的最低分
    pub approval_threshold: u8,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// 当前目录下的默认配置文件路径
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE)
    }

    /// 校验配置；缺少凭证时在任何阶段运行之前报错
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider != LLMProvider::Ollama && self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "LLM API key",
                env: "VIRAL_LLM_API_KEY",
            });
        }
        if self.search.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "Tavily API key",
                env: "TAVILY_API_KEY",
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_seconds == 0 || self.search.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid(
                "search.max_results must be greater than 0".to_string(),
            ));
        }
        if self.workflow.approval_threshold > 100 {
            return Err(ConfigError::Invalid(format!(
                "workflow.approval_threshold must be within [0, 100], got {}",
                self.workflow.approval_threshold
            )));
        }
        Ok(())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("VIRAL_LLM_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .unwrap_or_default(),
            api_base_url: String::from("https://api.groq.com/openai/v1"),
            model: String::from("llama-3.3-70b-versatile"),
            max_tokens: 2000,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_results: 5,
            search_depth: String::from("advanced"),
            timeout_seconds: 60,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            approval_threshold: 85,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
