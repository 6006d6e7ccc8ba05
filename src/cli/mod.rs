use crate::config::{Config, LLMProvider};
use crate::error::{ConfigError, RequestError, WorkflowError};
use crate::generator::outlet::EventSink;
use crate::generator::request::GenerationRequest;
use crate::generator::workflow::emit_error;
use crate::types::Platform;
use clap::Parser;
use std::path::PathBuf;

/// Viral Agent - 调研、起草、审核循环驱动的社交媒体内容生成器
#[derive(Parser, Debug)]
#[command(name = "viral-agent")]
#[command(
    about = "Researches a topic, drafts platform-specific social media content and revises it until a reviewer approves it or the revision budget runs out."
)]
#[command(version)]
pub struct Args {
    /// 内容主题
    pub topic: Option<String>,

    /// 目标平台 (twitter, linkedin)
    #[arg(short, long, default_value = "twitter")]
    pub platform: String,

    /// 最大修订轮数
    #[arg(short, long)]
    pub max_iterations: Option<u32>,

    /// 审核通过阈值
    #[arg(short, long)]
    pub threshold: Option<u8>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// LLM Provider (openai, groq, mistral, openrouter, anthropic, deepseek, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// Tavily API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 每次检索的最大结果数
    #[arg(long)]
    pub max_results: Option<usize>,

    /// 以 `data: {json}` 事件流输出进度与结果
    #[arg(long)]
    pub stream: bool,

    /// 以 JSON 输出最终报告
    #[arg(long, conflicts_with = "stream")]
    pub json: bool,

    /// 报告 JSON 的保存路径
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 只校验配置并探测模型连接
    #[arg(long)]
    pub check: bool,

    /// 列出推荐模型
    #[arg(long)]
    pub list_models: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            // 显式指定的配置文件必须可读
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = Config::default_path();
                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(ConfigError::Invalid)?;
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(llm_api_key) = &self.llm_api_key {
            config.llm.api_key = llm_api_key.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }

        // 覆盖搜索配置
        if let Some(search_api_key) = &self.search_api_key {
            config.search.api_key = search_api_key.clone();
        }
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }

        // 修订循环配置
        if let Some(max_iterations) = self.max_iterations {
            config.workflow.max_iterations = max_iterations;
        }
        if let Some(threshold) = self.threshold {
            config.workflow.approval_threshold = threshold;
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }

    /// 构造生成请求，未给出的修订参数取自配置
    pub fn into_request(&self, config: &Config) -> Result<GenerationRequest, RequestError> {
        let platform = self.platform.parse::<Platform>()?;
        let topic = self.topic.clone().unwrap_or_default();

        let mut request = GenerationRequest::new(topic, platform, &config.workflow);
        request.model = self.model.clone();
        request.validate()?;

        Ok(request)
    }

    /// 同 `into_request`，失败时同时写入事件流
    pub fn into_request_or_emit(
        &self,
        config: &Config,
        sink: &dyn EventSink,
    ) -> Result<GenerationRequest, RequestError> {
        self.into_request(config)
            .inspect_err(|e| emit_error(sink, &WorkflowError::from(e.clone())))
    }

    /// `-v` 或配置文件中的 `verbose` 任一开启即输出调试日志
    pub fn verbose_logging(&self, config: Option<&Config>) -> bool {
        self.verbose || config.is_some_and(|config| config.verbose)
    }
}
