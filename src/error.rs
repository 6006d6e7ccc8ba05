use thiserror::Error;

/// 顶层错误
///
/// 阶段内部的失败不会走到这里：它们被写进 `WorkflowState` 的 `status`/`error`，
/// 只有配置错误、请求校验错误和控制器边界之外的能力调用错误才会向上传播。
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// 配置错误，在任何阶段运行之前检查
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is missing, set it in the config file or via the {env} environment variable")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 外部能力（搜索、文本生成）调用失败
///
/// 超时与其他失败一视同仁，阶段内不重试。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    #[error("search failed: {0}")]
    Search(String),

    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("{capability} call timed out after {seconds}s")]
    Timeout {
        capability: &'static str,
        seconds: u64,
    },

    #[error("failed to build {capability} client: {message}")]
    Client {
        capability: &'static str,
        message: String,
    },
}

/// 请求边界的参数校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("topic must be between 1 and {max} characters, got {len}")]
    TopicLength { len: usize, max: usize },

    #[error("max_iterations must be within [{min}, {max}], got {value}")]
    MaxIterations { value: u32, min: u32, max: u32 },

    #[error("approval_threshold must be within [{min}, {max}], got {value}")]
    ApprovalThreshold { value: u8, min: u8, max: u8 },

    #[error("unknown platform: {0} (expected twitter or linkedin)")]
    Platform(String),
}
