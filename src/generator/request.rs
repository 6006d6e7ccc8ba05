use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::error::RequestError;
use crate::types::Platform;

pub const MAX_TOPIC_CHARS: usize = 500;
pub const MIN_ITERATIONS: u32 = 1;
pub const MAX_ITERATIONS: u32 = 5;
pub const MIN_THRESHOLD: u8 = 50;
pub const MAX_THRESHOLD: u8 = 100;

/// 请求边界收到的一次生成请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub platform: Platform,
    pub max_iterations: u32,
    pub approval_threshold: u8,
    /// 覆盖配置中的模型
    #[serde(default)]
    pub model: Option<String>,
}

impl GenerationRequest {
    /// 使用配置中的修订参数作为默认值
    pub fn new(topic: impl Into<String>, platform: Platform, workflow: &WorkflowConfig) -> Self {
        Self {
            topic: topic.into(),
            platform,
            max_iterations: workflow.max_iterations,
            approval_threshold: workflow.approval_threshold,
            model: None,
        }
    }

    /// 边界校验；控制器本身接受更宽的取值（例如 max_iterations = 0）
    pub fn validate(&self) -> Result<(), RequestError> {
        let len = self.topic.trim().chars().count();
        if len == 0 || len > MAX_TOPIC_CHARS {
            return Err(RequestError::TopicLength {
                len,
                max: MAX_TOPIC_CHARS,
            });
        }

        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.max_iterations) {
            return Err(RequestError::MaxIterations {
                value: self.max_iterations,
                min: MIN_ITERATIONS,
                max: MAX_ITERATIONS,
            });
        }

        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.approval_threshold) {
            return Err(RequestError::ApprovalThreshold {
                value: self.approval_threshold,
                min: MIN_THRESHOLD,
                max: MAX_THRESHOLD,
            });
        }

        Ok(())
    }
}
