use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;
use uuid::Uuid;

use crate::generator::outlet::report::GenerationReport;
use crate::generator::state::WorkflowStatus;
use crate::generator::workflow::Step;
use crate::types::Platform;

/// 渐进式交付事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    Started {
        run_id: Uuid,
        topic: String,
        platform: Platform,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// 每次状态转移之后发出
    Stage {
        run_id: Uuid,
        step: Step,
        status: WorkflowStatus,
        iteration_count: u32,
        timestamp: DateTime<Utc>,
    },
    Complete {
        data: Box<GenerationReport>,
    },
    Error {
        run_id: Option<Uuid>,
        message: String,
    },
}

impl WorkflowEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowEvent::Complete { .. } | WorkflowEvent::Error { .. })
    }
}

/// 事件接收端
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &WorkflowEvent);
}

/// 丢弃所有事件
#[derive(Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &WorkflowEvent) {}
}

/// 把事件保存在内存中
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &WorkflowEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// 以 `data: {json}` 的 SSE 帧格式写出事件
pub struct SseSink<W: Write + Send> {
    writer: Mutex<W>,
    include_stages: bool,
}

impl<W: Write + Send> SseSink<W> {
    pub fn new(writer: W, include_stages: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            include_stages,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> EventSink for SseSink<W> {
    fn emit(&self, event: &WorkflowEvent) {
        if !self.include_stages && matches!(event, WorkflowEvent::Stage { .. }) {
            return;
        }

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("⚠️ 事件序列化失败: {}", e);
                return;
            }
        };

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = write!(writer, "data: {}\n\n", payload).and_then(|_| writer.flush()) {
            tracing::warn!("⚠️ 事件写出失败: {}", e);
        }
    }
}
