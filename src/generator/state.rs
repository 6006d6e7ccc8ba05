use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;
use crate::generator::draft::DraftOutcome;
use crate::generator::research::ResearchOutcome;
use crate::generator::review::ReviewOutcome;
use crate::types::{Angle, Platform};

/// 工作流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Researched,
    Drafted,
    NeedsRevision,
    Approved,
    Failed,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkflowStatus::Initialized => "initialized",
            WorkflowStatus::Researched => "researched",
            WorkflowStatus::Drafted => "drafted",
            WorkflowStatus::NeedsRevision => "needs_revision",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// 不变量被破坏
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("workflow invariant violated: {0}")]
pub struct InvariantViolation(pub String);

/// 单次生成请求的全部状态
///
/// 各阶段只读访问状态，产出的结果通过 `apply_*` 方法写回，
/// 每个方法只触碰对应阶段负责的字段。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    topic: String,
    platform: Platform,
    max_iterations: u32,
    approval_threshold: u8,

    angles: Vec<Angle>,

    current_draft: String,
    draft_history: Vec<String>,

    current_score: u8,
    score_history: Vec<u8>,

    current_feedback: String,
    feedback_history: Vec<String>,

    iteration_count: u32,
    final_content: Option<String>,
    status: WorkflowStatus,
    error: Option<String>,
}

impl WorkflowState {
    pub fn new(
        topic: impl Into<String>,
        platform: Platform,
        max_iterations: u32,
        approval_threshold: u8,
    ) -> Self {
        Self {
            topic: topic.into(),
            platform,
            max_iterations,
            approval_threshold: approval_threshold.min(100),
            angles: Vec::new(),
            current_draft: String::new(),
            draft_history: Vec::new(),
            current_score: 0,
            score_history: Vec::new(),
            current_feedback: String::new(),
            feedback_history: Vec::new(),
            iteration_count: 0,
            final_content: None,
            status: WorkflowStatus::Initialized,
            error: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn approval_threshold(&self) -> u8 {
        self.approval_threshold
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    pub fn current_draft(&self) -> &str {
        &self.current_draft
    }

    pub fn draft_history(&self) -> &[String] {
        &self.draft_history
    }

    pub fn current_score(&self) -> u8 {
        self.current_score
    }

    pub fn score_history(&self) -> &[u8] {
        &self.score_history
    }

    pub fn current_feedback(&self) -> &str {
        &self.current_feedback
    }

    pub fn feedback_history(&self) -> &[String] {
        &self.feedback_history
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn final_content(&self) -> Option<&str> {
        self.final_content.as_deref()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 已完成（已评分）的起草+审核轮数
    pub fn completed_cycles(&self) -> usize {
        self.score_history.len()
    }

    /// 下一次起草要针对的上一轮反馈
    pub fn steering_feedback(&self) -> Option<&str> {
        let feedback = self.current_feedback.trim();
        if feedback.is_empty() {
            None
        } else {
            Some(feedback)
        }
    }

    /// 写入调研结果
    pub fn apply_research(&mut self, outcome: ResearchOutcome) {
        self.angles = outcome.angles;
        self.status = WorkflowStatus::Researched;
    }

    /// 写入新草稿
    pub fn apply_draft(&mut self, outcome: DraftOutcome) {
        self.current_draft = outcome.draft.clone();
        self.draft_history.push(outcome.draft);
        self.status = WorkflowStatus::Drafted;
    }

    /// 写入审核结果，分数与反馈无论是否通过都会进入历史
    pub fn apply_review(&mut self, outcome: ReviewOutcome) {
        self.current_score = outcome.score;
        self.score_history.push(outcome.score);
        self.current_feedback = outcome.feedback.clone();
        self.feedback_history.push(outcome.feedback);

        match outcome.final_content {
            Some(content) => {
                self.final_content = Some(content);
                self.status = WorkflowStatus::Approved;
            }
            None => {
                self.final_content = None;
                self.status = WorkflowStatus::NeedsRevision;
            }
        }
    }

    /// 开始新一轮修订：只做计数，发生在下一次起草之前
    pub fn begin_revision(&mut self) {
        debug_assert_eq!(self.status, WorkflowStatus::NeedsRevision);
        self.iteration_count += 1;
    }

    /// 阶段失败，记录错误并进入终态
    pub fn fail(&mut self, error: &CapabilityError) {
        self.error = Some(error.to_string());
        self.final_content = None;
        self.status = WorkflowStatus::Failed;
    }

    /// 校验状态不变量
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let drafts = self.draft_history.len();
        let scores = self.score_history.len();
        let feedbacks = self.feedback_history.len();

        if scores != feedbacks {
            return Err(InvariantViolation(format!(
                "{} scores but {} feedbacks",
                scores, feedbacks
            )));
        }

        let unscored_draft_allowed = matches!(
            self.status,
            WorkflowStatus::Drafted | WorkflowStatus::Failed
        );
        let aligned = drafts == scores || (unscored_draft_allowed && drafts == scores + 1);
        if !aligned {
            return Err(InvariantViolation(format!(
                "{} drafts but {} scores in status {}",
                drafts, scores, self.status
            )));
        }

        if self.iteration_count > self.max_iterations {
            return Err(InvariantViolation(format!(
                "iteration_count {} exceeds max_iterations {}",
                self.iteration_count, self.max_iterations
            )));
        }

        if self.final_content.is_some() != (self.status == WorkflowStatus::Approved) {
            return Err(InvariantViolation(format!(
                "final_content presence does not match status {}",
                self.status
            )));
        }

        if self
            .final_content
            .as_deref()
            .is_some_and(|content| content.trim().is_empty())
        {
            return Err(InvariantViolation(
                "approved with empty final_content".to_string(),
            ));
        }

        if self.error.is_some() != (self.status == WorkflowStatus::Failed) {
            return Err(InvariantViolation(format!(
                "error presence does not match status {}",
                self.status
            )));
        }

        Ok(())
    }
}
