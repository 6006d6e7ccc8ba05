use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::state::{WorkflowState, WorkflowStatus};
use crate::generator::workflow::Termination;
use crate::types::{Angle, Platform};

/// 返回给调用方的生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub topic: String,
    pub platform: Platform,
    pub model: String,
    /// 只有通过审核时才非空
    pub final_content: String,
    /// 展示用内容：通过时为定稿，预算耗尽时为最新草稿
    pub display_content: String,
    pub virality_score: u8,
    pub iteration_count: u32,
    pub drafts: Vec<String>,
    pub scores: Vec<u8>,
    pub feedbacks: Vec<String>,
    pub angles: Vec<Angle>,
    pub status: WorkflowStatus,
    pub termination: Termination,
    pub error: Option<String>,
    pub elapsed_seconds: f64,
    pub completed_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn from_state(
        run_id: Uuid,
        model: &str,
        state: &WorkflowState,
        termination: Termination,
        elapsed_seconds: f64,
    ) -> Self {
        let final_content = state.final_content().unwrap_or_default().to_string();
        let display_content = match termination {
            Termination::Approved => final_content.clone(),
            Termination::BudgetExhausted => state.current_draft().to_string(),
            Termination::Failed | Termination::ResearchOnly => String::new(),
        };

        Self {
            run_id,
            topic: state.topic().to_string(),
            platform: state.platform(),
            model: model.to_string(),
            final_content,
            display_content,
            virality_score: state.current_score(),
            iteration_count: state.iteration_count(),
            drafts: state.draft_history().to_vec(),
            scores: state.score_history().to_vec(),
            feedbacks: state.feedback_history().to_vec(),
            angles: state.angles().to_vec(),
            status: state.status(),
            termination,
            error: state.error().map(str::to_string),
            elapsed_seconds,
            completed_at: Utc::now(),
        }
    }

    /// 是否经过审核闸门
    pub fn is_approved(&self) -> bool {
        self.status == WorkflowStatus::Approved
    }

    /// 终端展示用的摘要
    pub fn render_summary(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "📌 {} ({}) | status: {} | termination: {}\n",
            self.topic, self.platform, self.status, self.termination
        ));
        out.push_str(&format!(
            "📊 score: {}/100 | iterations: {} | scores: {:?} | {:.1}s\n",
            self.virality_score, self.iteration_count, self.scores, self.elapsed_seconds
        ));

        if !self.angles.is_empty() {
            out.push_str("\n🧭 angles:\n");
            for angle in &self.angles {
                out.push_str(&format!("- {}: {}\n", angle.title, angle.summary));
            }
        }

        if let Some(error) = &self.error {
            out.push_str(&format!("\n❌ error: {}\n", error));
        }

        if !self.display_content.is_empty() {
            if !self.is_approved() {
                out.push_str("\n⚠️ content did not pass the approval threshold\n");
            }
            out.push('\n');
            out.push_str(&self.display_content);
            out.push('\n');
        }

        out
    }
}
