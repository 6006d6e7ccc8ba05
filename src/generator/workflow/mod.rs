use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;
use crate::error::WorkflowError;
use crate::generator::context::GeneratorContext;
use crate::generator::draft::DraftStage;
use crate::generator::outlet::{EventSink, GenerationReport, WorkflowEvent};
use crate::generator::request::GenerationRequest;
use crate::generator::research::ResearchStage;
use crate::generator::review::ReviewStage;
use crate::generator::state::{WorkflowState, WorkflowStatus};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: BTreeMap<&'static str, Instant>,
    phase_durations: BTreeMap<&'static str, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: BTreeMap::new(),
            phase_durations: BTreeMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &'static str) {
        self.phase_start_times.insert(phase_name, Instant::now());
    }

    /// 结束一个阶段的计时，同一阶段多次运行时累加
    pub fn end_phase(&mut self, phase_name: &'static str) -> Option<Duration> {
        let duration = self.phase_start_times.remove(phase_name)?.elapsed();
        *self.phase_durations.entry(phase_name).or_default() += duration;
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取所有阶段的执行时间
    pub fn get_phase_durations(&self) -> &BTreeMap<&'static str, Duration> {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const RESEARCH: &'static str = "research";
    pub const DRAFT: &'static str = "draft";
    pub const REVIEW: &'static str = "review";
}

/// 控制器为何停止
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Approved,
    BudgetExhausted,
    Failed,
    /// max_iterations = 0，只做了调研
    ResearchOnly,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Termination::Approved => "approved",
            Termination::BudgetExhausted => "budget_exhausted",
            Termination::Failed => "failed",
            Termination::ResearchOnly => "research_only",
        };
        write!(f, "{}", s)
    }
}

/// 控制器的下一步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Research,
    /// 起草 + 审核
    Cycle,
    /// 只审核已有草稿
    Review,
    /// 修订计数加一
    Revise,
    Stop(Termination),
}

/// 根据当前状态决定下一步，不做任何I/O
pub fn next_step(state: &WorkflowState) -> Step {
    if state.error().is_some() {
        return Step::Stop(Termination::Failed);
    }

    match state.status() {
        WorkflowStatus::Initialized => Step::Research,
        WorkflowStatus::Researched => {
            if state.max_iterations() == 0 {
                Step::Stop(Termination::ResearchOnly)
            } else {
                Step::Cycle
            }
        }
        WorkflowStatus::Drafted => Step::Review,
        WorkflowStatus::NeedsRevision => {
            let max = state.max_iterations();
            let completed = state.completed_cycles();
            if state.iteration_count() >= max || completed >= max as usize {
                Step::Stop(Termination::BudgetExhausted)
            } else if (state.iteration_count() as usize) < completed {
                Step::Revise
            } else {
                Step::Cycle
            }
        }
        WorkflowStatus::Approved => Step::Stop(Termination::Approved),
        WorkflowStatus::Failed => Step::Stop(Termination::Failed),
    }
}

/// 修订控制器：驱动 调研 -> (起草 -> 审核 -> 修订)* 直到终止
pub struct RevisionController {
    context: GeneratorContext,
    research: ResearchStage,
    draft: DraftStage,
    review: ReviewStage,
}

impl RevisionController {
    pub fn new(context: GeneratorContext) -> Self {
        Self {
            context,
            research: ResearchStage,
            draft: DraftStage,
            review: ReviewStage,
        }
    }

    /// 运行到终止；每次状态转移后发出一个 stage 事件
    pub async fn run(
        &self,
        state: &mut WorkflowState,
        run_id: Uuid,
        sink: &dyn EventSink,
    ) -> Termination {
        let mut timing = TimingScope::new();

        let termination = loop {
            let step = next_step(state);
            if let Step::Stop(termination) = step {
                break termination;
            }

            self.advance(step, state, &mut timing).await;
            debug_assert!(
                state.check_invariants().is_ok(),
                "{:?}",
                state.check_invariants()
            );

            sink.emit(&WorkflowEvent::Stage {
                run_id,
                step,
                status: state.status(),
                iteration_count: state.iteration_count(),
                timestamp: Utc::now(),
            });
        };

        tracing::info!("🏁 工作流结束: {}", termination);
        tracing::debug!("{}", timing.generate_timing_report());
        termination
    }

    async fn advance(&self, step: Step, state: &mut WorkflowState, timing: &mut TimingScope) {
        match step {
            Step::Research => {
                timing.start_phase(TimingKeys::RESEARCH);
                let outcome = self.research.execute(&self.context, state.topic()).await;
                timing.end_phase(TimingKeys::RESEARCH);
                match outcome {
                    Ok(outcome) => state.apply_research(outcome),
                    Err(e) => {
                        tracing::error!("❌ 调研失败: {}", e);
                        state.fail(&e);
                    }
                }
            }
            Step::Cycle => {
                if self.draft_step(state, timing).await {
                    self.review_step(state, timing).await;
                }
            }
            Step::Review => self.review_step(state, timing).await,
            Step::Revise => {
                state.begin_revision();
                tracing::info!(
                    "🔁 开始第 {}/{} 轮修订",
                    state.iteration_count(),
                    state.max_iterations()
                );
            }
            Step::Stop(_) => {}
        }
    }

    /// 起草成功返回 true
    async fn draft_step(&self, state: &mut WorkflowState, timing: &mut TimingScope) -> bool {
        timing.start_phase(TimingKeys::DRAFT);
        let outcome = self
            .draft
            .execute(
                &self.context,
                state.topic(),
                state.platform(),
                state.angles(),
                state.steering_feedback(),
            )
            .await;
        timing.end_phase(TimingKeys::DRAFT);

        match outcome {
            Ok(outcome) => {
                state.apply_draft(outcome);
                true
            }
            Err(e) => {
                tracing::error!("❌ 起草失败: {}", e);
                state.fail(&e);
                false
            }
        }
    }

    async fn review_step(&self, state: &mut WorkflowState, timing: &mut TimingScope) {
        timing.start_phase(TimingKeys::REVIEW);
        let outcome = self
            .review
            .execute(
                &self.context,
                state.current_draft(),
                state.platform(),
                state.topic(),
                state.approval_threshold(),
            )
            .await;
        timing.end_phase(TimingKeys::REVIEW);

        match outcome {
            Ok(outcome) => state.apply_review(outcome),
            Err(e) => {
                tracing::error!("❌ 审核失败: {}", e);
                state.fail(&e);
            }
        }
    }
}

/// 在已有上下文上执行一次生成；阶段失败体现在报告中，不作为错误返回
pub async fn generate(
    context: &GeneratorContext,
    request: &GenerationRequest,
    sink: &dyn EventSink,
) -> GenerationReport {
    let run_id = Uuid::new_v4();
    let timing = TimingScope::new();
    let topic = request.topic.trim();

    sink.emit(&WorkflowEvent::Started {
        run_id,
        topic: topic.to_string(),
        platform: request.platform,
        message: format!("Generating {} content for: {}", request.platform, topic),
        timestamp: Utc::now(),
    });

    let mut state = WorkflowState::new(
        topic,
        request.platform,
        request.max_iterations,
        request.approval_threshold,
    );
    let controller = RevisionController::new(context.clone());
    let termination = controller.run(&mut state, run_id, sink).await;

    let report = GenerationReport::from_state(
        run_id,
        context.generator.model_name(),
        &state,
        termination,
        timing.get_total_duration().as_secs_f64(),
    );
    sink.emit(&WorkflowEvent::Complete {
        data: Box::new(report.clone()),
    });
    report
}

/// 校验请求后在给定上下文上执行
pub async fn run_request(
    context: &GeneratorContext,
    request: &GenerationRequest,
    sink: &dyn EventSink,
) -> Result<GenerationReport, WorkflowError> {
    if let Err(e) = request.validate() {
        let error = WorkflowError::from(e);
        emit_error(sink, &error);
        return Err(error);
    }

    Ok(generate(context, request, sink).await)
}

/// 启动内容生成工作流
pub async fn launch(
    config: Config,
    request: &GenerationRequest,
    sink: &dyn EventSink,
) -> Result<GenerationReport, WorkflowError> {
    let context = match prepare(config, request) {
        Ok(context) => context,
        Err(error) => {
            emit_error(sink, &error);
            return Err(error);
        }
    };

    Ok(generate(&context, request, sink).await)
}

fn prepare(mut config: Config, request: &GenerationRequest) -> Result<GeneratorContext, WorkflowError> {
    request.validate()?;

    if let Some(model) = request.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        config.llm.model = model.to_string();
    }
    config.validate()?;

    Ok(GeneratorContext::new(config)?)
}

/// 记录错误并以 error 事件发出
pub fn emit_error(sink: &dyn EventSink, error: &WorkflowError) {
    tracing::error!("❌ {}", error);
    sink.emit(&WorkflowEvent::Error {
        run_id: None,
        message: error.to_string(),
    });
}

#[cfg(test)]
mod tests;
