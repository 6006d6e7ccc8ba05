#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    use crate::config::Config;
    use crate::error::{CapabilityError, ConfigError, RequestError, WorkflowError};
    use crate::generator::context::GeneratorContext;
    use crate::generator::draft::DraftOutcome;
    use crate::generator::outlet::{MemorySink, NoopSink, WorkflowEvent};
    use crate::generator::request::GenerationRequest;
    use crate::generator::research::ResearchOutcome;
    use crate::generator::research::parser::FALLBACK_RATIONALE;
    use crate::generator::review::ReviewOutcome;
    use crate::generator::state::{WorkflowState, WorkflowStatus};
    use crate::generator::workflow::{
        RevisionController, Step, Termination, TimingKeys, TimingScope, generate, launch,
        next_step, run_request,
    };
    use crate::llm::{GenerationCall, TextGenerator};
    use crate::search::{SearchEngine, SearchResult};
    use crate::types::Platform;

    const ANALYSIS: &str = "ANGLE 1: The Office Is Dead\nWHY VIRAL: Contrarian take\nSUMMARY: Data shows output went up\n\nANGLE 2: Async Wins\nWHY VIRAL: Relatable pain\nSUMMARY: Fewer meetings, more shipping";

    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, CapabilityError>>>,
        calls: Mutex<Vec<GenerationCall>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, CapabilityError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn ok(responses: &[&str]) -> Arc<Self> {
            Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn calls(&self) -> Vec<GenerationCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, call: &GenerationCall) -> Result<String, CapabilityError> {
            self.calls.lock().unwrap().push(call.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CapabilityError::Generation("script exhausted".to_string())))
        }
    }

    struct ScriptedSearch {
        result: Result<Vec<SearchResult>, CapabilityError>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedSearch {
        fn with_results(count: usize) -> Arc<Self> {
            let results = (1..=count)
                .map(|i| {
                    SearchResult::new(
                        format!("Result {}", i),
                        format!("https://news.example/{}", i),
                        format!("Content {}", i),
                        1.0 / i as f64,
                    )
                })
                .collect();
            Arc::new(Self {
                result: Ok(results),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err(CapabilityError::Search("HTTP 503".to_string())),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchEngine for ScriptedSearch {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchResult>, CapabilityError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            self.result.clone()
        }
    }

    fn context(generator: Arc<ScriptedGenerator>, search: Arc<ScriptedSearch>) -> GeneratorContext {
        GeneratorContext::with_capabilities(Config::default(), generator, search)
    }

    fn request(max_iterations: u32, approval_threshold: u8) -> GenerationRequest {
        GenerationRequest {
            topic: "Remote Work".to_string(),
            platform: Platform::Twitter,
            max_iterations,
            approval_threshold,
            model: None,
        }
    }

    fn reviewed(state: &mut WorkflowState, score: u8, approved: bool) {
        state.apply_draft(DraftOutcome {
            draft: format!("draft {}", score),
        });
        state.apply_review(ReviewOutcome {
            score,
            feedback: "feedback".to_string(),
            final_content: approved.then(|| "final".to_string()),
            polished: false,
        });
    }

    #[test]
    fn test_next_step_decisions() {
        let mut state = WorkflowState::new("t", Platform::Twitter, 2, 85);
        assert_eq!(next_step(&state), Step::Research);

        state.apply_research(ResearchOutcome { angles: vec![] });
        assert_eq!(next_step(&state), Step::Cycle);

        state.apply_draft(DraftOutcome {
            draft: "d".to_string(),
        });
        assert_eq!(next_step(&state), Step::Review);

        state.apply_review(ReviewOutcome {
            score: 40,
            feedback: "fb".to_string(),
            final_content: None,
            polished: false,
        });
        assert_eq!(next_step(&state), Step::Revise);

        state.begin_revision();
        assert_eq!(next_step(&state), Step::Cycle);

        reviewed(&mut state, 50, false);
        assert_eq!(next_step(&state), Step::Stop(Termination::BudgetExhausted));
    }

    #[test]
    fn test_next_step_terminal_states() {
        let mut state = WorkflowState::new("t", Platform::Twitter, 0, 85);
        state.apply_research(ResearchOutcome { angles: vec![] });
        assert_eq!(next_step(&state), Step::Stop(Termination::ResearchOnly));

        let mut state = WorkflowState::new("t", Platform::Twitter, 3, 85);
        state.apply_research(ResearchOutcome { angles: vec![] });
        reviewed(&mut state, 90, true);
        assert_eq!(next_step(&state), Step::Stop(Termination::Approved));

        let mut state = WorkflowState::new("t", Platform::Twitter, 3, 85);
        state.fail(&CapabilityError::Search("down".to_string()));
        assert_eq!(next_step(&state), Step::Stop(Termination::Failed));
    }

    #[tokio::test]
    async fn test_end_to_end_revise_then_approve() {
        let generator = ScriptedGenerator::ok(&[
            ANALYSIS,
            "1/5 first draft",
            "SCORE: 60\n\nFEEDBACK: Hook is weak",
            "1/5 second draft",
            "SCORE: 90\n\nFEEDBACK: Trim emojis",
            "1/5 polished draft",
        ]);
        let search = ScriptedSearch::with_results(3);
        let sink = MemorySink::new();

        let report = generate(
            &context(generator.clone(), search.clone()),
            &request(2, 85),
            &sink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Approved);
        assert_eq!(report.termination, Termination::Approved);
        assert_eq!(report.iteration_count, 1);
        assert_eq!(report.scores, vec![60, 90]);
        assert_eq!(report.drafts, vec!["1/5 first draft", "1/5 second draft"]);
        assert_eq!(report.feedbacks, vec!["Hook is weak", "Trim emojis"]);
        assert_eq!(report.final_content, "1/5 polished draft");
        assert_eq!(report.display_content, "1/5 polished draft");
        assert_eq!(report.virality_score, 90);
        assert_eq!(report.model, "scripted");
        assert_eq!(report.angles.len(), 2);
        assert_eq!(report.angles[0].title, "The Office Is Dead");
        assert!(report.error.is_none());

        let calls = generator.calls();
        assert_eq!(calls.len(), 6);
        assert!(!calls[1].prompt.contains("IMPORTANT FEEDBACK TO ADDRESS"));
        assert!(
            calls[3]
                .prompt
                .contains("IMPORTANT FEEDBACK TO ADDRESS:\nHook is weak")
        );
        assert!(calls[5].prompt.contains("FEEDBACK TO APPLY:\nTrim emojis"));

        let queries = search.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![(
                "Remote Work trending news viral discussions latest".to_string(),
                Config::default().search.max_results
            )]
        );

        let events = sink.events();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], WorkflowEvent::Started { .. }));
        let steps: Vec<Step> = events
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::Stage { step, .. } => Some(*step),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec![Step::Research, Step::Cycle, Step::Revise, Step::Cycle]);
        match &events[5] {
            WorkflowEvent::Complete { data } => assert_eq!(**data, report),
            other => panic!("unexpected terminal event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_budget_only_researches() {
        let generator = ScriptedGenerator::ok(&[ANALYSIS]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(0, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Researched);
        assert_eq!(report.termination, Termination::ResearchOnly);
        assert!(report.drafts.is_empty());
        assert!(report.scores.is_empty());
        assert_eq!(report.iteration_count, 0);
        assert_eq!(report.angles.len(), 2);
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_budget_exhausted_keeps_latest_draft_for_display() {
        let generator = ScriptedGenerator::ok(&[
            ANALYSIS,
            "draft one",
            "SCORE: 60\nFEEDBACK: weak hook",
            "draft two",
            "SCORE: 70\nFEEDBACK: still weak",
        ]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(2, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.termination, Termination::BudgetExhausted);
        assert_eq!(report.status, WorkflowStatus::NeedsRevision);
        assert_eq!(report.final_content, "");
        assert_eq!(report.display_content, "draft two");
        assert_eq!(report.scores, vec![60, 70]);
        assert_eq!(report.iteration_count, 1);
        assert_eq!(generator.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_perfect_score_skips_polish() {
        let generator = ScriptedGenerator::ok(&[ANALYSIS, "flawless", "SCORE: 100\nFEEDBACK: none"]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(1)),
            &request(3, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Approved);
        assert_eq!(report.final_content, "flawless");
        assert_eq!(generator.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_search_failure_fails_workflow() {
        let generator = ScriptedGenerator::ok(&[]);
        let sink = MemorySink::new();
        let report = generate(
            &context(generator.clone(), ScriptedSearch::failing()),
            &request(3, 85),
            &sink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Failed);
        assert_eq!(report.termination, Termination::Failed);
        assert!(report.error.as_deref().unwrap().contains("HTTP 503"));
        assert!(report.angles.is_empty());
        assert!(generator.calls().is_empty());

        // 阶段失败以 complete 事件结束，而不是 error 事件
        let events = sink.events();
        assert!(matches!(events.last(), Some(WorkflowEvent::Complete { .. })));
    }

    #[tokio::test]
    async fn test_draft_failure_skips_review() {
        let generator = ScriptedGenerator::new(vec![
            Ok(ANALYSIS.to_string()),
            Err(CapabilityError::Timeout {
                capability: "llm",
                seconds: 120,
            }),
        ]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(3, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Failed);
        assert!(report.error.as_deref().unwrap().contains("timed out"));
        assert!(report.drafts.is_empty());
        assert!(report.scores.is_empty());
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_review_failure_keeps_unscored_draft() {
        let generator = ScriptedGenerator::ok(&[ANALYSIS, "draft"]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(3, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Failed);
        assert_eq!(report.drafts, vec!["draft"]);
        assert!(report.scores.is_empty());
        assert!(report.final_content.is_empty());
    }

    #[tokio::test]
    async fn test_polish_failure_fails_without_recording_review() {
        let generator = ScriptedGenerator::new(vec![
            Ok(ANALYSIS.to_string()),
            Ok("draft".to_string()),
            Ok("SCORE: 90\nFEEDBACK: x".to_string()),
            Err(CapabilityError::Generation("polish unavailable".to_string())),
        ]);
        let controller = RevisionController::new(context(
            generator.clone(),
            ScriptedSearch::with_results(2),
        ));
        let mut state = WorkflowState::new("Remote Work", Platform::Twitter, 2, 85);

        let termination = controller.run(&mut state, Uuid::new_v4(), &NoopSink).await;

        assert_eq!(termination, Termination::Failed);
        assert_eq!(state.status(), WorkflowStatus::Failed);
        assert!(state.error().unwrap().contains("polish unavailable"));
        assert!(state.final_content().is_none());
        assert_eq!(state.draft_history(), &["draft".to_string()]);
        assert!(state.score_history().is_empty());
        assert!(state.feedback_history().is_empty());
        assert!(state.check_invariants().is_ok());
        assert_eq!(generator.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_blank_polish_keeps_draft_as_final_content() {
        let generator = ScriptedGenerator::ok(&[
            ANALYSIS,
            "real draft",
            "SCORE: 90\nFEEDBACK: tweak",
            "   ",
        ]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(2, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Approved);
        assert_eq!(report.final_content, "real draft");
        assert_eq!(report.display_content, "real draft");
        assert_eq!(generator.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_blank_draft_fails_before_review() {
        let generator = ScriptedGenerator::ok(&[ANALYSIS, " \n "]);
        let report = generate(
            &context(generator.clone(), ScriptedSearch::with_results(2)),
            &request(2, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.status, WorkflowStatus::Failed);
        assert!(report.error.as_deref().unwrap().contains("empty draft"));
        assert!(report.drafts.is_empty());
        assert!(report.final_content.is_empty());
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_resumed_blank_draft_is_never_approved() {
        let generator = ScriptedGenerator::ok(&["SCORE: 100\nFEEDBACK: none"]);
        let controller = RevisionController::new(context(
            generator.clone(),
            ScriptedSearch::with_results(1),
        ));
        let mut state = WorkflowState::new("Remote Work", Platform::Twitter, 2, 85);
        state.apply_research(ResearchOutcome { angles: vec![] });
        state.apply_draft(DraftOutcome {
            draft: "   ".to_string(),
        });

        let termination = controller.run(&mut state, Uuid::new_v4(), &NoopSink).await;

        assert_eq!(termination, Termination::Failed);
        assert!(state.final_content().is_none());
        assert!(state.check_invariants().is_ok());
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_research_falls_back_to_results() {
        let generator = ScriptedGenerator::ok(&["no structure here at all"]);
        let report = generate(
            &context(generator, ScriptedSearch::with_results(4)),
            &request(0, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(report.angles.len(), 3);
        for (i, angle) in report.angles.iter().enumerate() {
            assert_eq!(angle.title, format!("Result {}", i + 1));
            assert_eq!(angle.rationale, FALLBACK_RATIONALE);
            assert_eq!(angle.sources, vec![format!("https://news.example/{}", i + 1)]);
        }
    }

    #[tokio::test]
    async fn test_resume_from_drafted_reviews_first() {
        let generator = ScriptedGenerator::ok(&["SCORE: 95\nFEEDBACK: tiny tweak", "polished"]);
        let controller = RevisionController::new(context(
            generator.clone(),
            ScriptedSearch::with_results(1),
        ));

        let mut state = WorkflowState::new("Remote Work", Platform::LinkedIn, 2, 85);
        state.apply_research(ResearchOutcome { angles: vec![] });
        state.apply_draft(DraftOutcome {
            draft: "existing draft".to_string(),
        });

        let termination = controller.run(&mut state, Uuid::new_v4(), &NoopSink).await;

        assert_eq!(termination, Termination::Approved);
        assert_eq!(state.final_content(), Some("polished"));
        assert_eq!(state.draft_history().len(), 1);
        assert!(generator.calls()[0].prompt.contains("existing draft"));
    }

    #[tokio::test]
    async fn test_identical_outputs_give_identical_runs() {
        let script = [
            ANALYSIS,
            "draft a",
            "SCORE: 50\nFEEDBACK: more data",
            "draft b",
            "SCORE: 88\nFEEDBACK: fine",
            "final b",
        ];

        let first = generate(
            &context(ScriptedGenerator::ok(&script), ScriptedSearch::with_results(3)),
            &request(3, 85),
            &NoopSink,
        )
        .await;
        let second = generate(
            &context(ScriptedGenerator::ok(&script), ScriptedSearch::with_results(3)),
            &request(3, 85),
            &NoopSink,
        )
        .await;

        assert_eq!(first.drafts, second.drafts);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.feedbacks, second.feedbacks);
        assert_eq!(first.iteration_count, second.iteration_count);
        assert_eq!(first.status, second.status);
        assert_eq!(first.final_content, second.final_content);
    }

    #[tokio::test]
    async fn test_iteration_bound_holds_for_every_budget() {
        for max_iterations in 1..=5u32 {
            let mut script = vec![ANALYSIS];
            for _ in 0..max_iterations {
                script.push("weak draft");
                script.push("SCORE: 10\nFEEDBACK: rewrite");
            }
            let generator = ScriptedGenerator::ok(&script);

            let report = generate(
                &context(generator.clone(), ScriptedSearch::with_results(2)),
                &request(max_iterations, 85),
                &NoopSink,
            )
            .await;

            assert_eq!(report.termination, Termination::BudgetExhausted);
            assert_eq!(report.scores.len(), max_iterations as usize);
            assert_eq!(report.drafts.len(), report.scores.len());
            assert_eq!(report.feedbacks.len(), report.scores.len());
            assert!(report.iteration_count <= max_iterations);
            assert_eq!(report.iteration_count, max_iterations - 1);
            assert_eq!(generator.calls().len(), 1 + 2 * max_iterations as usize);
        }
    }

    #[tokio::test]
    async fn test_run_request_rejects_invalid_request() {
        let generator = ScriptedGenerator::ok(&[]);
        let sink = MemorySink::new();
        let mut bad = request(3, 85);
        bad.approval_threshold = 20;

        let result = run_request(
            &context(generator.clone(), ScriptedSearch::with_results(1)),
            &bad,
            &sink,
        )
        .await;

        assert!(matches!(
            result,
            Err(WorkflowError::Request(RequestError::ApprovalThreshold { value: 20, .. }))
        ));
        assert!(generator.calls().is_empty());
        assert!(matches!(
            sink.events().as_slice(),
            [WorkflowEvent::Error { .. }]
        ));
    }

    #[tokio::test]
    async fn test_launch_reports_missing_credentials() {
        let mut config = Config::default();
        config.llm.api_key = String::new();
        let sink = MemorySink::new();

        let result = launch(config, &request(3, 85), &sink).await;

        assert!(matches!(
            result,
            Err(WorkflowError::Configuration(ConfigError::MissingCredential { .. }))
        ));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_timing_scope_accumulates_phases() {
        let mut timing = TimingScope::new();
        timing.start_phase(TimingKeys::DRAFT);
        let first = timing.end_phase(TimingKeys::DRAFT).unwrap();
        timing.start_phase(TimingKeys::DRAFT);
        let second = timing.end_phase(TimingKeys::DRAFT).unwrap();

        assert_eq!(timing.get_phase_durations()[TimingKeys::DRAFT], first + second);
        assert!(timing.end_phase(TimingKeys::REVIEW).is_none());
        assert!(timing.generate_timing_report().contains("draft"));
    }
}
