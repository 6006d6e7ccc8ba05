use crate::error::CapabilityError;
use crate::generator::context::GeneratorContext;
use crate::generator::prompt::{PromptSection, PromptTemplate};
use crate::llm::GenerationCall;
use crate::types::Platform;
use crate::utils::text::preview;

pub mod parser;

pub use parser::{FeedbackSource, ParsedReview, ScoreSource};

/// 评分与润色都使用低温度
const REVIEW_TEMPERATURE: f64 = 0.3;
const POLISH_TEMPERATURE: f64 = 0.3;
const REVIEW_MAX_TOKENS: u32 = 2000;

/// 满分草稿原样定稿
pub const PERFECT_SCORE: u8 = 100;

/// 审核阶段的产出；`final_content` 只在通过时出现
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub score: u8,
    pub feedback: String,
    pub final_content: Option<String>,
    /// 定稿是否经过润色调用
    pub polished: bool,
}

#[derive(Default)]
pub struct ReviewStage;

impl ReviewStage {
    /// 评分调用
    pub fn build_review_call(&self, draft: &str, platform: Platform, topic: &str) -> GenerationCall {
        let template = PromptTemplate {
            system_prompt: "You are a Chief Editor evaluating social media content for virality potential.".to_string(),
            opening_instruction: format!(
                "PLATFORM: {}\nTOPIC: {}",
                platform.display_name(),
                topic
            ),
            closing_instruction: "Now review the content:".to_string(),
        };

        template.to_call(
            &[
                PromptSection::new("CONTENT TO REVIEW", format!("---\n{}\n---", draft.trim())),
                PromptSection::new("SCORING CRITERIA (100 points total)", SCORING_RUBRIC),
                PromptSection::new("RESPONSE FORMAT (CRITICAL - FOLLOW EXACTLY)", RESPONSE_FORMAT),
            ],
            REVIEW_TEMPERATURE,
            REVIEW_MAX_TOKENS,
        )
    }

    /// 润色调用：只做局部修改，保持原有语气与格式约束
    pub fn build_polish_call(&self, draft: &str, feedback: &str) -> GenerationCall {
        let template = PromptTemplate {
            system_prompt: "You are an expert Chief Editor.".to_string(),
            opening_instruction: "TASK: Polish this social media post based on the feedback below."
                .to_string(),
            closing_instruction: "Output ONLY the polished content.".to_string(),
        };

        template.to_call(
            &[
                PromptSection::new("CRITICAL RULES", POLISH_RULES),
                PromptSection::new("FEEDBACK TO APPLY", feedback),
                PromptSection::new("ORIGINAL CONTENT", draft),
            ],
            POLISH_TEMPERATURE,
            REVIEW_MAX_TOKENS,
        )
    }

    pub async fn execute(
        &self,
        context: &GeneratorContext,
        draft: &str,
        platform: Platform,
        topic: &str,
        threshold: u8,
    ) -> Result<ReviewOutcome, CapabilityError> {
        tracing::info!("⚖️ 审核 {} 内容", platform);

        // 空草稿不能进入审核闸门
        if draft.trim().is_empty() {
            return Err(CapabilityError::Generation(
                "draft to review is empty".to_string(),
            ));
        }

        let call = self.build_review_call(draft, platform, topic);
        let response = context.generator.generate(&call).await?;

        let ParsedReview {
            score, feedback, ..
        } = parser::parse_review(&response);
        tracing::info!("📊 传播力评分: {}/100", score);

        if score < threshold {
            tracing::info!("❌ 需要修订 (评分 {} < {})", score, threshold);
            tracing::info!("   反馈: {}", preview(&feedback, 100));
            return Ok(ReviewOutcome {
                score,
                feedback,
                final_content: None,
                polished: false,
            });
        }

        tracing::info!("✅ 审核通过 (评分 {} >= {})", score, threshold);

        if score >= PERFECT_SCORE {
            return Ok(ReviewOutcome {
                score,
                feedback,
                final_content: Some(draft.to_string()),
                polished: false,
            });
        }

        tracing::info!("✨ 根据反馈进行最终润色...");
        let polished = context
            .generator
            .generate(&self.build_polish_call(draft, &feedback))
            .await?;

        if polished.trim().is_empty() {
            tracing::warn!("⚠️ 润色结果为空，保留原草稿作为定稿");
            return Ok(ReviewOutcome {
                score,
                feedback,
                final_content: Some(draft.to_string()),
                polished: false,
            });
        }

        Ok(ReviewOutcome {
            score,
            feedback,
            final_content: Some(polished),
            polished: true,
        })
    }
}

const SCORING_RUBRIC: &str = "1. HOOK STRENGTH (30 points):
   - Does it stop the scroll?
   - Is it specific, bold, or surprising?
   - Does it promise clear value?
   - Deduct points for generic, boring, or clickbait hooks

2. EMOJI USAGE (20 points):
   - Are emojis used tastefully?
   - Do they add meaning or just clutter?
   - Too few = boring, too many = cringe

3. STRUCTURE & RHYTHM (25 points):
   - Is it scannable with white space?
   - Varied sentence/paragraph length?
   - Logical flow and pacing?

4. PLATFORM OPTIMIZATION (25 points):
   - Twitter: Thread format, tweet length, numbered properly
   - LinkedIn: Hook before cutoff, professional tone, story-driven
   - Deduct for poor formatting or wrong tone";

const RESPONSE_FORMAT: &str = "SCORE: [number 0-100]

FEEDBACK:
[Provide 2-3 SPECIFIC, ACTIONABLE improvements. Be direct.]

Examples of good feedback:
- \"Hook is weak. Try starting with: 'Most people think X, but data shows Y...'\"
- \"Too many emojis in paragraph 2. Keep only one relevant icon\"
- \"Thread tweet 3 is 320 chars - cut by 40 chars\"";

const POLISH_RULES: &str = "1. DO NOT rewrite the whole thing. Only fix what needs fixing.
2. Maintain the original voice and style (poetic, short lines).
3. Ensure NO markdown formatting (no #, no **).
4. Keep it clean and professional.";
