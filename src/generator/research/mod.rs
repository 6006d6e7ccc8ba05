// 调研阶段：主题 -> 检索 -> 模型归纳出 3~5 个传播切入角度
// 解析失败时退回到排名靠前的检索结果，这条路径永远不算失败。

use crate::error::CapabilityError;
use crate::generator::context::GeneratorContext;
use crate::generator::prompt::{PromptSection, PromptTemplate, current_time_section};
use crate::search::SearchResult;
use crate::types::Angle;
use crate::utils::text::truncate_chars;

pub mod parser;

pub use parser::AngleSource;

/// 追加在主题后面的趋势限定词
pub const TREND_QUALIFIERS: &str = "trending news viral discussions latest";

const RESEARCH_TEMPERATURE: f64 = 0.8;
const RESEARCH_MAX_TOKENS: u32 = 2000;
const RESULT_CONTENT_CHARS: usize = 300;

/// 调研阶段的产出
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub angles: Vec<Angle>,
}

/// 由主题确定性地生成检索语句
pub fn build_query(topic: &str) -> String {
    format!("{} {}", topic.trim(), TREND_QUALIFIERS)
}

/// 检索结果格式化为提示词片段
pub fn format_search_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "Result {}:\nTitle: {}\nContent: {}...\nURL: {}\n",
                i + 1,
                result.title,
                truncate_chars(&result.content, RESULT_CONTENT_CHARS),
                result.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
pub struct ResearchStage;

impl ResearchStage {
    fn prompt_template(&self, topic: &str) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You are a viral content researcher.".to_string(),
            opening_instruction: format!(
                "Analyze these search results about \"{}\" and identify 3-5 unique angles that could make this topic go viral on social media.",
                topic
            ),
            closing_instruction: ANGLE_RUBRIC.to_string(),
        }
    }

    pub async fn execute(
        &self,
        context: &GeneratorContext,
        topic: &str,
    ) -> Result<ResearchOutcome, CapabilityError> {
        tracing::info!("🕵️ 调研主题: {}", topic);

        let query = build_query(topic);
        let results = context
            .search
            .search(&query, context.config.search.max_results)
            .await?;

        let call = self.prompt_template(topic).to_call(
            &[
                current_time_section(),
                PromptSection::new("SEARCH RESULTS", format_search_results(&results)),
            ],
            RESEARCH_TEMPERATURE,
            RESEARCH_MAX_TOKENS,
        );
        let analysis = context.generator.generate(&call).await?;

        let (angles, source) = parser::parse_angles(&analysis, &results);
        match source {
            AngleSource::Parsed => tracing::info!("✅ 找到 {} 个传播角度", angles.len()),
            AngleSource::SearchFallback => tracing::warn!(
                "⚠️ 无法从模型输出中解析角度，改用 {} 条检索结果",
                angles.len()
            ),
        }

        Ok(ResearchOutcome { angles })
    }
}

const ANGLE_RUBRIC: &str = "For each angle, provide:
1. A catchy title
2. Why it's viral-worthy (connection to trends, controversy, universal pain point, etc.)
3. A brief summary

Focus on angles that are:
- Surprising or contrarian
- Connected to current events or trends
- Emotionally resonant
- Universally relatable

Format as:
ANGLE 1: [Title]
WHY VIRAL: [Reason]
SUMMARY: [Brief summary]

ANGLE 2: ...";
