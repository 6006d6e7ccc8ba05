use crate::error::CapabilityError;
use crate::generator::context::GeneratorContext;
use crate::generator::prompt::{PromptSection, PromptTemplate};
use crate::types::{Angle, Platform};

mod templates;

/// 起草偏向新颖性
const DRAFT_TEMPERATURE: f64 = 0.9;
const DRAFT_MAX_TOKENS: u32 = 1500;

/// 提示词中最多引用的角度数
const ANGLES_IN_PROMPT: usize = 3;

/// 起草阶段的产出
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOutcome {
    pub draft: String,
}

/// 角度列表格式化为提示词片段
pub fn format_angles(angles: &[Angle]) -> String {
    angles
        .iter()
        .take(ANGLES_IN_PROMPT)
        .map(|angle| format!("- {}: {}", angle.title, angle.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
pub struct DraftStage;

impl DraftStage {
    fn prompt_template(&self, topic: &str, platform: Platform) -> PromptTemplate {
        match platform {
            Platform::Twitter => PromptTemplate {
                system_prompt: "You are a viral Twitter ghostwriter.".to_string(),
                opening_instruction: format!(
                    "Create a compelling Twitter thread about \"{}\".",
                    topic
                ),
                closing_instruction: "Write the complete thread now. Each tweet should be separated by a line that says \"---\"".to_string(),
            },
            Platform::LinkedIn => PromptTemplate {
                system_prompt: "You are a viral LinkedIn ghostwriter.".to_string(),
                opening_instruction: format!(
                    "Create an engaging LinkedIn post about \"{}\".",
                    topic
                ),
                closing_instruction: "Write the complete LinkedIn post now.".to_string(),
            },
        }
    }

    fn requirements(&self, platform: Platform) -> PromptSection {
        match platform {
            Platform::Twitter => {
                PromptSection::new("TWITTER THREAD REQUIREMENTS", templates::TWITTER_RUBRIC)
            }
            Platform::LinkedIn => {
                PromptSection::new("LINKEDIN POST REQUIREMENTS", templates::LINKEDIN_RUBRIC)
            }
        }
    }

    /// 构造起草调用；上一轮反馈非空时作为必须处理的指令追加在末尾
    pub fn build_call(
        &self,
        topic: &str,
        platform: Platform,
        angles: &[Angle],
        feedback: Option<&str>,
    ) -> crate::llm::GenerationCall {
        let sections = [
            PromptSection::new("RESEARCH ANGLES TO USE", format_angles(angles)),
            self.requirements(platform),
            PromptSection::new(
                "IMPORTANT FEEDBACK TO ADDRESS",
                feedback.unwrap_or_default(),
            ),
        ];

        self.prompt_template(topic, platform)
            .to_call(&sections, DRAFT_TEMPERATURE, DRAFT_MAX_TOKENS)
    }

    pub async fn execute(
        &self,
        context: &GeneratorContext,
        topic: &str,
        platform: Platform,
        angles: &[Angle],
        feedback: Option<&str>,
    ) -> Result<DraftOutcome, CapabilityError> {
        tracing::info!("✍️ 为 {} 起草内容: {}", platform, topic);

        let call = self.build_call(topic, platform, angles, feedback);
        let draft = context.generator.generate(&call).await?;
        if draft.trim().is_empty() {
            return Err(CapabilityError::Generation(
                "model returned an empty draft".to_string(),
            ));
        }

        tracing::info!("✅ 草稿完成 ({} 字符)", draft.chars().count());
        Ok(DraftOutcome { draft })
    }
}
