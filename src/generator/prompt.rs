use crate::llm::GenerationCall;

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

/// 带标题的提示词片段
#[derive(Debug, Clone)]
pub struct PromptSection {
    pub heading: &'static str,
    pub body: String,
}

impl PromptSection {
    pub fn new(heading: &'static str, body: impl Into<String>) -> Self {
        Self {
            heading,
            body: body.into(),
        }
    }
}

impl PromptTemplate {
    /// 开头指令 + 各片段 + 结尾指令，空片段跳过
    pub fn render(&self, sections: &[PromptSection]) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.opening_instruction);
        prompt.push_str("\n\n");

        for section in sections.iter().filter(|s| !s.body.trim().is_empty()) {
            prompt.push_str(section.heading);
            prompt.push_str(":\n");
            prompt.push_str(section.body.trim_end());
            prompt.push_str("\n\n");
        }

        prompt.push_str(&self.closing_instruction);
        prompt
    }

    /// 渲染为一次生成调用
    pub fn to_call(
        &self,
        sections: &[PromptSection],
        temperature: f64,
        max_tokens: u32,
    ) -> GenerationCall {
        GenerationCall::new(self.system_prompt.clone(), self.render(sections))
            .temperature(temperature)
            .max_tokens(max_tokens)
    }
}

/// 当前时间信息，供需要时效性的提示词使用
pub fn current_time_section() -> PromptSection {
    let now = chrono::Utc::now();
    PromptSection::new(
        "CURRENT DATE",
        format!("{} (UTC)", now.format("%Y-%m-%d")),
    )
}
