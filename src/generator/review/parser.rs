//! 审核结果解析
//!
//! 分数：`SCORE: <n>` -> 任意位置的 `<n>/100` -> 默认 70。
//! 反馈：`FEEDBACK:` 之后的文本 -> 分数标记之后的文本 -> 完整回复。
//! 两条链都在本地兜底，解析失败不会成为错误。

use regex::Regex;
use std::sync::LazyLock;

/// 解析不到分数时的默认分
pub const DEFAULT_SCORE: u8 = 70;

static SCORE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SCORE:\s*(\d+)").expect("valid score regex"));

static SCORE_RATIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*100").expect("valid ratio regex"));

static FEEDBACK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)FEEDBACK:").expect("valid feedback regex"));

/// 分数取自哪条规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Marker,
    Ratio,
    Default,
}

/// 反馈取自哪条规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSource {
    Marker,
    AfterScore,
    WholeResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReview {
    pub score: u8,
    pub score_source: ScoreSource,
    pub feedback: String,
    pub feedback_source: FeedbackSource,
}

pub fn parse_review(response: &str) -> ParsedReview {
    let (score, score_source) = extract_score(response);
    let (feedback, feedback_source) = extract_feedback(response);
    ParsedReview {
        score,
        score_source,
        feedback,
        feedback_source,
    }
}

/// 提取分数并截断到 [0, 100]
pub fn extract_score(response: &str) -> (u8, ScoreSource) {
    if let Some(score) = capture_number(&SCORE_MARKER, response) {
        return (score, ScoreSource::Marker);
    }

    if let Some(score) = capture_number(&SCORE_RATIO, response) {
        return (score, ScoreSource::Ratio);
    }

    tracing::warn!("⚠️ 无法解析审核分数，使用默认分 {}", DEFAULT_SCORE);
    (DEFAULT_SCORE, ScoreSource::Default)
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u8> {
    let digits = pattern.captures(text)?.get(1)?.as_str();
    // 超出 u64 的数字串也按上限处理
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(value.min(100) as u8)
}

pub fn extract_feedback(response: &str) -> (String, FeedbackSource) {
    if let Some(m) = FEEDBACK_MARKER.find(response) {
        return (
            response[m.end()..].trim().to_string(),
            FeedbackSource::Marker,
        );
    }

    if let Some(m) = SCORE_MARKER.find(response) {
        return (
            response[m.end()..].trim().to_string(),
            FeedbackSource::AfterScore,
        );
    }

    (response.trim().to_string(), FeedbackSource::WholeResponse)
}
