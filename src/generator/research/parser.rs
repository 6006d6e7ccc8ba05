//! 调研结果解析
//!
//! 文法：以行首大写的 `ANGLE <n>` 作为块分隔符（允许 markdown 的 `#`、`*` 修饰），
//! 块首行余下部分为标题，块内需要 `WHY VIRAL:`（或 `RATIONALE:`）与 `SUMMARY:`
//! 两个带标签字段。缺字段的块直接丢弃；一个都解析不出时退回到原始检索结果。

use regex::Regex;
use std::sync::LazyLock;

use crate::search::SearchResult;
use crate::types::Angle;
use crate::utils::text::truncate_chars;

/// 退回原始检索结果时使用的固定理由
pub const FALLBACK_RATIONALE: &str = "Trending topic with high engagement";

/// 退回路径最多生成的角度数
pub const MAX_FALLBACK_ANGLES: usize = 3;

/// 解析出的角度附带的来源数
const SOURCES_PER_ANGLE: usize = 2;

const FALLBACK_SUMMARY_CHARS: usize = 200;

// 区分大小写：正文里的 "angle 2 ..." 不是分隔符
static ANGLE_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t#*>\-]*ANGLE[ \t]+\d+[ \t*]*[:.)\-]?").expect("valid angle regex")
});

static RATIONALE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t#*\-]*(?:WHY[ \t]+(?:IT'?S[ \t]+)?VIRAL|RATIONALE)[ \t*]*:[ \t*]*(.*)$")
        .expect("valid rationale regex")
});

static SUMMARY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t#*\-]*SUMMARY[ \t*]*:[ \t*]*(.*)$").expect("valid summary regex")
});

/// 解析结果的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleSource {
    /// 从模型输出中解析
    Parsed,
    /// 模型输出无法解析，直接取自检索结果
    SearchFallback,
}

/// 解析模型输出，必要时退回检索结果
pub fn parse_angles(analysis: &str, results: &[SearchResult]) -> (Vec<Angle>, AngleSource) {
    let sources: Vec<String> = results
        .iter()
        .map(|r| r.url.clone())
        .filter(|url| !url.is_empty())
        .take(SOURCES_PER_ANGLE)
        .collect();

    let angles: Vec<Angle> = ANGLE_DELIMITER
        .split(analysis)
        .skip(1)
        .filter_map(|block| parse_block(block, &sources))
        .collect();

    if angles.is_empty() {
        (fallback_angles(results), AngleSource::SearchFallback)
    } else {
        (angles, AngleSource::Parsed)
    }
}

fn parse_block(block: &str, sources: &[String]) -> Option<Angle> {
    let title = clean(block.lines().next()?);
    let rationale = capture_field(&RATIONALE_FIELD, block)?;
    let summary = capture_field(&SUMMARY_FIELD, block)?;

    if title.is_empty() {
        return None;
    }

    Some(Angle::new(title, rationale, summary, sources.to_vec()))
}

fn capture_field(pattern: &Regex, block: &str) -> Option<String> {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| clean(m.as_str()))
        .filter(|value| !value.is_empty())
}

fn clean(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '[' | ']'))
        .to_string()
}

/// 从排名最高的检索结果直接构造角度
pub fn fallback_angles(results: &[SearchResult]) -> Vec<Angle> {
    results
        .iter()
        .take(MAX_FALLBACK_ANGLES)
        .map(|result| {
            Angle::new(
                result.title.clone(),
                FALLBACK_RATIONALE,
                truncate_chars(&result.content, FALLBACK_SUMMARY_CHARS),
                vec![result.url.clone()],
            )
        })
        .collect()
}
