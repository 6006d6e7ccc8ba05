use serde::{Deserialize, Serialize};

/// 调研阶段产出的一个切入角度，生成后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Angle {
    pub title: String,
    /// 该角度为什么具备传播力
    pub rationale: String,
    pub summary: String,
    /// 来源链接，按搜索结果排名排序
    pub sources: Vec<String>,
}

impl Angle {
    pub fn new(
        title: impl Into<String>,
        rationale: impl Into<String>,
        summary: impl Into<String>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            rationale: rationale.into(),
            summary: summary.into(),
            sources,
        }
    }
}
