use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// 目标发布平台
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// 编号推文串
    #[serde(rename = "twitter")]
    #[default]
    Twitter,
    /// 单篇可快速浏览的长帖
    #[serde(rename = "linkedin")]
    LinkedIn,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::LinkedIn => write!(f, "linkedin"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            _ => Err(RequestError::Platform(s.to_string())),
        }
    }
}

impl Platform {
    /// 用于提示词中的平台名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "TWITTER",
            Platform::LinkedIn => "LINKEDIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("twitter".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("X".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!(" LinkedIn ".parse::<Platform>().unwrap(), Platform::LinkedIn);
        assert_eq!(
            "myspace".parse::<Platform>(),
            Err(RequestError::Platform("myspace".to_string()))
        );
    }

    #[test]
    fn test_platform_serde_names() {
        assert_eq!(
            serde_json::to_string(&Platform::LinkedIn).unwrap(),
            "\"linkedin\""
        );
        let parsed: Platform = serde_json::from_str("\"twitter\"").unwrap();
        assert_eq!(parsed, Platform::Twitter);
        assert_eq!(Platform::LinkedIn.to_string(), "linkedin");
    }
}
