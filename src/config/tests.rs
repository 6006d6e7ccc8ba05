#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, SearchConfig, WorkflowConfig};
    use crate::error::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_with_keys() -> Config {
        let mut config = Config::default();
        config.llm.api_key = "llm-key".to_string();
        config.search.api_key = "tavily-key".to_string();
        config
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!("openai".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);
        assert_eq!("groq".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);
        assert_eq!(
            "DeepSeek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!("ollama".parse::<LLMProvider>().unwrap(), LLMProvider::Ollama);

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::OpenRouter.to_string(), "openrouter");
        assert_eq!(LLMProvider::Mistral.to_string(), "mistral");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        assert_eq!(config.api_base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_search_and_workflow_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.max_results, 5);
        assert_eq!(search.search_depth, "advanced");

        let workflow = WorkflowConfig::default();
        assert_eq!(workflow.max_iterations, 3);
        assert_eq!(workflow.approval_threshold, 85);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(config_with_keys().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_llm_key() {
        let mut config = config_with_keys();
        config.llm.api_key = "  ".to_string();

        match config.validate() {
            Err(ConfigError::MissingCredential { env, .. }) => {
                assert_eq!(env, "VIRAL_LLM_API_KEY")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_ollama_needs_no_llm_key() {
        let mut config = config_with_keys();
        config.llm.provider = LLMProvider::Ollama;
        config.llm.api_key.clear();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_search_key() {
        let mut config = config_with_keys();
        config.search.api_key.clear();

        match config.validate() {
            Err(ConfigError::MissingCredential { env, .. }) => assert_eq!(env, "TAVILY_API_KEY"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = config_with_keys();
        config.workflow.approval_threshold = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = config_with_keys();
        config.search.max_results = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = config_with_keys();
        config.llm.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
verbose = true

[llm]
provider = "anthropic"
api_key = "sk-test"
model = "claude-test"

[workflow]
max_iterations = 5
approval_threshold = 90
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::Anthropic);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model, "claude-test");
        // 未出现的字段使用默认值
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.workflow.max_iterations, 5);
        assert_eq!(config.workflow.approval_threshold, 90);
    }

    #[test]
    fn test_from_file_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Config::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nmodel = ").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
