use crate::error::{AppResult, ConfigError};

/// 内置系统提示词模板，`{trigger}` 会被替换为触发词
pub const DEFAULT_SYSTEM_PROMPT_TEMPLATE: &str = "You are an expert image captioner preparing a training dataset. \
Describe the image in a single detailed paragraph of plain text. \
Always refer to the main subject as \"{trigger}\" and begin the caption with \"{trigger}\". \
Do not add headings, lists or commentary about the task.";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的图片数量
    pub max_concurrent_items: usize,
    /// 单次描述请求的超时时间（秒）
    pub llm_timeout_secs: u64,
    /// 单次描述的最大 token 数
    pub llm_max_tokens: u32,
    /// 系统提示词模板
    pub system_prompt_template: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_items: 10,
            llm_timeout_secs: 120,
            llm_max_tokens: 1024,
            system_prompt_template: DEFAULT_SYSTEM_PROMPT_TEMPLATE.to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 缺少 `LLM_API_KEY` 或数值无法解析时返回 [`ConfigError`]，
    /// 此时尚未处理任何图片。
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置（便于测试）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let default = Self::default();

        let llm_api_key = lookup("LLM_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            })?;

        let max_concurrent_items = match lookup("MAX_CONCURRENT_ITEMS") {
            Some(value) => {
                let parsed = parse_var::<i64>("MAX_CONCURRENT_ITEMS", &value, "整数")?;
                concurrency_limit(parsed)?
            }
            None => default.max_concurrent_items,
        };

        Ok(Self {
            max_concurrent_items,
            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .map(|v| parse_var("LLM_TIMEOUT_SECS", &v, "u64"))
                .transpose()?
                .unwrap_or(default.llm_timeout_secs),
            llm_max_tokens: lookup("LLM_MAX_TOKENS")
                .map(|v| parse_var("LLM_MAX_TOKENS", &v, "u32"))
                .transpose()?
                .unwrap_or(default.llm_max_tokens),
            system_prompt_template: lookup("SYSTEM_PROMPT_TEMPLATE")
                .unwrap_or(default.system_prompt_template),
            llm_api_key,
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        })
    }
}

/// 校验并发数，必须为正整数
pub fn concurrency_limit(value: i64) -> Result<usize, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidConcurrency { value });
    }
    usize::try_from(value).map_err(|_| ConfigError::InvalidConcurrency { value })
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::EnvVarNotFound { .. }))
        ));
    }

    #[test]
    fn test_defaults_with_api_key() {
        let config = Config::from_lookup(lookup_from(&[("LLM_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.max_concurrent_items, 10);
        assert_eq!(config.llm_timeout_secs, 120);
        assert!(config.system_prompt_template.contains("{trigger}"));
    }

    #[test]
    fn test_negative_concurrency_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("LLM_API_KEY", "sk-test"),
            ("MAX_CONCURRENT_ITEMS", "-3"),
        ]));
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::InvalidConcurrency { value: -3 }))
        ));
    }

    #[test]
    fn test_unparseable_number_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("LLM_API_KEY", "sk-test"),
            ("LLM_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::EnvVarParseFailed { .. }))
        ));
    }

    #[test]
    fn test_concurrency_limit() {
        assert_eq!(concurrency_limit(4).unwrap(), 4);
        assert!(concurrency_limit(0).is_err());
        assert!(concurrency_limit(-1).is_err());
    }
}
