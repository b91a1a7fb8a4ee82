//! 描述服务 - 业务能力层
//!
//! 只负责"为一张图片生成描述"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 图片以 base64 data URL 的形式嵌入用户消息
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::DescriptionError;

/// 描述服务接口
///
/// 每次调用对应一次外部请求，内部不重试。
#[async_trait]
pub trait Describer: Send + Sync {
    /// 为图片生成文字描述
    ///
    /// # 参数
    /// - `image`: 图片原始字节
    /// - `media_type`: MIME 类型，如 `image/png`
    /// - `trigger_word`: 触发词
    /// - `user_prompt`: 用户提示词
    /// - `system_prompt`: 已渲染的系统提示词
    async fn describe(
        &self,
        image: &[u8],
        media_type: &str,
        trigger_word: &str,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, DescriptionError>;
}

/// 基于 OpenAI 兼容接口的描述服务
pub struct LlmDescriber {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmDescriber {
    /// 创建新的描述服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 构建请求：系统消息 + (文本, 图片) 多部分用户消息
    fn build_request(
        &self,
        image: &[u8],
        media_type: &str,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<CreateChatCompletionRequest, DescriptionError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| self.build_error(e))?;

        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_prompt.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: to_data_url(image, media_type),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| self.build_error(e))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.build_error(e))
    }

    fn build_error(&self, e: impl std::fmt::Display) -> DescriptionError {
        DescriptionError::RequestBuildFailed {
            model: self.model_name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl Describer for LlmDescriber {
    async fn describe(
        &self,
        image: &[u8],
        media_type: &str,
        trigger_word: &str,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, DescriptionError> {
        debug!(
            "调用描述 API，模型: {}，触发词: {}，图片大小: {} 字节",
            self.model_name,
            trigger_word,
            image.len()
        );

        let request = self.build_request(image, media_type, user_prompt, system_prompt)?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("描述 API 调用超时 ({}秒)", self.timeout.as_secs());
                DescriptionError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.timeout.as_secs(),
                }
            })?
            .map_err(|e| {
                warn!("描述 API 调用失败: {}", e);
                DescriptionError::ApiCallFailed {
                    model: self.model_name.clone(),
                    message: e.to_string(),
                }
            })?;

        debug!("描述 API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone());

        extract_description(content).ok_or_else(|| DescriptionError::EmptyContent {
            model: self.model_name.clone(),
        })
    }
}

/// 将图片编码为 data URL
pub fn to_data_url(image: &[u8], media_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        general_purpose::STANDARD.encode(image)
    )
}

/// 提取描述文本，空白内容视为无效
fn extract_description(content: Option<String>) -> Option<String> {
    content
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_describer() -> LlmDescriber {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        LlmDescriber::new(&config)
    }

    #[test]
    fn test_data_url_encoding() {
        assert_eq!(to_data_url(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_extract_description() {
        assert_eq!(
            extract_description(Some("  a cat on a sofa \n".to_string())),
            Some("a cat on a sofa".to_string())
        );
        assert_eq!(extract_description(Some("   ".to_string())), None);
        assert_eq!(extract_description(None), None);
    }

    #[test]
    fn test_build_request_embeds_prompts_and_image() {
        let describer = create_test_describer();
        let request = describer
            .build_request(b"img", "image/jpeg", "describe it", "system text")
            .unwrap();

        assert_eq!(request.model, describer.model_name());
        assert_eq!(request.messages.len(), 2);

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("system text"));
        assert!(json.contains("describe it"));
        assert!(json.contains("data:image/jpeg;base64,aW1n"));
    }

    /// 真实 API 调用，需要设置 LLM_API_KEY
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_live_describe -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_describe() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("需要设置 LLM_API_KEY");
        let describer = LlmDescriber::new(&config);

        // 1x1 透明 PNG
        let png = general_purpose::STANDARD
            .decode("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==")
            .unwrap();

        let description = describer
            .describe(&png, "image/png", "ohwx", "Describe this image.", "You are concise.")
            .await
            .expect("描述失败");

        println!("描述: {}", description);
        assert!(!description.is_empty());
    }
}
