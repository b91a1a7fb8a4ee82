//! 批次共享上下文
//!
//! 封装"这一批图片用什么触发词和提示词"这一信息

use std::fmt::Display;

/// 图片处理上下文
///
/// 批次开始前构建一次，之后只读，通过 `Arc` 在所有任务间共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingContext {
    /// 触发词
    pub trigger_word: String,

    /// 已用触发词渲染的系统提示词
    pub system_prompt: String,

    /// 用户提示词（提示词文件内容）
    pub user_prompt: String,
}

impl ProcessingContext {
    /// 创建新的上下文，`{trigger}` 占位符会被替换为触发词
    pub fn new(trigger_word: String, system_prompt_template: &str, user_prompt: String) -> Self {
        let system_prompt = system_prompt_template.replace("{trigger}", &trigger_word);
        Self {
            trigger_word,
            system_prompt,
            user_prompt,
        }
    }
}

impl Display for ProcessingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[触发词 {} 提示词 {} 字符]",
            self.trigger_word,
            self.user_prompt.chars().count()
        )
    }
}
