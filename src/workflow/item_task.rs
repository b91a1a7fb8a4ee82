//! 单张图片处理流程 - 流程层
//!
//! 核心职责：定义"一张图片"的完整处理流程
//!
//! 流程顺序：
//! 1. 读取图片
//! 2. 调用描述服务
//! 3. 写入图片副本和描述文本
//!
//! 任一步失败都会终止后续步骤，并以失败结果返回，不会向外抛出。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{InputImage, TaskOutcome};
use crate::services::output_writer::WrittenOutputs;
use crate::services::{Describer, OutputWriter};
use crate::utils::logging::truncate_text;
use crate::workflow::processing_ctx::ProcessingContext;

/// 图片处理流程
///
/// - 只处理单张图片
/// - 不持有任何可变共享状态
/// - 只依赖业务能力（services）
#[derive(Clone)]
pub struct ItemTask {
    describer: Arc<dyn Describer>,
    ctx: Arc<ProcessingContext>,
    writer: Arc<OutputWriter>,
}

impl ItemTask {
    /// 创建新的图片处理流程
    pub fn new(
        describer: Arc<dyn Describer>,
        ctx: Arc<ProcessingContext>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            describer,
            ctx,
            writer: Arc::new(OutputWriter::new(output_root)),
        }
    }

    /// 处理一张图片，总是返回结果
    pub async fn process(&self, image: &InputImage) -> TaskOutcome {
        match self.run(image).await {
            Ok(written) => {
                info!("[图片 {}] ✓ 处理完成", image.file_name);
                TaskOutcome::Success {
                    image: image.file_name.clone(),
                    image_path: written.image_path,
                    description_path: written.description_path,
                }
            }
            Err(e) => {
                error!("[图片 {}] ❌ {}: {}", image.file_name, e.kind(), e);
                TaskOutcome::Failure {
                    image: image.file_name.clone(),
                    kind: e.kind(),
                    detail: e.to_string(),
                }
            }
        }
    }

    async fn run(&self, image: &InputImage) -> AppResult<WrittenOutputs> {
        // ========== 步骤 1: 读取图片 ==========
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|e| AppError::file_read_failed(&image.path, e))?;

        // ========== 步骤 2: 获取描述 ==========
        info!("[图片 {}] 🤖 正在请求描述...", image.file_name);
        let description = self
            .describer
            .describe(
                &bytes,
                image.format.media_type(),
                &self.ctx.trigger_word,
                &self.ctx.user_prompt,
                &self.ctx.system_prompt,
            )
            .await?;
        info!(
            "[图片 {}] 描述: {}",
            image.file_name,
            truncate_text(&description, 80)
        );

        // ========== 步骤 3: 写入输出 ==========
        self.writer.write(image, &bytes, &description).await
    }
}
