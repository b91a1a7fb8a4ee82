//! 批次协调器 - 编排层
//!
//! ## 职责
//!
//! 1. **前置检查**：校验并发数、创建输出目录、加载提示词（任一失败即中止整个批次）
//! 2. **发现图片**：扫描输入目录，描述文件名冲突的图片直接记为失败
//! 3. **构建任务**：共享只读上下文，每张图片一个 `ItemTask`
//! 4. **调度执行**：委托 `Scheduler`，等待所有任务结束
//! 5. **汇总统计**：单张图片失败只记录，不中止批次
//! 6. **归档**：全部结束后按需归档一次，归档失败不影响已写入的输出

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::{self, ArchiveStatus, BatchResult, TaskOutcome};
use crate::orchestrator::scheduler::{ScheduledTask, Scheduler};
use crate::services::{Archiver, Describer};
use crate::workflow::{ItemTask, ProcessingContext};

/// 一次批处理的参数
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub trigger_word: String,
    pub prompt_path: PathBuf,
    /// 并发上限，必须为正数
    pub concurrency_limit: i64,
    pub archive: bool,
}

/// 批次协调器
pub struct BatchCoordinator {
    describer: Arc<dyn Describer>,
    archiver: Arc<dyn Archiver>,
    system_prompt_template: String,
}

impl BatchCoordinator {
    pub fn new(
        describer: Arc<dyn Describer>,
        archiver: Arc<dyn Archiver>,
        system_prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            describer,
            archiver,
            system_prompt_template: system_prompt_template.into(),
        }
    }

    /// 运行整个批次
    ///
    /// 只有批次级错误（配置、目录、提示词）会返回 `Err`；
    /// 即使所有图片都失败，也返回 `Ok(BatchResult)`。
    pub async fn run(&self, request: &BatchRequest) -> AppResult<BatchResult> {
        let scheduler = Scheduler::from_signed(request.concurrency_limit)?;

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|source| FileError::CreateDirFailed {
                path: request.output_dir.display().to_string(),
                source,
            })?;

        let user_prompt = models::load_prompt(&request.prompt_path).await?;

        info!("\n📁 正在扫描待处理的图片...");
        let (images, collisions) =
            models::split_name_collisions(models::discover_images(&request.input_dir).await?);
        if images.is_empty() && collisions.is_empty() {
            warn!("⚠️ 没有找到待处理的图片: {}", request.input_dir.display());
        } else {
            info!(
                "✓ 找到 {} 张待处理的图片，最大并发数: {}",
                images.len() + collisions.len(),
                scheduler.limit()
            );
        }

        let ctx = Arc::new(ProcessingContext::new(
            request.trigger_word.clone(),
            &self.system_prompt_template,
            user_prompt,
        ));
        info!("上下文: {}", ctx);

        let item_task = ItemTask::new(self.describer.clone(), ctx, request.output_dir.clone());
        let tasks = images
            .into_iter()
            .map(|image| {
                let item_task = item_task.clone();
                ScheduledTask::new(image.file_name.clone(), async move {
                    item_task.process(&image).await
                })
            })
            .collect();

        let mut outcomes = scheduler.run_all(tasks).await;
        outcomes.extend(collisions.into_iter().map(|(image, err)| {
            let err = AppError::from(err);
            TaskOutcome::Failure {
                image: image.file_name,
                kind: err.kind(),
                detail: err.to_string(),
            }
        }));

        let mut result = BatchResult::from_outcomes(&outcomes);
        for failure in &result.failures {
            error!(
                "[图片 {}] 处理失败 ({}): {}",
                failure.image, failure.kind, failure.detail
            );
        }

        if request.archive {
            result.archive = self.archive(request).await;
        }

        Ok(result)
    }

    /// 归档输出目录，失败只记录
    async fn archive(&self, request: &BatchRequest) -> ArchiveStatus {
        info!("📦 正在归档输出目录: {}", request.output_dir.display());
        match self.archiver.archive(&request.output_dir).await {
            Ok(path) => {
                info!("✓ 归档完成: {}", path.display());
                ArchiveStatus::Created { path }
            }
            Err(e) => {
                error!("❌ 归档失败: {}", e);
                ArchiveStatus::Failed {
                    detail: e.to_string(),
                }
            }
        }
    }
}
