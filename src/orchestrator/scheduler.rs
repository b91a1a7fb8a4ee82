//! 有界并发调度器 - 编排层
//!
//! ## 职责
//!
//! 以固定上限同时运行若干图片任务，任务完成后立即放行下一个排队任务，
//! 直到所有任务结束才返回（全屏障）。
//!
//! ## 保证
//!
//! - 同一时刻运行中的任务数不超过上限
//! - 排队任务按提交顺序获得许可（tokio 的 Semaphore 是公平的）
//! - 每个任务只执行一次，N 个任务必然产出 N 个结果
//! - 单个任务失败或 panic 不会影响其他任务

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::config::concurrency_limit;
use crate::error::{ConfigError, ErrorKind};
use crate::models::TaskOutcome;

/// 待调度的任务
pub struct ScheduledTask {
    image: String,
    future: BoxFuture<'static, TaskOutcome>,
}

impl ScheduledTask {
    /// `image` 用于在任务异常退出时生成失败结果
    pub fn new(
        image: impl Into<String>,
        future: impl Future<Output = TaskOutcome> + Send + 'static,
    ) -> Self {
        Self {
            image: image.into(),
            future: Box::pin(future),
        }
    }
}

/// 有界并发调度器
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    limit: usize,
}

impl Scheduler {
    /// 创建调度器，上限为 0 时返回配置错误
    pub fn new(limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidConcurrency { value: 0 });
        }
        Ok(Self { limit })
    }

    /// 从有符号整数创建，非正数返回配置错误
    pub fn from_signed(limit: i64) -> Result<Self, ConfigError> {
        Self::new(concurrency_limit(limit)?)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 运行全部任务并等待其结束
    ///
    /// 返回结果按完成顺序收集，调用方不应依赖其顺序。
    pub async fn run_all(&self, tasks: Vec<ScheduledTask>) -> Vec<TaskOutcome> {
        let total = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut outcomes = Vec::with_capacity(total);
        let mut running = FuturesUnordered::new();

        for (idx, task) in tasks.into_iter().enumerate() {
            let ScheduledTask { image, future } = task;

            // 按提交顺序等待空闲名额
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("[图片 {}] 无法获取调度许可: {}", image, e);
                    outcomes.push(TaskOutcome::Failure {
                        image,
                        kind: ErrorKind::Internal,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            debug!("[图片 {}] 开始处理 ({}/{})", image, idx + 1, total);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                future.await
            });

            running.push(async move {
                match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("[图片 {}] 任务执行失败: {}", image, e);
                        TaskOutcome::Failure {
                            image,
                            kind: ErrorKind::Internal,
                            detail: e.to_string(),
                        }
                    }
                }
            });
        }

        // 等待所有任务结束
        while let Some(outcome) = running.next().await {
            outcomes.push(outcome);
        }

        outcomes
    }
}
