//! 应用入口 - 编排层
//!
//! 根据 `Config` 组装真实的描述服务和归档服务，运行批次并输出统计。

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::BatchResult;
use crate::orchestrator::batch_coordinator::{BatchCoordinator, BatchRequest};
use crate::services::{LlmDescriber, ZipArchiver};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    coordinator: BatchCoordinator,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let describer = Arc::new(LlmDescriber::new(&config));
        let coordinator = BatchCoordinator::new(
            describer,
            Arc::new(ZipArchiver::new()),
            config.system_prompt_template.clone(),
        );

        Self {
            config,
            coordinator,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self, request: &BatchRequest) -> AppResult<BatchResult> {
        log_startup(request, &self.config.llm_model_name);

        let result = self.coordinator.run(request).await?;

        print_final_stats(&result);

        Ok(result)
    }
}
