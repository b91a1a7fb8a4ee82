//! # Caption Batch
//!
//! 批量为目录中的图片生成文字描述，用于整理训练数据集
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张图片或单个目录
//! - `Describer` - 调用外部视觉模型生成描述
//! - `OutputWriter` - 写入图片副本和描述文本（要么都写入，要么都不写入）
//! - `Archiver` - 把输出目录打包为 zip
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一张图片"的完整处理流程
//! - `ProcessingContext` - 批次共享的只读上下文（触发词 + 提示词）
//! - `ItemTask` - 流程编排（读取 → 描述 → 写入）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/scheduler` - 有界并发调度，全屏障等待
//! - `orchestrator/batch_coordinator` - 前置检查、发现图片、汇总、归档
//! - `orchestrator/app` - 根据配置组装真实依赖
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};
pub use models::{ArchiveStatus, BatchResult, InputImage, TaskOutcome};
pub use orchestrator::{App, BatchCoordinator, BatchRequest, Scheduler};
pub use services::{Archiver, Describer};
pub use workflow::{ItemTask, ProcessingContext};
