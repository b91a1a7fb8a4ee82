//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{ArchiveStatus, BatchResult};
use crate::orchestrator::BatchRequest;

/// 初始化日志，默认级别 info，可通过 `RUST_LOG` 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(request: &BatchRequest, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量图片描述模式");
    info!("📂 输入目录: {}", request.input_dir.display());
    info!("📂 输出目录: {}", request.output_dir.display());
    info!("🏷️ 触发词: {}", request.trigger_word);
    info!("🤖 模型: {}", model_name);
    info!("📊 最大并发数: {}", request.concurrency_limit);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(result: &BatchResult) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", result.succeeded, result.total);
    info!("❌ 失败: {}", result.failed);
    for failure in &result.failures {
        info!("   • {} ({})", failure.image, failure.kind);
    }
    match &result.archive {
        ArchiveStatus::NotRequested => {}
        ArchiveStatus::Created { path } => info!("📦 归档: {}", path.display()),
        ArchiveStatus::Failed { detail } => info!("📦 归档失败: {}", detail),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
