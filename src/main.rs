use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use caption_batch::utils::logging;
use caption_batch::{App, BatchRequest, Config};
use clap::{ArgAction, Parser};
use tracing::{error, warn};

/// 批量为图片生成描述
#[derive(Debug, Parser)]
#[command(name = "caption-batch", version, about)]
struct Cli {
    /// 输入图片目录
    #[arg(short = 'i', long = "input-directory", default_value = "input")]
    input_directory: PathBuf,

    /// 输出目录
    #[arg(short = 'o', long = "output-directory", default_value = "output")]
    output_directory: PathBuf,

    /// 触发词
    #[arg(short = 't', long = "trigger", default_value = "ohwx")]
    trigger: String,

    /// 用户提示词文件
    #[arg(short = 'p', long = "prompt", default_value = "prompt.txt")]
    prompt: PathBuf,

    /// 是否在完成后归档输出目录
    #[arg(
        short = 'z',
        long = "zip",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    zip: bool,

    /// 最大并发数（默认读取 MAX_CONCURRENT_ITEMS）
    #[arg(short = 'c', long = "concurrency", allow_hyphen_values = true)]
    concurrency: Option<i64>,

    /// 将运行结果写入 JSON 报告
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,

    /// 任意图片或归档失败时以退出码 2 结束
    #[arg(long = "fail-on-error")]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志
    logging::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ 运行失败: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // 加载配置（缺少凭据时立即失败）
    let config = Config::from_env().context("加载配置失败")?;

    let request = BatchRequest {
        input_dir: cli.input_directory,
        output_dir: cli.output_directory,
        trigger_word: cli.trigger,
        prompt_path: cli.prompt,
        concurrency_limit: cli
            .concurrency
            .unwrap_or(config.max_concurrent_items as i64),
        archive: cli.zip,
    };

    let app = App::initialize(config);
    let result = app.run(&request).await.context("批处理失败")?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("无法写入报告: {}", path.display()))?;
    }

    if cli.fail_on_error && !result.is_clean() {
        warn!("⚠️ 存在失败项，按 --fail-on-error 以非零状态退出");
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_flag_forms() {
        let cli = Cli::try_parse_from(["caption-batch"]).unwrap();
        assert!(cli.zip);

        let cli = Cli::try_parse_from(["caption-batch", "-z"]).unwrap();
        assert!(cli.zip);

        let cli = Cli::try_parse_from(["caption-batch", "--zip", "-t", "sks"]).unwrap();
        assert!(cli.zip);
        assert_eq!(cli.trigger, "sks");

        let cli = Cli::try_parse_from(["caption-batch", "--zip", "false"]).unwrap();
        assert!(!cli.zip);

        let cli = Cli::try_parse_from(["caption-batch", "-z", "false"]).unwrap();
        assert!(!cli.zip);
    }

    #[test]
    fn test_negative_concurrency_is_parsed() {
        let cli = Cli::try_parse_from(["caption-batch", "-c", "-1"]).unwrap();
        assert_eq!(cli.concurrency, Some(-1));
    }
}
