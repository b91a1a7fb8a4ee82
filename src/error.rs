use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// 应用程序错误类型
///
/// 批次级错误（配置、发现、提示词加载）会向上传播并中止运行；
/// 单张图片的错误在调度器内部被转换为失败结果，不会越过调度器边界。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 描述服务错误
    #[error("描述服务错误: {0}")]
    Description(#[from] DescriptionError),
    /// 归档错误
    #[error("归档错误: {0}")]
    Archive(#[from] ArchiveError),
}

impl AppError {
    /// 错误类别，写入单张图片的失败结果
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::Config,
            AppError::File(_) => ErrorKind::Io,
            AppError::Description(_) => ErrorKind::Description,
            AppError::Archive(_) => ErrorKind::Archive,
        }
    }
}

/// 错误类别（封闭枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Io,
    Description,
    Archive,
    /// 任务异常退出（panic）
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Io => "IOError",
            ErrorKind::Description => "DescriptionError",
            ErrorKind::Archive => "ArchiveError",
            ErrorKind::Internal => "InternalError",
        };
        write!(f, "{}", name)
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 并发数非法
    #[error("并发数必须为正整数，当前值: {value}")]
    InvalidConcurrency { value: i64 },

    /// 提示词文件读取失败
    #[error("无法读取提示词文件 ({path}): {source}")]
    PromptUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },

    /// 读取失败
    #[error("读取失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 写入失败
    #[error("写入失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 多张图片对应同一个描述文件
    #[error("描述文件名 {output} 与 {kept} 冲突")]
    NameCollision { output: String, kept: String },
}

/// 描述服务错误
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// 构建请求失败
    #[error("构建请求失败 (模型: {model}): {message}")]
    RequestBuildFailed { model: String, message: String },

    /// API 调用失败
    #[error("API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },

    /// 调用超时
    #[error("调用超时 (模型: {model}, {timeout_secs}秒)")]
    Timeout { model: String, timeout_secs: u64 },

    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 归档错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 待归档目录不存在
    #[error("待归档目录不存在: {path}")]
    SourceMissing { path: String },

    /// 写入归档失败
    #[error("写入归档失败 ({path}): {message}")]
    WriteFailed { path: String, message: String },

    /// 后台任务异常
    #[error("归档任务异常退出: {message}")]
    TaskFailed { message: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: &Path, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: &Path, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ArchiveError {
    /// 创建归档写入错误
    pub fn write_failed(path: &Path, message: impl std::fmt::Display) -> Self {
        ArchiveError::WriteFailed {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
