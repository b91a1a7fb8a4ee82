//! 输出写入服务 - 业务能力层
//!
//! 只负责"把图片副本和描述写入输出目录"能力，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::InputImage;

/// 已写入的两个输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub image_path: PathBuf,
    pub description_path: PathBuf,
}

/// 输出写入服务
///
/// 两个文件先写入隐藏的临时文件，全部成功后再重命名到最终位置；
/// 任一步失败都会清理已写入的部分，最终要么两个文件都完整存在，要么都不存在。
pub struct OutputWriter {
    output_root: PathBuf,
}

impl OutputWriter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// 写入图片副本和描述文本
    pub async fn write(
        &self,
        image: &InputImage,
        image_bytes: &[u8],
        description: &str,
    ) -> AppResult<WrittenOutputs> {
        let image_path = self.output_root.join(image.image_output_name());
        let description_path = self.output_root.join(image.description_output_name());

        debug!(
            "写入输出: {} | {} | 描述长度: {}",
            image_path.display(),
            description_path.display(),
            description.len()
        );

        let image_tmp = partial_path(&image_path);
        let description_tmp = partial_path(&description_path);

        let staged = async {
            write_file(&image_tmp, image_bytes).await?;
            write_file(&description_tmp, description.as_bytes()).await
        }
        .await;
        if let Err(e) = staged {
            discard(&[image_tmp.as_path(), description_tmp.as_path()]).await;
            return Err(e);
        }

        if let Err(e) = rename(&image_tmp, &image_path).await {
            discard(&[image_tmp.as_path(), description_tmp.as_path()]).await;
            return Err(e);
        }
        if let Err(e) = rename(&description_tmp, &description_path).await {
            discard(&[description_tmp.as_path(), image_path.as_path()]).await;
            return Err(e);
        }

        Ok(WrittenOutputs {
            image_path,
            description_path,
        })
    }
}

/// 临时文件路径：同目录下的 `.<name>.partial`
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

async fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    fs::write(path, bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path, e))
}

async fn rename(from: &Path, to: &Path) -> AppResult<()> {
    fs::rename(from, to)
        .await
        .map_err(|e| AppError::file_write_failed(to, e))
}

async fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!("清理临时文件失败 {}: {}", path.display(), e);
            }
        }
    }
}
