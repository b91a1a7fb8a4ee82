//! 输入图片模型

use std::path::{Path, PathBuf};

/// 支持的图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// 根据扩展名识别格式（忽略大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// 根据路径识别格式
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME 类型
    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// 待处理的输入图片
///
/// 扫描目录时创建，之后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    /// 文件名（含扩展名），同时作为图片标识
    pub file_name: String,
    /// 源文件完整路径
    pub path: PathBuf,
    /// 去掉扩展名后的文件名，用于描述文件命名
    pub base_name: String,
    pub format: ImageFormat,
}

impl InputImage {
    /// 从路径构建，非图片文件返回 `None`
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = ImageFormat::from_path(&path)?;
        let file_name = path.file_name()?.to_str()?.to_string();
        let base_name = path.file_stem()?.to_str()?.to_string();

        Some(Self {
            file_name,
            path,
            base_name,
            format,
        })
    }

    /// 输出目录中复制图片的文件名
    pub fn image_output_name(&self) -> &str {
        &self.file_name
    }

    /// 输出目录中描述文件的文件名
    pub fn description_output_name(&self) -> String {
        format!("{}.txt", self.base_name)
    }
}
