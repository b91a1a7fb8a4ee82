use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::image::InputImage;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// 扫描目录并返回所有支持的图片
///
/// 结果按文件名排序。子目录和非图片文件会被跳过；
/// 指向图片文件名的失效符号链接会保留，由处理流程在读取时报告为单张图片的错误。
pub async fn discover_images(folder: &Path) -> AppResult<Vec<InputImage>> {
    if !fs::try_exists(folder).await.unwrap_or(false) {
        return Err(FileError::DirectoryNotFound {
            path: folder.display().to_string(),
        }
        .into());
    }

    let mut images = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder, e))?
    {
        let path = entry.path();
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!("跳过无法识别类型的条目 {}: {}", path.display(), e);
                continue;
            }
        };
        if file_type.is_dir() {
            continue;
        }
        if file_type.is_symlink() {
            match fs::metadata(&path).await {
                Ok(metadata) if !metadata.is_file() => continue,
                Ok(_) => {}
                Err(e) => debug!("符号链接无法解析 {}: {}", path.display(), e),
            }
        }

        match InputImage::from_path(path) {
            Some(image) => {
                debug!("发现图片: {}", image.file_name);
                images.push(image);
            }
            None => {
                debug!("跳过非图片文件: {}", entry.path().display());
            }
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(images)
}

/// 按描述文件名去重
///
/// 同名不同扩展名的图片（如 `a.jpg` 与 `a.png`）会写入同一个 `a.txt`。
/// 每组保留排在最前的一张，其余连同冲突错误一起返回。
pub fn split_name_collisions(
    images: Vec<InputImage>,
) -> (Vec<InputImage>, Vec<(InputImage, FileError)>) {
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut unique = Vec::with_capacity(images.len());
    let mut collisions = Vec::new();

    for image in images {
        let output = image.description_output_name();
        match claimed.get(&output) {
            Some(kept) => {
                let err = FileError::NameCollision {
                    output,
                    kept: kept.clone(),
                };
                collisions.push((image, err));
            }
            None => {
                claimed.insert(output, image.file_name.clone());
                unique.push(image);
            }
        }
    }

    (unique, collisions)
}

/// 读取用户提示词文件
///
/// 文件缺失或不可读视为配置错误，整个批次在处理任何图片前中止。
pub async fn load_prompt(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::PromptUnreadable {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.PNG", "c.jpeg", "notes.txt", "d.gif"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = discover_images(dir.path())
            .await
            .unwrap()
            .into_iter()
            .map(|image| image.file_name)
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.jpeg"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_discover_tolerates_broken_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.jpg"), b"data").unwrap();
        std::fs::create_dir(dir.path().join("album")).unwrap();
        symlink(dir.path().join("gone.jpg"), dir.path().join("broken.jpg")).unwrap();
        symlink(dir.path().join("gone.txt"), dir.path().join("notes.txt")).unwrap();
        symlink(dir.path().join("good.jpg"), dir.path().join("linked.png")).unwrap();
        symlink(dir.path().join("album"), dir.path().join("album.png")).unwrap();

        let names: Vec<String> = discover_images(dir.path())
            .await
            .unwrap()
            .into_iter()
            .map(|image| image.file_name)
            .collect();

        assert_eq!(names, vec!["broken.jpg", "good.jpg", "linked.png"]);
    }

    #[test]
    fn test_split_name_collisions() {
        let images = ["a.jpg", "a.png", "b.png", "a.JPEG"]
            .into_iter()
            .map(|name| InputImage::from_path(name).unwrap())
            .collect();

        let (unique, collisions) = split_name_collisions(images);

        let kept: Vec<&str> = unique.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(kept, vec!["a.jpg", "b.png"]);

        let rejected: Vec<&str> = collisions
            .iter()
            .map(|(i, _)| i.file_name.as_str())
            .collect();
        assert_eq!(rejected, vec!["a.png", "a.JPEG"]);
        assert!(matches!(
            &collisions[0].1,
            FileError::NameCollision { kept, .. } if kept == "a.jpg"
        ));
    }

    #[tokio::test]
    async fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_images(&dir.path().join("nope")).await;
        assert!(matches!(
            result,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_load_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "  describe the lighting\n").unwrap();

        assert_eq!(
            load_prompt(&path).await.unwrap(),
            "  describe the lighting\n"
        );

        let missing = load_prompt(&dir.path().join("missing.txt")).await;
        assert!(matches!(missing, Err(ConfigError::PromptUnreadable { .. })));
    }
}
