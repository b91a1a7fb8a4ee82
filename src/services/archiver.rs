//! 归档服务 - 业务能力层
//!
//! 把输出目录压缩为同级的 `<目录名>.zip`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// 归档接口
#[async_trait]
pub trait Archiver: Send + Sync {
    /// 归档目录，返回生成的归档文件路径
    async fn archive(&self, directory: &Path) -> Result<PathBuf, ArchiveError>;
}

/// zip 归档实现
#[derive(Debug, Default, Clone)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }

    /// 归档文件路径：与目录同级，`output` -> `output.zip`
    pub fn archive_path(directory: &Path) -> PathBuf {
        let mut name = directory
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "archive".into());
        name.push(".zip");
        directory.with_file_name(name)
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, directory: &Path) -> Result<PathBuf, ArchiveError> {
        let directory = directory.to_path_buf();
        tokio::task::spawn_blocking(move || write_zip(&directory))
            .await
            .map_err(|e| ArchiveError::TaskFailed {
                message: e.to_string(),
            })?
    }
}

fn write_zip(directory: &Path) -> Result<PathBuf, ArchiveError> {
    if !directory.is_dir() {
        return Err(ArchiveError::SourceMissing {
            path: directory.display().to_string(),
        });
    }

    let archive_path = ZipArchiver::archive_path(directory);
    let file =
        File::create(&archive_path).map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
        let relative = entry
            .path()
            .strip_prefix(directory)
            .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
            continue;
        }

        debug!("归档: {}", name);
        zip.start_file(name, options)
            .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
        let mut source =
            File::open(entry.path()).map_err(|e| ArchiveError::write_failed(entry.path(), e))?;
        std::io::copy(&mut source, &mut zip)
            .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
    }

    let mut writer = zip
        .finish()
        .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;
    writer
        .flush()
        .map_err(|e| ArchiveError::write_failed(&archive_path, e))?;

    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_names(archive: &Path) -> Vec<String> {
        let reader = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = reader.file_names().map(|n| n.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_path_is_sibling() {
        assert_eq!(
            ZipArchiver::archive_path(Path::new("/data/output")),
            PathBuf::from("/data/output.zip")
        );
    }

    #[tokio::test]
    async fn test_archives_directory_contents() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("output");
        std::fs::create_dir(&output).unwrap();
        std::fs::write(output.join("a.jpg"), b"jpeg").unwrap();
        std::fs::write(output.join("a.txt"), b"X").unwrap();

        let archive = ZipArchiver::new().archive(&output).await.unwrap();

        assert_eq!(archive, root.path().join("output.zip"));
        assert_eq!(entry_names(&archive), vec!["a.jpg", "a.txt"]);
    }

    #[tokio::test]
    async fn test_empty_directory_yields_empty_archive() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("output");
        std::fs::create_dir(&output).unwrap();

        let archive = ZipArchiver::new().archive(&output).await.unwrap();

        assert!(archive.exists());
        assert!(entry_names(&archive).is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let result = ZipArchiver::new().archive(&root.path().join("gone")).await;
        assert!(matches!(result, Err(ArchiveError::SourceMissing { .. })));
    }
}
