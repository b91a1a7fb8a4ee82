//! 处理结果模型

use std::path::PathBuf;

use serde::Serialize;

use crate::error::ErrorKind;

/// 单张图片的处理结果
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// 两个输出文件均已完整写入
    Success {
        image: String,
        image_path: PathBuf,
        description_path: PathBuf,
    },
    /// 处理失败
    Failure {
        image: String,
        kind: ErrorKind,
        detail: String,
    },
}

impl TaskOutcome {
    /// 图片标识（文件名）
    pub fn image(&self) -> &str {
        match self {
            TaskOutcome::Success { image, .. } | TaskOutcome::Failure { image, .. } => image,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }
}

/// 失败明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub image: String,
    pub kind: ErrorKind,
    pub detail: String,
}

/// 归档状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
    /// 未要求归档
    NotRequested,
    /// 归档成功
    Created { path: PathBuf },
    /// 归档失败（不影响已写入的输出）
    Failed { detail: String },
}

/// 整个批次的汇总结果
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
    pub archive: ArchiveStatus,
}

impl BatchResult {
    /// 汇总所有结果（与完成顺序无关）
    pub fn from_outcomes(outcomes: &[TaskOutcome]) -> Self {
        let mut failures: Vec<ItemFailure> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                TaskOutcome::Failure {
                    image,
                    kind,
                    detail,
                } => Some(ItemFailure {
                    image: image.clone(),
                    kind: *kind,
                    detail: detail.clone(),
                }),
                TaskOutcome::Success { .. } => None,
            })
            .collect();
        failures.sort_by(|a, b| a.image.cmp(&b.image));

        let failed = failures.len();
        Self {
            total: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
            failures,
            archive: ArchiveStatus::NotRequested,
        }
    }

    /// 是否全部成功（包括归档）
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !matches!(self.archive, ArchiveStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(name: &str) -> TaskOutcome {
        TaskOutcome::Success {
            image: name.to_string(),
            image_path: PathBuf::from(name),
            description_path: PathBuf::from(format!("{}.txt", name)),
        }
    }

    fn failure(name: &str) -> TaskOutcome {
        TaskOutcome::Failure {
            image: name.to_string(),
            kind: ErrorKind::Description,
            detail: "boom".to_string(),
        }
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let forward = BatchResult::from_outcomes(&[success("a"), failure("b"), failure("c")]);
        let backward = BatchResult::from_outcomes(&[failure("c"), failure("b"), success("a")]);

        assert_eq!(forward.total, 3);
        assert_eq!(forward.succeeded, 1);
        assert_eq!(forward.failed, 2);
        assert_eq!(forward.failures, backward.failures);
        assert!(!forward.is_clean());
    }

    #[test]
    fn test_empty_batch() {
        let result = BatchResult::from_outcomes(&[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert!(result.is_clean());
    }

    #[test]
    fn test_report_serialization() {
        let mut result = BatchResult::from_outcomes(&[failure("x.png")]);
        result.archive = ArchiveStatus::Failed {
            detail: "disk full".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["failed"], 1);
        assert_eq!(json["failures"][0]["kind"], "description");
        assert_eq!(json["archive"]["status"], "failed");
    }
}
