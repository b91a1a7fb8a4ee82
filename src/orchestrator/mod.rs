//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! app (组装依赖)
//!     ↓
//! batch_coordinator (处理 Vec<InputImage>，前置检查 / 汇总 / 归档)
//!     ↓
//! scheduler (有界并发 + 全屏障)
//!     ↓
//! workflow::ItemTask (处理单张图片)
//!     ↓
//! services (能力层：describe / write / archive)
//! ```

pub mod app;
pub mod batch_coordinator;
pub mod scheduler;

// 重新导出主要类型
pub use app::App;
pub use batch_coordinator::{BatchCoordinator, BatchRequest};
pub use scheduler::{ScheduledTask, Scheduler};
