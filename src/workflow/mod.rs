pub mod item_task;
pub mod processing_ctx;

pub use item_task::ItemTask;
pub use processing_ctx::ProcessingContext;
