pub mod image;
pub mod loaders;
pub mod outcome;

pub use image::{ImageFormat, InputImage};
pub use loaders::{discover_images, load_prompt, split_name_collisions};
pub use outcome::{ArchiveStatus, BatchResult, ItemFailure, TaskOutcome};
