pub mod image_loader;

pub use image_loader::{discover_images, load_prompt, split_name_collisions};
