pub mod archiver;
pub mod describer;
pub mod output_writer;

pub use archiver::{Archiver, ZipArchiver};
pub use describer::{Describer, LlmDescriber};
pub use output_writer::OutputWriter;
