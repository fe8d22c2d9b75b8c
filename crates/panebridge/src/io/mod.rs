pub mod reader;
pub mod writer;

pub use reader::{run_reader, ReaderStop};
pub use writer::{spawn_writer, FrameSender};
