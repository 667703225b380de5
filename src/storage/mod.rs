pub mod source;

pub use source::{FileSource, LineSource, MemorySource};
