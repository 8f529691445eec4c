//! Grammar file intake

mod processor;

pub use processor::{process_file, FileMetadata, FileProcessingResult, FileProcessorError};
