//! Grammar file reading with size and encoding checks

use crate::config::compile_time::grammar::MAX_GRAMMAR_SIZE;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("cannot find or open file {path}")]
    FileNotFound { path: String },

    #[error("grammar file {path} is {size} bytes (max: {max_size})")]
    FileTooLarge { path: String, size: u64, max_size: u64 },

    #[error("grammar file {path} is empty")]
    EmptyFile { path: String },

    #[error("grammar file {path} is not valid UTF-8")]
    InvalidEncoding { path: String },

    #[error("cannot read {path}: {message}")]
    IoError { path: String, message: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::grammar_file::FILE_NOT_FOUND,
            Self::FileTooLarge { .. } => codes::grammar_file::FILE_TOO_LARGE,
            Self::EmptyFile { .. } => codes::grammar_file::EMPTY_GRAMMAR,
            Self::InvalidEncoding { .. } => codes::grammar_file::INVALID_ENCODING,
            Self::IoError { .. } => codes::grammar_file::IO_ERROR,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
    /// File name without extension, the fallback grammar name
    pub stem: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }
}

/// Read a grammar file into memory
pub fn process_file(path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    let start_time = std::time::Instant::now();
    let display = path.display().to_string();
    log_debug!("Reading grammar file", "file" => &display);

    let (source, size) = read(path, &display).map_err(|error| {
        log_error!(error.error_code(), &error.to_string(), "file" => &display);
        error
    })?;

    let processed = FileProcessingResult {
        metadata: FileMetadata {
            path: path.to_path_buf(),
            size,
            line_count: source.lines().count(),
            stem: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
        },
        source,
        processing_duration: start_time.elapsed(),
    };
    log_success!(codes::success::GRAMMAR_FILE_READ,
        "Grammar file read",
        "file" => &display,
        "size_bytes" => processed.metadata.size,
        "lines" => processed.metadata.line_count);
    Ok(processed)
}

fn read(path: &Path, display: &str) -> Result<(String, u64), FileProcessorError> {
    let metadata = fs::metadata(path).map_err(|_| FileProcessorError::FileNotFound {
        path: display.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(FileProcessorError::FileNotFound {
            path: display.to_string(),
        });
    }

    let size = metadata.len();
    if size > MAX_GRAMMAR_SIZE as u64 {
        return Err(FileProcessorError::FileTooLarge {
            path: display.to_string(),
            size,
            max_size: MAX_GRAMMAR_SIZE as u64,
        });
    }

    let bytes = fs::read(path).map_err(|e| FileProcessorError::IoError {
        path: display.to_string(),
        message: e.to_string(),
    })?;
    let source = String::from_utf8(bytes).map_err(|_| FileProcessorError::InvalidEncoding {
        path: display.to_string(),
    })?;

    if source.trim().is_empty() {
        return Err(FileProcessorError::EmptyFile {
            path: display.to_string(),
        });
    }

    Ok((source, size))
}
