//! Error types for VM translation.
//!
//! Parse errors carry the file and line of the offending command.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("{file}:{line}: unknown command: {command}")]
    UnknownCommand {
        file: String,
        line: usize,
        command: String,
    },

    #[error("{file}:{line}: unknown segment: {segment}")]
    UnknownSegment {
        file: String,
        line: usize,
        segment: String,
    },

    #[error("{file}:{line}: {command} is missing an argument")]
    MissingArgument {
        file: String,
        line: usize,
        command: String,
    },

    #[error("{file}:{line}: invalid index: {value}")]
    InvalidIndex {
        file: String,
        line: usize,
        value: String,
    },

    #[error("{file}:{line}: cannot pop to the constant segment")]
    PopToConstant { file: String, line: usize },

    #[error("{file}:{line}: index {index} out of range for segment {segment}")]
    IndexOutOfRange {
        file: String,
        line: usize,
        segment: &'static str,
        index: u16,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read starter code from {path}: {source}")]
    StarterUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no .vm files found in {path}")]
    NoVmFiles { path: PathBuf },

    #[error("not a .vm file or directory: {path}")]
    InvalidPath { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, VmError>;
