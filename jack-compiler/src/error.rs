//! Error types for Jack compilation.

use crate::token::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while compiling one Jack source file.
///
/// Compilation is fail-fast: the first error aborts the file.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("lexical error at {span}: {message}")]
    Lexical { span: Span, message: String },

    #[error("syntax error at {span}: {message}")]
    Syntax { span: Span, message: String },

    #[error("undefined variable '{name}' at {span}")]
    UndefinedVariable { name: String, span: Span },

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

    #[error("no .jack files found in {path}")]
    NoJackFiles { path: PathBuf },
}

impl CompileError {
    pub fn lexical(span: Span, message: impl Into<String>) -> Self {
        CompileError::Lexical {
            span,
            message: message.into(),
        }
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            span,
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        CompileError::UndefinedVariable {
            name: name.into(),
            span,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
