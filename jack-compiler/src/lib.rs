//! Jack to VM bytecode compiler for the Hack platform.
//!
//! Compiles Jack source (one class per file) to VM commands:
//! tokenize -> parse -> generate. Directory mode compiles every `.jack`
//! file in parallel; each file's compilation owns its state, so files are
//! independent.
//!
//! ```no_run
//! use jack_compiler::{compile_file, compile_directory};
//! use std::path::Path;
//!
//! let vm = compile_file(Path::new("Main.jack"));
//! let outcomes = compile_directory(Path::new("Square/"));
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod state;
pub mod token;
pub mod tokenizer;
pub mod vm;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub use codegen::CodeGenerator;
pub use error::{CompileError, Result};
pub use parser::Parser;
pub use state::{CompileState, VarEntry, VarKind};
pub use tokenizer::Tokenizer;

/// Compile Jack source text to `.vm` file text.
pub fn compile_source(source: &str) -> Result<String> {
    let tokens = Tokenizer::new(source).tokenize()?;
    let class = Parser::new(&tokens).parse()?;
    let commands = CodeGenerator::compile(&class)?;
    Ok(vm::render(&commands))
}

/// Compile a single `.jack` file to `.vm` file text.
pub fn compile_file(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path).map_err(|e| CompileError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    compile_source(&source)
}

/// The outcome of compiling one file from a directory.
#[derive(Debug)]
pub struct CompileOutcome {
    /// File stem, used to name the `.vm` sibling.
    pub stem: String,
    pub vm: Result<String>,
}

impl CompileOutcome {
    pub fn is_ok(&self) -> bool {
        self.vm.is_ok()
    }
}

/// Compile every `.jack` file in a directory, in parallel.
///
/// Returns one outcome per file, sorted by file name. An empty directory is
/// an error.
pub fn compile_directory(dir: &Path) -> Result<Vec<CompileOutcome>> {
    let mut jack_files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| CompileError::FileRead {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
        .collect();

    if jack_files.is_empty() {
        return Err(CompileError::NoJackFiles {
            path: dir.to_path_buf(),
        });
    }
    jack_files.sort();

    Ok(jack_files
        .par_iter()
        .map(|path| CompileOutcome {
            stem: file_stem(path),
            vm: compile_file(path),
        })
        .collect())
}

/// Write one file's VM output next to its source.
pub fn write_vm(dir: &Path, stem: &str, vm: &str) -> Result<PathBuf> {
    let out_path = dir.join(format!("{}.vm", stem));
    fs::write(&out_path, vm).map_err(|e| CompileError::FileWrite {
        path: out_path.clone(),
        source: e,
    })?;
    Ok(out_path)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_source_end_to_end() {
        let vm = compile_source(
            "class Main { function void main() { return; } }",
        )
        .unwrap();
        assert_eq!(vm, "function Main.main.0 0\npush constant 0\nreturn\n");
    }

    #[test]
    fn compile_source_propagates_codegen_errors() {
        let result = compile_source(
            "class Main { function void main() { let nope = 1; return; } }",
        );
        assert!(matches!(
            result,
            Err(CompileError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn compile_source_propagates_parse_errors() {
        assert!(compile_source("class Main {").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = compile_file(Path::new("definitely/not/here.jack"));
        assert!(matches!(result, Err(CompileError::FileRead { .. })));
    }
}
