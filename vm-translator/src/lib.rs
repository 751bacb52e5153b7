//! VM bytecode to Hack assembly translator.
//!
//! Translates `.vm` command text into `.asm` text. Comparison, call, and
//! return sequences jump into a shared "starter" block of hand-written
//! routines that is loaded from disk and prepended to the output.
//!
//! Two output shapes:
//! - a directory containing `Sys.vm` consolidates into one bootstrapped
//!   `{dirname}.asm`;
//! - otherwise every file stands alone, prefixed with its own starter copy.

pub mod codegen;
pub mod error;
pub mod memory;
pub mod parser;
pub mod starter;

use std::fs;
use std::path::{Path, PathBuf};

pub use codegen::Translator;
pub use error::{Result, VmError};
pub use starter::{DEFAULT_STARTER_FILE, bootstrap, load_starter};

use parser::parse_line;

/// Translate one file's command text, appending to the translator's state.
///
/// `stem` namespaces `static` references and seeds label scoping before the
/// first `function` command.
pub fn translate_source(source: &str, stem: &str, translator: &mut Translator) -> Result<String> {
    translator.set_file_stem(stem);

    let mut out = String::with_capacity(source.lines().count() * 48);
    for (i, line) in source.lines().enumerate() {
        if let Some(command) = parse_line(line, i + 1, stem)? {
            translator.translate(&command, &mut out);
        }
    }
    Ok(out)
}

/// Translate one `.vm` file through a shared translator, without a starter.
pub fn translate_file(path: &Path, translator: &mut Translator) -> Result<String> {
    let source = fs::read_to_string(path).map_err(|e| VmError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    translate_source(&source, &file_stem(path), translator)
}

/// Translate a single `.vm` file into a standalone program: starter first,
/// then the file's translation. Counters start fresh.
pub fn translate_single(path: &Path, starter: &str) -> Result<String> {
    let mut translator = Translator::new();
    let body = translate_file(path, &mut translator)?;
    let mut out = String::with_capacity(starter.len() + body.len() + 1);
    out.push_str(starter);
    push_separator(&mut out);
    out.push_str(&body);
    Ok(out)
}

/// What `translate_directory` produced.
#[derive(Debug)]
pub enum DirectoryOutput {
    /// `Sys.vm` present: one combined program, named `{dirname}.asm`.
    Combined(String),
    /// No `Sys.vm`: standalone output text per file, with its `.asm` path.
    PerFile(Vec<(PathBuf, String)>),
}

/// Translate every `.vm` file in a directory.
pub fn translate_directory(dir: &Path, starter: &str) -> Result<DirectoryOutput> {
    let mut vm_files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| VmError::FileRead {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();

    if vm_files.is_empty() {
        return Err(VmError::NoVmFiles {
            path: dir.to_path_buf(),
        });
    }
    vm_files.sort();

    let sys_index = vm_files
        .iter()
        .position(|path| path.file_name().is_some_and(|name| name == "Sys.vm"));

    match sys_index {
        Some(index) => {
            // Sys.vm first, then the rest in name order, one shared
            // translator so comparison counters stay global.
            let sys_file = vm_files.remove(index);
            let mut translator = Translator::new();

            let mut out = bootstrap(&mut translator);
            push_separator(&mut out);
            out.push_str(starter);
            push_separator(&mut out);

            out.push_str(&translate_file(&sys_file, &mut translator)?);
            for path in &vm_files {
                out.push_str(&translate_file(path, &mut translator)?);
            }
            Ok(DirectoryOutput::Combined(out))
        }
        None => {
            let mut outputs = Vec::with_capacity(vm_files.len());
            for path in &vm_files {
                let asm = translate_single(path, starter)?;
                outputs.push((path.with_extension("asm"), asm));
            }
            Ok(DirectoryOutput::PerFile(outputs))
        }
    }
}

/// Output path for an input: `Foo.vm` -> `Foo.asm`, `dir/` -> `dir/dir.asm`.
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{}.asm", name))
    } else {
        input.with_extension("asm")
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

fn push_separator(out: &mut String) {
    if !out.ends_with('\n') {
        out.push('\n');
    }
}
