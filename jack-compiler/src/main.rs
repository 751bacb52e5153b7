//! Jack compiler CLI - compiles `.jack` sources to `.vm` files.
//!
//! Usage:
//!     jack-compiler <file.jack | directory>

use clap::Parser as ClapParser;
use jack_compiler::{compile_directory, compile_file, write_vm};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(name = "jack-compiler")]
#[command(version)]
#[command(about = "Compiles Jack source code to VM bytecode")]
struct Args {
    /// A .jack file or a directory containing .jack files
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.input.is_file() {
        if args.input.extension().is_none_or(|ext| ext != "jack") {
            eprintln!("Error: not a .jack file: {}", args.input.display());
            return ExitCode::from(2);
        }
        compile_file_mode(&args.input)
    } else if args.input.is_dir() {
        compile_directory_mode(&args.input)
    } else {
        eprintln!("Error: input not found: {}", args.input.display());
        ExitCode::from(2)
    }
}

fn compile_file_mode(input: &Path) -> ExitCode {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    let dir = input
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match compile_file(input).and_then(|vm| write_vm(&dir, &stem, &vm)) {
        Ok(out_path) => {
            println!("Compiled {} -> {}", input.display(), out_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", input.display(), e);
            ExitCode::from(1)
        }
    }
}

fn compile_directory_mode(dir: &Path) -> ExitCode {
    let outcomes = match compile_directory(dir) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut failed = false;
    for outcome in &outcomes {
        match &outcome.vm {
            Ok(vm) => match write_vm(dir, &outcome.stem, vm) {
                Ok(out_path) => {
                    println!("Compiled {}.jack -> {}", outcome.stem, out_path.display());
                }
                Err(e) => {
                    eprintln!("{}: {}", outcome.stem, e);
                    failed = true;
                }
            },
            Err(e) => {
                eprintln!("{}.jack: {}", outcome.stem, e);
                failed = true;
            }
        }
    }

    if failed { ExitCode::from(1) } else { ExitCode::SUCCESS }
}
