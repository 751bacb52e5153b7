//! VM translator CLI - translates `.vm` files to Hack assembly.
//!
//! Usage:
//!     vm-translator <file.vm | directory> [--starter <file>]

use clap::Parser as ClapParser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vm_translator::{
    DEFAULT_STARTER_FILE, DirectoryOutput, VmError, load_starter, output_path, translate_directory,
    translate_single,
};

#[derive(ClapParser, Debug)]
#[command(name = "vm-translator")]
#[command(version)]
#[command(about = "Translates VM bytecode to Hack assembly")]
struct Args {
    /// A .vm file or a directory containing .vm files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Starter blob with the shared CALL/RETURN/COMP_BEGIN routines
    #[arg(long, default_value = DEFAULT_STARTER_FILE)]
    starter: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let starter = match load_starter(&args.starter) {
        Ok(starter) => starter,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let result = if args.input.is_dir() {
        directory_mode(&args.input, &starter)
    } else if args.input.extension().is_some_and(|ext| ext == "vm") {
        file_mode(&args.input, &starter)
    } else {
        eprintln!("Error: not a .vm file or directory: {}", args.input.display());
        return ExitCode::from(2);
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn file_mode(input: &Path, starter: &str) -> Result<(), VmError> {
    let asm = translate_single(input, starter)?;
    let out = output_path(input);
    write(&out, &asm)?;
    println!("{}", out.display());
    Ok(())
}

fn directory_mode(input: &Path, starter: &str) -> Result<(), VmError> {
    match translate_directory(input, starter)? {
        DirectoryOutput::Combined(asm) => {
            let out = output_path(input);
            write(&out, &asm)?;
            println!("{}", out.display());
        }
        DirectoryOutput::PerFile(outputs) => {
            for (out, asm) in outputs {
                write(&out, &asm)?;
                println!("{}", out.display());
            }
        }
    }
    Ok(())
}

fn write(path: &Path, text: &str) -> Result<(), VmError> {
    fs::write(path, text).map_err(|e| VmError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
