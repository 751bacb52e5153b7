//! Starter and bootstrap blocks shared by every translation.
//!
//! The starter is a hand-written assembly blob hosting the `CALL`,
//! `RETURN`, and `COMP_BEGIN` routines that generated code jumps into. It
//! is loaded from disk and prepended verbatim; nothing here inspects it.

use crate::codegen::Translator;
use crate::error::{Result, VmError};
use crate::parser::VmCommand;
use std::fs;
use std::path::Path;

/// Default location of the starter blob, next to the working directory.
pub const DEFAULT_STARTER_FILE: &str = "starter_code.txt";

/// Read the shared runtime routines from disk.
pub fn load_starter(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VmError::StarterUnreadable {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Program entry: SP = 256, then `call Sys.init 0` through the regular
/// call lowering so the frame layout matches every other call.
pub fn bootstrap(translator: &mut Translator) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("@256\nD=A\n@SP\nM=D\n");
    translator.translate(
        &VmCommand::Call {
            name: "Sys.init".to_string(),
            num_args: 0,
        },
        &mut out,
    );
    out
}
