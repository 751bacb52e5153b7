//! VM command to Hack assembly lowering.
//!
//! Comparisons, calls, and returns are not expanded inline: generated code
//! jumps into the shared `COMP_BEGIN`/`CALL`/`RETURN` routines of the
//! starter block, with their inputs parked in fixed registers first.
//!
//! Register protocol:
//! - comparison: return address in R14, flavor (-1 lt / 0 eq / 1 gt) in R15
//! - call: `num_args + 5` in R14, callee address in R13, return address in D
//! - pop to a far indirect slot: target address staged in R13

use crate::memory::{
    POP_INLINE_LIMIT, PUSH_INLINE_LIMIT, base_symbol, direct_address,
};
use crate::parser::{ArithmeticOp, Segment, VmCommand};
use std::collections::HashMap;

/// Pushes the D register; leaves A pointing at the pushed slot.
const PUSH_D: &str = "@SP\nAM=M+1\nA=A-1\nM=D\n";

/// Pops the stack top into D.
const POP_TOP: &str = "@SP\nAM=M-1\nD=M\n";

/// Translator state for one invocation. All counters live here; a fresh
/// value starts from zero.
#[derive(Debug, Default)]
pub struct Translator {
    /// File stem used to namespace `static` references.
    file_stem: String,
    /// Function whose body is being translated; scopes labels and return
    /// addresses.
    current_function: String,
    /// Function name -> next call-site ordinal, seeded by each `function`.
    call_counts: HashMap<String, u32>,
    /// Comparison return-label ordinals, global across functions.
    eq_count: u32,
    lt_count: u32,
    gt_count: u32,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stem used for `static` symbols of the file being translated.
    pub fn set_file_stem(&mut self, stem: &str) {
        self.file_stem = stem.to_string();
    }

    pub fn current_function(&self) -> &str {
        &self.current_function
    }

    /// Append the assembly for one command to `out`.
    pub fn translate(&mut self, command: &VmCommand, out: &mut String) {
        match command {
            VmCommand::Arithmetic(op) => self.arithmetic(*op, out),
            VmCommand::Push { segment, index } => self.push(*segment, *index, out),
            VmCommand::Pop { segment, index } => self.pop(*segment, *index, out),
            VmCommand::Label { name } => {
                out.push_str(&format!("({}${})\n", self.current_function, name));
            }
            VmCommand::Goto { label } => {
                out.push_str(&format!("@{}${}\n0;JMP\n", self.current_function, label));
            }
            VmCommand::IfGoto { label } => {
                out.push_str(POP_TOP);
                out.push_str(&format!("@{}${}\nD;JNE\n", self.current_function, label));
            }
            VmCommand::Function { name, num_locals } => self.function(name, *num_locals, out),
            VmCommand::Call { name, num_args } => self.call(name, *num_args, out),
            VmCommand::Return => out.push_str("@RETURN\n0;JMP\n"),
        }
    }

    fn arithmetic(&mut self, op: ArithmeticOp, out: &mut String) {
        match op {
            ArithmeticOp::Add => self.binary("D+M", out),
            ArithmeticOp::Sub => self.binary("M-D", out),
            ArithmeticOp::And => self.binary("D&M", out),
            ArithmeticOp::Or => self.binary("D|M", out),
            ArithmeticOp::Neg => self.unary("-M", out),
            ArithmeticOp::Not => self.unary("!M", out),
            ArithmeticOp::Eq | ArithmeticOp::Lt | ArithmeticOp::Gt => self.comparison(op, out),
        }
    }

    fn binary(&self, operation: &str, out: &mut String) {
        out.push_str(POP_TOP);
        out.push_str("A=A-1\nM=");
        out.push_str(operation);
        out.push('\n');
    }

    fn unary(&self, operation: &str, out: &mut String) {
        out.push_str("@SP\nA=M-1\nM=");
        out.push_str(operation);
        out.push('\n');
    }

    /// Comparisons share one compare-and-branch routine in the starter.
    /// The return-label counter is global per operation, keeping these
    /// labels outside any function's label namespace.
    fn comparison(&mut self, op: ArithmeticOp, out: &mut String) {
        let (mnemonic, flavor, counter) = match op {
            ArithmeticOp::Lt => ("lt", "-1", &mut self.lt_count),
            ArithmeticOp::Eq => ("eq", "0", &mut self.eq_count),
            ArithmeticOp::Gt => ("gt", "1", &mut self.gt_count),
            _ => return,
        };
        let label = format!("{}.{}.{}", self.current_function, mnemonic, *counter);
        *counter += 1;

        out.push_str(&format!(
            "@{label}\nD=A\n@R14\nM=D\n@R15\nM={flavor}\n@COMP_BEGIN\n0;JMP\n({label})\n"
        ));
    }

    fn push(&self, segment: Segment, index: u16, out: &mut String) {
        match segment {
            Segment::Constant => {
                // 0 and 1 are Hack ALU constants; no address load needed.
                if index <= 1 {
                    out.push_str(&format!("D={}\n", index));
                } else {
                    out.push_str(&format!("@{}\nD=A\n", index));
                }
            }
            Segment::Static => {
                out.push_str(&format!("@{}.{}\nD=M\n", self.file_stem, index));
            }
            Segment::Temp | Segment::Pointer => {
                if let Some(address) = direct_address(segment, index) {
                    out.push_str(&format!("@{}\nD=M\n", address));
                }
            }
            _ => {
                if let Some(base) = base_symbol(segment) {
                    seek(base, index, out);
                    out.push_str("D=M\n");
                }
            }
        }
        out.push_str(PUSH_D);
    }

    fn pop(&self, segment: Segment, index: u16, out: &mut String) {
        match segment {
            Segment::Constant => {
                // Rejected by the parser.
                debug_assert!(false, "pop to constant reached the code generator");
            }
            Segment::Static => {
                out.push_str(POP_TOP);
                out.push_str(&format!("@{}.{}\nM=D\n", self.file_stem, index));
            }
            Segment::Temp | Segment::Pointer => {
                if let Some(address) = direct_address(segment, index) {
                    out.push_str(POP_TOP);
                    out.push_str(&format!("@{}\nM=D\n", address));
                }
            }
            _ => {
                let Some(base) = base_symbol(segment) else {
                    return;
                };
                if index < POP_INLINE_LIMIT {
                    out.push_str(POP_TOP);
                    if index == 0 {
                        out.push_str(&format!("@{}\nA=M\nM=D\n", base));
                    } else {
                        out.push_str(&format!("@{}\nA=M+1\n", base));
                        for _ in 1..index {
                            out.push_str("A=A+1\n");
                        }
                        out.push_str("M=D\n");
                    }
                } else {
                    // The target address would need D, which the popped
                    // value occupies; stage it in R13 before popping.
                    out.push_str(&format!("@{}\nD=A\n@{}\nD=D+M\n@R13\nM=D\n", index, base));
                    out.push_str(POP_TOP);
                    out.push_str("@R13\nA=M\nM=D\n");
                }
            }
        }
    }

    fn function(&mut self, name: &str, num_locals: u16, out: &mut String) {
        self.current_function = name.to_string();
        self.call_counts.insert(name.to_string(), 0);

        out.push_str(&format!("({})\n", name));
        for _ in 0..num_locals {
            out.push_str("D=0\n");
            out.push_str(PUSH_D);
        }
    }

    fn call(&mut self, name: &str, num_args: u16, out: &mut String) {
        let ordinal = self
            .call_counts
            .entry(self.current_function.clone())
            .or_insert(0);
        let return_label = format!("{}$ret.{}", self.current_function, ordinal);
        *ordinal += 1;

        out.push_str(&format!("@{}\nD=A\n@R14\nM=D\n", num_args + 5));
        out.push_str(&format!("@{}\nD=A\n@R13\nM=D\n", name));
        out.push_str(&format!(
            "@{return_label}\nD=A\n@CALL\n0;JMP\n({return_label})\n"
        ));
    }
}

/// Leave A pointing at `*base + index`.
fn seek(base: &str, index: u16, out: &mut String) {
    if index == 0 {
        out.push_str(&format!("@{}\nA=M\n", base));
    } else if index < PUSH_INLINE_LIMIT {
        out.push_str(&format!("@{}\nA=M+1\n", base));
        for _ in 1..index {
            out.push_str("A=A+1\n");
        }
    } else {
        out.push_str(&format!("@{}\nD=A\n@{}\nA=D+M\n", index, base));
    }
}
