//! VM command parsing.
//!
//! One command per line; `//` starts a comment. Commands parse to typed
//! values with their operands validated up front, so the code generator
//! never sees an ill-formed command.

use crate::error::{Result, VmError};
use phf::phf_map;

/// The nine arithmetic/logical stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Lt,
    Gt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    fn from_mnemonic(word: &str) -> Option<Self> {
        match word {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "neg" => Some(ArithmeticOp::Neg),
            "eq" => Some(ArithmeticOp::Eq),
            "lt" => Some(ArithmeticOp::Lt),
            "gt" => Some(ArithmeticOp::Gt),
            "and" => Some(ArithmeticOp::And),
            "or" => Some(ArithmeticOp::Or),
            "not" => Some(ArithmeticOp::Not),
            _ => None,
        }
    }
}

/// The eight VM memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

/// Segment-name map, built at compile time.
static SEGMENTS: phf::Map<&'static str, Segment> = phf_map! {
    "constant" => Segment::Constant,
    "local" => Segment::Local,
    "argument" => Segment::Argument,
    "this" => Segment::This,
    "that" => Segment::That,
    "pointer" => Segment::Pointer,
    "temp" => Segment::Temp,
    "static" => Segment::Static,
};

/// A validated VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label { name: String },
    Goto { label: String },
    IfGoto { label: String },
    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

/// Context for error reporting while parsing one line.
struct Line<'a> {
    file: &'a str,
    number: usize,
}

impl Line<'_> {
    fn missing(&self, command: &str) -> VmError {
        VmError::MissingArgument {
            file: self.file.to_string(),
            line: self.number,
            command: command.to_string(),
        }
    }

    fn name_arg(&self, words: &mut std::str::SplitWhitespace<'_>, command: &str) -> Result<String> {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| self.missing(command))
    }

    fn index_arg(&self, words: &mut std::str::SplitWhitespace<'_>, command: &str) -> Result<u16> {
        let word = words.next().ok_or_else(|| self.missing(command))?;
        word.parse::<u16>().map_err(|_| VmError::InvalidIndex {
            file: self.file.to_string(),
            line: self.number,
            value: word.to_string(),
        })
    }

    fn segment_arg(&self, words: &mut std::str::SplitWhitespace<'_>, command: &str) -> Result<Segment> {
        let word = words.next().ok_or_else(|| self.missing(command))?;
        SEGMENTS
            .get(word)
            .copied()
            .ok_or_else(|| VmError::UnknownSegment {
                file: self.file.to_string(),
                line: self.number,
                segment: word.to_string(),
            })
    }

    fn check_index(&self, segment: Segment, index: u16) -> Result<()> {
        let limit = match segment {
            Segment::Pointer => 1,
            Segment::Temp => 7,
            _ => return Ok(()),
        };
        if index > limit {
            return Err(VmError::IndexOutOfRange {
                file: self.file.to_string(),
                line: self.number,
                segment: if segment == Segment::Pointer {
                    "pointer"
                } else {
                    "temp"
                },
                index,
            });
        }
        Ok(())
    }
}

/// Parse a single line. `Ok(None)` for blank lines and comments.
pub fn parse_line(text: &str, line_number: usize, file: &str) -> Result<Option<VmCommand>> {
    let code = text.split("//").next().unwrap_or("").trim();
    let mut words = code.split_whitespace();
    let Some(op) = words.next() else {
        return Ok(None);
    };

    let line = Line {
        file,
        number: line_number,
    };

    if let Some(arith) = ArithmeticOp::from_mnemonic(op) {
        return Ok(Some(VmCommand::Arithmetic(arith)));
    }

    let command = match op {
        "push" => {
            let segment = line.segment_arg(&mut words, op)?;
            let index = line.index_arg(&mut words, op)?;
            line.check_index(segment, index)?;
            VmCommand::Push { segment, index }
        }
        "pop" => {
            let segment = line.segment_arg(&mut words, op)?;
            if segment == Segment::Constant {
                return Err(VmError::PopToConstant {
                    file: file.to_string(),
                    line: line_number,
                });
            }
            let index = line.index_arg(&mut words, op)?;
            line.check_index(segment, index)?;
            VmCommand::Pop { segment, index }
        }
        "label" => VmCommand::Label {
            name: line.name_arg(&mut words, op)?,
        },
        "goto" => VmCommand::Goto {
            label: line.name_arg(&mut words, op)?,
        },
        "if-goto" => VmCommand::IfGoto {
            label: line.name_arg(&mut words, op)?,
        },
        "function" => VmCommand::Function {
            name: line.name_arg(&mut words, op)?,
            num_locals: line.index_arg(&mut words, op)?,
        },
        "call" => VmCommand::Call {
            name: line.name_arg(&mut words, op)?,
            num_args: line.index_arg(&mut words, op)?,
        },
        "return" => VmCommand::Return,
        _ => {
            return Err(VmError::UnknownCommand {
                file: file.to_string(),
                line: line_number,
                command: op.to_string(),
            });
        }
    };

    Ok(Some(command))
}
