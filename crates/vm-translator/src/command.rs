//! Line-oriented VM parser.
//!
//! Every non-blank, non-comment line is exactly one command. There is no
//! lookahead and no multi-line construct: strip the trailing `// ...`
//! comment and surrounding whitespace, split on spaces, and classify by the
//! first token.

use std::fmt;
use std::path::Path;

use n2t_diagnostics::{SourceLocation, ToolchainError, ToolchainResult};

/// One of the eight VM memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "constant" => Segment::Constant,
            "argument" => Segment::Argument,
            "local" => Segment::Local,
            "static" => Segment::Static,
            "this" => Segment::This,
            "that" => Segment::That,
            "pointer" => Segment::Pointer,
            "temp" => Segment::Temp,
            _ => return None,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        write!(f, "{s}")
    }
}

/// One of the nine arithmetic/logical VM ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "add" => ArithmeticOp::Add,
            "sub" => ArithmeticOp::Sub,
            "neg" => ArithmeticOp::Neg,
            "eq" => ArithmeticOp::Eq,
            "gt" => ArithmeticOp::Gt,
            "lt" => ArithmeticOp::Lt,
            "and" => ArithmeticOp::And,
            "or" => ArithmeticOp::Or,
            "not" => ArithmeticOp::Not,
            _ => return None,
        })
    }
}

/// A single parsed VM command, paired with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

/// Strip a trailing `// ...` comment and surrounding whitespace. Returns
/// `None` for a blank or comment-only line.
fn format_line(line: &str) -> Option<&str> {
    let without_comment = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };
    let trimmed = without_comment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_u16(raw: &str, loc: &SourceLocation) -> ToolchainResult<u16> {
    raw.parse::<u16>()
        .map_err(|_| ToolchainError::Segment {
            at: loc.clone(),
            message: format!("expected a non-negative integer, found `{raw}`"),
        })
}

fn parse_segment(raw: &str, loc: &SourceLocation) -> ToolchainResult<Segment> {
    Segment::from_str(raw).ok_or_else(|| ToolchainError::Segment {
        at: loc.clone(),
        message: format!("unknown segment `{raw}`"),
    })
}

/// Parse every command in `source`, skipping blank and comment-only lines.
pub fn parse(source: &str, file: &Path) -> ToolchainResult<Vec<(VmCommand, usize)>> {
    let mut commands = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let Some(formatted) = format_line(raw_line) else {
            continue;
        };
        let loc = SourceLocation::new(file.to_path_buf(), line_no);
        let fields: Vec<&str> = formatted.split_whitespace().collect();
        let command = parse_command(&fields, &loc)?;
        commands.push((command, line_no));
    }
    Ok(commands)
}

fn parse_command(fields: &[&str], loc: &SourceLocation) -> ToolchainResult<VmCommand> {
    match fields {
        [op] if ArithmeticOp::from_str(op).is_some() => {
            Ok(VmCommand::Arithmetic(ArithmeticOp::from_str(op).unwrap()))
        }
        ["return"] => Ok(VmCommand::Return),
        ["push", seg, idx] => Ok(VmCommand::Push(
            parse_segment(seg, loc)?,
            parse_u16(idx, loc)?,
        )),
        ["pop", seg, idx] => {
            let segment = parse_segment(seg, loc)?;
            if segment == Segment::Constant {
                return Err(ToolchainError::Segment {
                    at: loc.clone(),
                    message: "cannot pop into the constant segment".to_string(),
                });
            }
            Ok(VmCommand::Pop(segment, parse_u16(idx, loc)?))
        }
        ["label", name] => Ok(VmCommand::Label(name.to_string())),
        ["goto", name] => Ok(VmCommand::Goto(name.to_string())),
        ["if-goto", name] => Ok(VmCommand::IfGoto(name.to_string())),
        ["function", name, k] => Ok(VmCommand::Function(name.to_string(), parse_u16(k, loc)?)),
        ["call", name, n] => Ok(VmCommand::Call(name.to_string(), parse_u16(n, loc)?)),
        _ => Err(ToolchainError::Segment {
            at: loc.clone(),
            message: format!("unrecognized command `{}`", fields.join(" ")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file() -> &'static Path {
        Path::new("Test.vm")
    }

    #[test]
    fn parses_each_arithmetic_op() {
        let source = "add\nsub\nneg\neq\ngt\nlt\nand\nor\nnot\n";
        let commands = parse(source, file()).unwrap();
        assert_eq!(
            commands.iter().map(|(c, _)| c.clone()).collect::<Vec<_>>(),
            vec![
                VmCommand::Arithmetic(ArithmeticOp::Add),
                VmCommand::Arithmetic(ArithmeticOp::Sub),
                VmCommand::Arithmetic(ArithmeticOp::Neg),
                VmCommand::Arithmetic(ArithmeticOp::Eq),
                VmCommand::Arithmetic(ArithmeticOp::Gt),
                VmCommand::Arithmetic(ArithmeticOp::Lt),
                VmCommand::Arithmetic(ArithmeticOp::And),
                VmCommand::Arithmetic(ArithmeticOp::Or),
                VmCommand::Arithmetic(ArithmeticOp::Not),
            ]
        );
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let source = "// a full-line comment\n\npush constant 5 // trailing\n";
        let commands = parse(source, file()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].0, VmCommand::Push(Segment::Constant, 5));
    }

    #[test]
    fn parses_call_and_function_with_counts() {
        let source = "function Main.main 3\ncall Math.multiply 2\nreturn\n";
        let commands: Vec<VmCommand> = parse(source, file())
            .unwrap()
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(
            commands,
            vec![
                VmCommand::Function("Main.main".to_string(), 3),
                VmCommand::Call("Math.multiply".to_string(), 2),
                VmCommand::Return,
            ]
        );
    }

    #[test]
    fn unknown_segment_is_fatal() {
        let err = parse("push frobnicate 0", file()).unwrap_err();
        assert!(err.to_string().contains("unknown segment"));
    }

    #[test]
    fn unrecognized_command_is_fatal() {
        let err = parse("frobnicate", file()).unwrap_err();
        assert!(err.to_string().contains("unrecognized command"));
    }

    #[test]
    fn malformed_argument_count_is_fatal() {
        let err = parse("push constant abc", file()).unwrap_err();
        assert!(err.to_string().contains("expected a non-negative integer"));
    }

    #[test]
    fn popping_into_constant_is_fatal() {
        let err = parse("pop constant 0", file()).unwrap_err();
        assert!(err.to_string().contains("cannot pop into the constant segment"));
    }
}
