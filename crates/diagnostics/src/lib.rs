//! Shared diagnostics for the nand2tetris toolchain
//!
//! Both compilation stages (Jack-to-VM and VM-to-Hack) abort the current
//! compilation unit on the first error instead of recovering locally. This
//! crate carries the error taxonomy and source-location type common to both,
//! so a driver can print a uniform `file:line: message` diagnostic no matter
//! which stage failed.

use std::fmt;
use std::path::PathBuf;

/// A location within a single source file.
///
/// Lines are 1-indexed to match the numbers a user sees in an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: PathBuf, line: usize) -> Self {
        SourceLocation { file, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// The full error taxonomy shared by both pipelines.
///
/// A compilation unit aborts on the first of these it hits; there is no
/// error aggregation within a single file. `IO` is reserved for failures at
/// the driver level (reading/writing files) and aborts the whole run rather
/// than just one unit.
#[derive(Debug)]
pub enum ToolchainError {
    /// Bad byte, unterminated string/comment, or numeric overflow.
    Lex { at: SourceLocation, message: String },
    /// Unexpected token; carries the offending literal and what was expected.
    Syntax {
        at: SourceLocation,
        found: String,
        expected: String,
    },
    /// Use of an undeclared identifier in a variable-position context.
    Resolve { at: SourceLocation, name: String },
    /// Unknown VM segment/command or malformed argument count.
    Segment { at: SourceLocation, message: String },
    /// Failure reading or writing a file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainError::Lex { at, message } => write!(f, "{at}: lex error: {message}"),
            ToolchainError::Syntax {
                at,
                found,
                expected,
            } => write!(f, "{at}: syntax error: expected {expected}, found `{found}`"),
            ToolchainError::Resolve { at, name } => {
                write!(f, "{at}: undeclared identifier `{name}`")
            }
            ToolchainError::Segment { at, message } => write!(f, "{at}: {message}"),
            ToolchainError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ToolchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolchainError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type ToolchainResult<T> = Result<T, ToolchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_file_and_line() {
        let loc = SourceLocation::new(PathBuf::from("Main.jack"), 12);
        assert_eq!(loc.to_string(), "Main.jack:12");
    }

    #[test]
    fn syntax_error_names_found_and_expected() {
        let err = ToolchainError::Syntax {
            at: SourceLocation::new(PathBuf::from("Main.jack"), 3),
            found: ";".to_string(),
            expected: "an identifier".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("expected an identifier"));
        assert!(rendered.contains("found `;`"));
    }
}
