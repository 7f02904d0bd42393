//! Typed emission of VM opcodes to a buffered sink.
//!
//! `VMWriter` holds no compilation state of its own — it is a thin,
//! stateless set of helpers that each write exactly one canonical line of
//! VM code. All compiler-side bookkeeping (label uniqueness, current
//! class) lives in [`crate::compiler::EmissionContext`].

use std::io::{self, Write};

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
    fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
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
    fn as_str(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }
}

pub struct VMWriter<W: Write> {
    out: W,
}

impl<W: Write> VMWriter<W> {
    pub fn new(out: W) -> Self {
        VMWriter { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "push {} {}", segment.as_str(), index)
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "pop {} {}", segment.as_str(), index)
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> io::Result<()> {
        writeln!(self.out, "{}", op.as_str())
    }

    pub fn write_label(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "label {name}")
    }

    pub fn write_goto(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "goto {name}")
    }

    pub fn write_if_goto(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "if-goto {name}")
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.out, "function {name} {n_locals}")
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.out, "call {name} {n_args}")
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "return")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
