//! Hack assembly code generation.
//!
//! `AssemblyWriter` is the stateful counterpart to the Jack pipeline's
//! `VMWriter`: unlike that one, this writer must track the current
//! function (for label scoping and the `RETURN.F.u` / comparison-label
//! counter) and the current file's base name (for `static` mangling), so
//! the state lives here rather than in a separate emission context.

use std::io::{self, Write};

use crate::command::{ArithmeticOp, Segment, VmCommand};

pub struct AssemblyWriter<W: Write> {
    out: W,
    file_base: String,
    current_function: String,
    label_counter: u32,
}

impl<W: Write> AssemblyWriter<W> {
    pub fn new(out: W, file_base: impl Into<String>) -> Self {
        AssemblyWriter {
            out,
            file_base: file_base.into(),
            current_function: String::new(),
            label_counter: 0,
        }
    }

    /// Emit the bootstrap prologue: `SP=256` followed by `call Sys.init 0`.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        writeln!(self.out, "@256\nD=A\n@SP\nM=D")?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_command(&mut self, command: &VmCommand) -> io::Result<()> {
        match command {
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Push(seg, idx) => self.write_push(*seg, *idx),
            VmCommand::Pop(seg, idx) => self.write_pop(*seg, *idx),
            VmCommand::Label(name) => self.write_label(name),
            VmCommand::Goto(name) => self.write_goto(name),
            VmCommand::IfGoto(name) => self.write_if_goto(name),
            VmCommand::Function(name, k) => self.write_function(name, *k),
            VmCommand::Call(name, n) => self.write_call(name, *n),
            VmCommand::Return => self.write_return(),
        }
    }

    fn next_label(&mut self) -> u32 {
        self.label_counter += 1;
        self.label_counter
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) -> io::Result<()> {
        match op {
            ArithmeticOp::Add => {
                writeln!(self.out, "@SP\nM=M-1\nA=M\nD=M\nA=A-1\nM=M+D")
            }
            ArithmeticOp::Sub => {
                writeln!(self.out, "@SP\nM=M-1\nA=M\nD=M\nA=A-1\nM=M-D")
            }
            ArithmeticOp::Neg => writeln!(self.out, "@SP\nA=M-1\nM=-M"),
            ArithmeticOp::And => {
                writeln!(self.out, "@SP\nM=M-1\nA=M\nD=M\nA=A-1\nM=D&M")
            }
            ArithmeticOp::Or => {
                writeln!(self.out, "@SP\nM=M-1\nA=M\nD=M\nA=A-1\nM=D|M")
            }
            ArithmeticOp::Not => writeln!(self.out, "@SP\nA=M-1\nM=!M"),
            ArithmeticOp::Eq => self.write_comparison("EQUAL", "JEQ", "D=D-M"),
            ArithmeticOp::Gt => self.write_comparison("GREATER", "JGT", "D=M-D"),
            ArithmeticOp::Lt => self.write_comparison("LESS", "JLT", "D=M-D"),
        }
    }

    /// `eq`/`gt`/`lt` share this shape: subtract, branch on the given jump
    /// mnemonic, push `-1` (true) or `0` (false). The label pair is scoped
    /// by the current function name and a fresh counter value so no two
    /// comparisons in the file collide.
    ///
    /// `subtract` is `D=D-M` (second-from-top minus top, i.e. `y-x`) for
    /// `eq`, where sign doesn't matter, and `D=M-D` (`x-y`) for `gt`/`lt`,
    /// which do care about operand order.
    fn write_comparison(&mut self, true_tag: &str, jump: &str, subtract: &str) -> io::Result<()> {
        let label_id = self.next_label();
        let e = format!("${}{}", self.current_function, label_id);
        writeln!(
            self.out,
            "@SP\nM=M-1\nA=M\nD=M\nA=A-1\n{subtract}\n\
             @{true_tag}{e}\nD;{jump}\n\
             @SP\nA=M-1\nM=0\n\
             @END{e}\n0;JMP\n\
             ({true_tag}{e})\n@SP\nA=M-1\nM=-1\n\
             (END{e})"
        )
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1")
            }
            Segment::Argument => self.write_push_indirect("ARG", index),
            Segment::Local => self.write_push_indirect("LCL", index),
            Segment::This => self.write_push_indirect("THIS", index),
            Segment::That => self.write_push_indirect("THAT", index),
            Segment::Temp => {
                writeln!(
                    self.out,
                    "@5\nD=A\n@{index}\nA=D+A\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1"
                )
            }
            Segment::Pointer => {
                writeln!(
                    self.out,
                    "@3\nD=A\n@{index}\nA=D+A\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1"
                )
            }
            Segment::Static => {
                writeln!(
                    self.out,
                    "@{}.{index}\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1",
                    self.file_base
                )
            }
        }
    }

    fn write_push_indirect(&mut self, base: &str, index: u16) -> io::Result<()> {
        writeln!(
            self.out,
            "@{base}\nD=M\n@{index}\nA=D+A\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1"
        )
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Argument => self.write_pop_indirect("ARG", index),
            Segment::Local => self.write_pop_indirect("LCL", index),
            Segment::This => self.write_pop_indirect("THIS", index),
            Segment::That => self.write_pop_indirect("THAT", index),
            Segment::Temp => self.write_pop_base(5, index),
            Segment::Pointer => self.write_pop_base(3, index),
            Segment::Static => {
                writeln!(self.out, "@SP\nM=M-1\nA=M\nD=M\n@{}.{index}\nM=D", self.file_base)
            }
            Segment::Constant => unreachable!("the parser rejects `pop constant`"),
        }
    }

    /// `pop argument/local/this/that i`: stash the target address in `R13`
    /// so popping the value doesn't clobber it.
    fn write_pop_indirect(&mut self, base: &str, index: u16) -> io::Result<()> {
        writeln!(
            self.out,
            "@{base}\nD=M\n@{index}\nD=D+A\n@R13\nM=D\n@SP\nM=M-1\nA=M\nD=M\n@R13\nA=M\nM=D"
        )
    }

    fn write_pop_base(&mut self, base: u16, index: u16) -> io::Result<()> {
        writeln!(
            self.out,
            "@{base}\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n@SP\nM=M-1\nA=M\nD=M\n@R13\nA=M\nM=D"
        )
    }

    fn write_label(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "({}${name})", self.current_function)
    }

    fn write_goto(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "@{}${name}\n0;JMP", self.current_function)
    }

    fn write_if_goto(&mut self, name: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "@SP\nM=M-1\nA=M\nD=M\n@{}${name}\nD;JNE",
            self.current_function
        )
    }

    /// `function F k`: emit `(F)` then `k` pushes of `constant 0` to
    /// zero-initialize the locals.
    fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        self.current_function = name.to_string();
        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            writeln!(self.out, "@SP\nA=M\nM=0\n@SP\nM=M+1")?;
        }
        Ok(())
    }

    /// `call F n` protocol: push the return address, save the caller's
    /// four state registers, reposition `ARG`/`LCL`, jump, and declare the
    /// return label landed on by that jump.
    fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        let label_id = self.next_label();
        writeln!(
            self.out,
            "@RETURN.{name}.{label_id}\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1"
        )?;
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{reg}\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1")?;
        }
        let reposition = u32::from(n_args) + 5;
        writeln!(
            self.out,
            "@SP\nD=M\n@{reposition}\nD=D-A\n@ARG\nM=D\n@SP\nD=M\n@LCL\nM=D"
        )?;
        writeln!(self.out, "@{name}\n0;JMP")?;
        writeln!(self.out, "(RETURN.{name}.{label_id})")
    }

    /// Return protocol using `R14=FRAME`, `R15=RET`.
    fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "@LCL\nD=M\n@R14\nM=D")?; // FRAME = LCL
        writeln!(self.out, "@5\nA=D-A\nD=M\n@R15\nM=D")?; // RET = *(FRAME-5)
        writeln!(self.out, "@SP\nA=M-1\nD=M\n@ARG\nA=M\nM=D")?; // *ARG = pop()
        writeln!(self.out, "@ARG\nD=M+1\n@SP\nM=D")?; // SP = ARG + 1
        for (offset, dest) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            writeln!(
                self.out,
                "@R14\nD=M\n@{offset}\nA=D-A\nD=M\n@{dest}\nM=D"
            )?;
        }
        writeln!(self.out, "@R15\nA=M\n0;JMP")
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Switch the file whose static variables subsequent `static i`
    /// commands mangle against. Used by the directory driver, which keeps
    /// one writer alive across every `.vm` file it concatenates so label
    /// counters stay monotonic over the whole program.
    pub fn set_file_base(&mut self, file_base: impl Into<String>) {
        self.file_base = file_base.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse;
    use std::path::Path;

    fn translate(source: &str, file_base: &str) -> String {
        let commands = parse(source, Path::new("Test.vm")).unwrap();
        let mut writer = AssemblyWriter::new(Vec::new(), file_base);
        for (command, _) in &commands {
            writer.write_command(command).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn push_constant_add_leaves_sum_on_stack_top() {
        let asm = translate("push constant 7\npush constant 8\nadd\n", "Test");
        assert!(asm.contains("@7\nD=A"));
        assert!(asm.contains("@8\nD=A"));
        assert!(asm.ends_with("A=A-1\nM=M+D\n"));
    }

    #[test]
    fn static_segment_is_mangled_by_file_base() {
        let asm = translate("push static 3\n", "Foo");
        assert!(asm.contains("@Foo.3"));
    }

    #[test]
    fn gt_subtracts_in_x_minus_y_order_so_eight_gt_three_is_true() {
        // push constant 8 / push constant 3 / gt: x=8, y=3, x>y so JGT must
        // see a positive D. D=D-M would compute y-x = -5 here and flip the
        // result; D=M-D computes x-y = 5, the correct sign for JGT.
        let asm = translate("push constant 8\npush constant 3\ngt\n", "Main");
        assert!(asm.contains("A=A-1\nD=M-D\n@GREATER"));
    }

    #[test]
    fn lt_also_subtracts_in_x_minus_y_order() {
        let asm = translate("push constant 3\npush constant 8\nlt\n", "Main");
        assert!(asm.contains("A=A-1\nD=M-D\n@LESS"));
    }

    #[test]
    fn eq_keeps_the_symmetric_subtraction_order() {
        let asm = translate("push constant 3\npush constant 3\neq\n", "Main");
        assert!(asm.contains("A=A-1\nD=D-M\n@EQUAL"));
    }

    #[test]
    fn comparison_labels_are_scoped_by_function_and_unique_per_call() {
        let asm = translate(
            "function Main.main 0\neq\neq\n",
            "Main",
        );
        assert!(asm.contains("@EQUAL$Main.main1"));
        assert!(asm.contains("@EQUAL$Main.main2"));
    }

    #[test]
    fn label_goto_and_if_goto_are_scoped_to_the_enclosing_function() {
        let asm = translate(
            "function Main.main 0\nlabel loop\ngoto loop\nif-goto loop\n",
            "Main",
        );
        assert!(asm.contains("(Main.main$loop)"));
        assert!(asm.contains("@Main.main$loop\n0;JMP"));
    }

    #[test]
    fn call_emits_return_label_four_state_pushes_and_reposition() {
        let asm = translate("call Foo.bar 2\n", "Main");
        assert!(asm.contains("@RETURN.Foo.bar.1"));
        assert!(asm.contains("@7\nD=D-A\n@ARG\nM=D"));
        assert!(asm.contains("@Foo.bar\n0;JMP"));
        assert!(asm.contains("(RETURN.Foo.bar.1)"));
    }

    #[test]
    fn third_call_in_a_file_gets_a_fresh_return_label_counter() {
        let asm = translate("eq\neq\ncall Foo.bar 2\n", "Main");
        assert!(asm.contains("(RETURN.Foo.bar.3)"));
    }

    #[test]
    fn function_zero_initializes_its_locals() {
        let asm = translate("function Main.main 2\n", "Main");
        assert_eq!(asm.matches("@SP\nA=M\nM=0\n@SP\nM=M+1").count(), 2);
    }

    #[test]
    fn return_uses_r14_as_frame_and_r15_as_ret() {
        let asm = translate("return\n", "Main");
        assert!(asm.starts_with("@LCL\nD=M\n@R14\nM=D"));
        assert!(asm.contains("@R15\nA=M\n0;JMP"));
    }
}
