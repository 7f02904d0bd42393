//! Recursive-descent parser/emitter for Jack.
//!
//! There is no materialized AST: each grammar production matches terminals
//! with one token of lookahead and emits VM code as it goes.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use n2t_diagnostics::{SourceLocation, ToolchainError, ToolchainResult};

use crate::scanner::{tokenize, Scanner};
use crate::symbol_table::{Kind, SymbolEnv};
use crate::token::{Keyword, Symbol, Token, TokenKind};
use crate::vm_writer::{ArithmeticOp, Segment, VMWriter};

/// Whether a subroutine name (within the class currently being compiled)
/// was declared `method`, `function`, or `constructor`. Needed to resolve
/// a bare `f(x)` call: method-on-this if `f` is a declared method of the
/// current class, otherwise a plain call to a local function of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// Per-unit emission state: current class, label-uniqueness counters, and
/// the subroutine-kind table used to resolve bare calls.
struct EmissionContext {
    class_name: String,
    if_counter: u32,
    while_counter: u32,
    subroutine_kinds: HashMap<String, SubroutineKind>,
}

/// Scan the token stream for `(constructor|function|method) <type> <name>`
/// shapes and record each subroutine's declared kind. This is a shallow
/// pattern match, not a parse — it only needs to find the handful of
/// tokens immediately following the three introducer keywords, and it
/// never needs to look inside a subroutine body.
fn collect_subroutine_kinds(tokens: &[Token]) -> HashMap<String, SubroutineKind> {
    let mut kinds = HashMap::new();
    let mut i = 0;
    while i < tokens.len() {
        let introducer = match &tokens[i].kind {
            TokenKind::Keyword(Keyword::Constructor) => Some(SubroutineKind::Constructor),
            TokenKind::Keyword(Keyword::Function) => Some(SubroutineKind::Function),
            TokenKind::Keyword(Keyword::Method) => Some(SubroutineKind::Method),
            _ => None,
        };
        if let Some(kind) = introducer {
            // introducer, return-type token, name token
            if let Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) = tokens.get(i + 2)
            {
                kinds.insert(name.clone(), kind);
            }
        }
        i += 1;
    }
    kinds
}

fn kind_to_segment(kind: Kind) -> Segment {
    match kind {
        Kind::Static => Segment::Static,
        Kind::Field => Segment::This,
        Kind::Arg => Segment::Argument,
        Kind::Var => Segment::Local,
    }
}

pub struct Compiler<W: Write> {
    scanner: Scanner,
    symbols: SymbolEnv,
    writer: VMWriter<W>,
    ctx: EmissionContext,
    file: PathBuf,
}

/// Compile one Jack source file to VM code, writing it to `out`.
pub fn compile_class<W: Write>(source: &str, file: &Path, out: W) -> ToolchainResult<W> {
    let tokens = tokenize(source, file)?;
    let subroutine_kinds = collect_subroutine_kinds(&tokens);
    let scanner = Scanner::new(tokens, file.to_path_buf());
    let mut compiler = Compiler {
        scanner,
        symbols: SymbolEnv::new(),
        writer: VMWriter::new(out),
        ctx: EmissionContext {
            class_name: String::new(),
            if_counter: 0,
            while_counter: 0,
            subroutine_kinds,
        },
        file: file.to_path_buf(),
    };
    compiler.compile_class()?;
    Ok(compiler.writer.into_inner())
}

impl<W: Write> Compiler<W> {
    fn loc(&self) -> SourceLocation {
        self.scanner.location()
    }

    fn current_text(&self) -> String {
        match self.scanner.peek() {
            Some(tok) => tok.kind.to_string(),
            None => "<end of file>".to_string(),
        }
    }

    fn syntax_error(&self, expected: &str) -> ToolchainError {
        ToolchainError::Syntax {
            at: self.loc(),
            found: self.current_text(),
            expected: expected.to_string(),
        }
    }

    fn io_error(&self, e: std::io::Error) -> ToolchainError {
        ToolchainError::Io {
            path: self.file.clone(),
            source: e,
        }
    }

    fn advance(&mut self) -> ToolchainResult<Token> {
        self.scanner
            .advance()
            .ok_or_else(|| self.syntax_error("more input"))
    }

    fn peek_symbol(&self) -> Option<Symbol> {
        match self.scanner.peek()?.kind {
            TokenKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.scanner.peek()?.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    fn expect_symbol(&mut self, expected: Symbol) -> ToolchainResult<()> {
        if self.peek_symbol() == Some(expected) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.syntax_error(&format!("`{expected}`")))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> ToolchainResult<()> {
        if self.peek_keyword() == Some(expected) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.syntax_error(&format!("`{expected}`")))
        }
    }

    fn expect_identifier(&mut self) -> ToolchainResult<String> {
        match self.advance()?.kind {
            TokenKind::Identifier(name) => Ok(name),
            other => Err(ToolchainError::Syntax {
                at: self.loc(),
                found: other.to_string(),
                expected: "an identifier".to_string(),
            }),
        }
    }

    /// A Jack type is either the primitive keywords or a class identifier.
    fn expect_type(&mut self) -> ToolchainResult<String> {
        match self.advance()?.kind {
            TokenKind::Keyword(k) if k.is_primitive_type() => Ok(k.as_str().to_string()),
            TokenKind::Identifier(name) => Ok(name),
            other => Err(ToolchainError::Syntax {
                at: self.loc(),
                found: other.to_string(),
                expected: "a type".to_string(),
            }),
        }
    }

    fn resolve(&self, name: &str) -> ToolchainResult<(Kind, String, u16)> {
        self.symbols
            .lookup(name)
            .map(|e| (e.kind, e.declared_type.clone(), e.index))
            .ok_or_else(|| ToolchainError::Resolve {
                at: self.loc(),
                name: name.to_string(),
            })
    }

    // ---- class ----

    fn compile_class(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::Class)?;
        self.ctx.class_name = self.expect_identifier()?;
        self.expect_symbol(Symbol::LBrace)?;

        while matches!(self.peek_keyword(), Some(Keyword::Static) | Some(Keyword::Field)) {
            self.compile_class_var_dec()?;
        }

        while matches!(
            self.peek_keyword(),
            Some(Keyword::Constructor) | Some(Keyword::Function) | Some(Keyword::Method)
        ) {
            self.compile_subroutine()?;
        }

        self.expect_symbol(Symbol::RBrace)
    }

    fn compile_class_var_dec(&mut self) -> ToolchainResult<()> {
        let kind = match self.advance()?.kind {
            TokenKind::Keyword(Keyword::Static) => Kind::Static,
            TokenKind::Keyword(Keyword::Field) => Kind::Field,
            _ => unreachable!("guarded by caller"),
        };
        let declared_type = self.expect_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &declared_type, kind);
            if self.peek_symbol() == Some(Symbol::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect_symbol(Symbol::Semicolon)
    }

    // ---- subroutines ----

    fn compile_subroutine(&mut self) -> ToolchainResult<()> {
        self.symbols.start_subroutine();
        let subroutine_kind = match self.advance()?.kind {
            TokenKind::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(Keyword::Function) => SubroutineKind::Function,
            TokenKind::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => unreachable!("guarded by caller"),
        };

        if subroutine_kind == SubroutineKind::Method {
            self.symbols
                .define("this", &self.ctx.class_name.clone(), Kind::Arg);
        }

        // return type: `<type> | void`
        match self.scanner.peek().map(|t| &t.kind) {
            Some(TokenKind::Keyword(Keyword::Void)) => {
                self.advance()?;
            }
            _ => {
                self.expect_type()?;
            }
        }

        let name = self.expect_identifier()?;
        self.expect_symbol(Symbol::LParen)?;
        self.compile_parameter_list()?;
        self.expect_symbol(Symbol::RParen)?;

        self.expect_symbol(Symbol::LBrace)?;
        while self.peek_keyword() == Some(Keyword::Var) {
            self.compile_var_dec()?;
        }
        let n_locals = self.symbols.count(Kind::Var);

        let qualified = format!("{}.{}", self.ctx.class_name, name);
        self.writer
            .write_function(&qualified, n_locals)
            .map_err(|e| self.io_error(e))?;

        match subroutine_kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.count(Kind::Field);
                self.writer
                    .write_push(Segment::Constant, n_fields)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_call("Memory.alloc", 1)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_pop(Segment::Pointer, 0)
                    .map_err(|e| self.io_error(e))?;
            }
            SubroutineKind::Method => {
                self.writer
                    .write_push(Segment::Argument, 0)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_pop(Segment::Pointer, 0)
                    .map_err(|e| self.io_error(e))?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.expect_symbol(Symbol::RBrace)
    }

    fn compile_parameter_list(&mut self) -> ToolchainResult<()> {
        if self.peek_symbol() == Some(Symbol::RParen) {
            return Ok(());
        }
        loop {
            let declared_type = self.expect_type()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &declared_type, Kind::Arg);
            if self.peek_symbol() == Some(Symbol::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn compile_var_dec(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::Var)?;
        let declared_type = self.expect_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &declared_type, Kind::Var);
            if self.peek_symbol() == Some(Symbol::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect_symbol(Symbol::Semicolon)
    }

    // ---- statements ----

    fn compile_statements(&mut self) -> ToolchainResult<()> {
        loop {
            match self.peek_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let (kind, _ty, index) = self.resolve(&name)?;
        let segment = kind_to_segment(kind);

        if self.peek_symbol() == Some(Symbol::LBracket) {
            self.advance()?;
            self.writer
                .write_push(segment, index)
                .map_err(|e| self.io_error(e))?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::RBracket)?;
            self.writer
                .write_arithmetic(ArithmeticOp::Add)
                .map_err(|e| self.io_error(e))?;

            self.expect_symbol(Symbol::Eq)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::Semicolon)?;

            self.writer
                .write_pop(Segment::Temp, 0)
                .map_err(|e| self.io_error(e))?;
            self.writer
                .write_pop(Segment::Pointer, 1)
                .map_err(|e| self.io_error(e))?;
            self.writer
                .write_push(Segment::Temp, 0)
                .map_err(|e| self.io_error(e))?;
            self.writer
                .write_pop(Segment::That, 0)
                .map_err(|e| self.io_error(e))?;
        } else {
            self.expect_symbol(Symbol::Eq)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::Semicolon)?;
            self.writer
                .write_pop(segment, index)
                .map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn compile_if(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::If)?;
        let idx = self.ctx.if_counter;
        self.ctx.if_counter += 1;
        let false_label = format!("IF_FALSE.{idx}");
        let end_label = format!("IF_END.{idx}");

        self.expect_symbol(Symbol::LParen)?;
        self.compile_expression()?;
        self.expect_symbol(Symbol::RParen)?;
        self.writer
            .write_arithmetic(ArithmeticOp::Not)
            .map_err(|e| self.io_error(e))?;
        self.writer
            .write_if_goto(&false_label)
            .map_err(|e| self.io_error(e))?;

        self.expect_symbol(Symbol::LBrace)?;
        self.compile_statements()?;
        self.expect_symbol(Symbol::RBrace)?;
        self.writer
            .write_goto(&end_label)
            .map_err(|e| self.io_error(e))?;
        self.writer
            .write_label(&false_label)
            .map_err(|e| self.io_error(e))?;

        if self.peek_keyword() == Some(Keyword::Else) {
            self.advance()?;
            self.expect_symbol(Symbol::LBrace)?;
            self.compile_statements()?;
            self.expect_symbol(Symbol::RBrace)?;
        }
        self.writer
            .write_label(&end_label)
            .map_err(|e| self.io_error(e))
    }

    fn compile_while(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::While)?;
        let idx = self.ctx.while_counter;
        self.ctx.while_counter += 1;
        let begin_label = format!("WHILE_BEGIN.{idx}");
        let end_label = format!("WHILE_END.{idx}");

        self.writer
            .write_label(&begin_label)
            .map_err(|e| self.io_error(e))?;
        self.expect_symbol(Symbol::LParen)?;
        self.compile_expression()?;
        self.expect_symbol(Symbol::RParen)?;
        self.writer
            .write_arithmetic(ArithmeticOp::Not)
            .map_err(|e| self.io_error(e))?;
        self.writer
            .write_if_goto(&end_label)
            .map_err(|e| self.io_error(e))?;

        self.expect_symbol(Symbol::LBrace)?;
        self.compile_statements()?;
        self.expect_symbol(Symbol::RBrace)?;
        self.writer
            .write_goto(&begin_label)
            .map_err(|e| self.io_error(e))?;
        self.writer
            .write_label(&end_label)
            .map_err(|e| self.io_error(e))
    }

    fn compile_do(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_term()?;
        self.expect_symbol(Symbol::Semicolon)?;
        self.writer
            .write_pop(Segment::Temp, 0)
            .map_err(|e| self.io_error(e))
    }

    fn compile_return(&mut self) -> ToolchainResult<()> {
        self.expect_keyword(Keyword::Return)?;
        if self.peek_symbol() == Some(Symbol::Semicolon) {
            self.writer
                .write_push(Segment::Constant, 0)
                .map_err(|e| self.io_error(e))?;
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(Symbol::Semicolon)?;
        self.writer.write_return().map_err(|e| self.io_error(e))
    }

    // ---- expressions ----

    /// Jack deliberately has no operator precedence: terms and operators
    /// are emitted strictly in left-to-right post-order.
    fn compile_expression(&mut self) -> ToolchainResult<()> {
        self.compile_term()?;
        loop {
            let op = match self.peek_symbol() {
                Some(s) if s.is_binary_op() => s,
                _ => break,
            };
            self.advance()?;
            self.compile_term()?;
            self.write_operation(op)?;
        }
        Ok(())
    }

    fn write_operation(&mut self, op: Symbol) -> ToolchainResult<()> {
        match op {
            Symbol::Plus => self.writer.write_arithmetic(ArithmeticOp::Add),
            Symbol::Minus => self.writer.write_arithmetic(ArithmeticOp::Sub),
            Symbol::Star => self.writer.write_call("Math.multiply", 2),
            Symbol::Slash => self.writer.write_call("Math.divide", 2),
            Symbol::Amp => self.writer.write_arithmetic(ArithmeticOp::And),
            Symbol::Pipe => self.writer.write_arithmetic(ArithmeticOp::Or),
            Symbol::Lt => self.writer.write_arithmetic(ArithmeticOp::Lt),
            Symbol::Gt => self.writer.write_arithmetic(ArithmeticOp::Gt),
            Symbol::Eq => self.writer.write_arithmetic(ArithmeticOp::Eq),
            _ => unreachable!("guarded by is_binary_op"),
        }
        .map_err(|e| self.io_error(e))
    }

    fn compile_expression_list(&mut self) -> ToolchainResult<u16> {
        if self.peek_symbol() == Some(Symbol::RParen) {
            return Ok(0);
        }
        let mut n_args = 0u16;
        self.compile_expression()?;
        n_args += 1;
        while self.peek_symbol() == Some(Symbol::Comma) {
            self.advance()?;
            self.compile_expression()?;
            n_args += 1;
        }
        Ok(n_args)
    }

    fn compile_term(&mut self) -> ToolchainResult<()> {
        match self.scanner.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::IntConst(n)) => {
                self.advance()?;
                self.writer
                    .write_push(Segment::Constant, n)
                    .map_err(|e| self.io_error(e))
            }
            Some(TokenKind::StringConst(s)) => {
                self.advance()?;
                self.writer
                    .write_push(Segment::Constant, s.len() as u16)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_call("String.new", 1)
                    .map_err(|e| self.io_error(e))?;
                for byte in s.bytes() {
                    self.writer
                        .write_push(Segment::Constant, byte as u16)
                        .map_err(|e| self.io_error(e))?;
                    self.writer
                        .write_call("String.appendChar", 2)
                        .map_err(|e| self.io_error(e))?;
                }
                Ok(())
            }
            Some(TokenKind::Keyword(k)) if k.is_keyword_constant() => {
                self.advance()?;
                match k {
                    Keyword::True => {
                        self.writer
                            .write_push(Segment::Constant, 0)
                            .map_err(|e| self.io_error(e))?;
                        self.writer
                            .write_arithmetic(ArithmeticOp::Not)
                            .map_err(|e| self.io_error(e))
                    }
                    Keyword::False | Keyword::Null => self
                        .writer
                        .write_push(Segment::Constant, 0)
                        .map_err(|e| self.io_error(e)),
                    Keyword::This => self
                        .writer
                        .write_push(Segment::Pointer, 0)
                        .map_err(|e| self.io_error(e)),
                    _ => unreachable!("guarded by is_keyword_constant"),
                }
            }
            Some(TokenKind::Symbol(Symbol::LParen)) => {
                self.advance()?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::RParen)
            }
            Some(TokenKind::Symbol(s)) if s.is_unary_op() => {
                self.advance()?;
                self.compile_term()?;
                let op = if s == Symbol::Minus {
                    ArithmeticOp::Neg
                } else {
                    ArithmeticOp::Not
                };
                self.writer
                    .write_arithmetic(op)
                    .map_err(|e| self.io_error(e))
            }
            Some(TokenKind::Identifier(name)) => {
                self.advance()?;
                self.compile_identifier_term(&name)
            }
            _ => Err(self.syntax_error("a term")),
        }
    }

    fn compile_identifier_term(&mut self, name: &str) -> ToolchainResult<()> {
        match self.peek_symbol() {
            Some(Symbol::LBracket) => {
                let (kind, _ty, index) = self.resolve(name)?;
                let segment = kind_to_segment(kind);
                self.advance()?;
                self.writer
                    .write_push(segment, index)
                    .map_err(|e| self.io_error(e))?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::RBracket)?;
                self.writer
                    .write_arithmetic(ArithmeticOp::Add)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_pop(Segment::Pointer, 1)
                    .map_err(|e| self.io_error(e))?;
                self.writer
                    .write_push(Segment::That, 0)
                    .map_err(|e| self.io_error(e))
            }
            Some(Symbol::LParen) => {
                self.advance()?;
                let is_method = matches!(
                    self.ctx.subroutine_kinds.get(name),
                    Some(SubroutineKind::Method)
                );
                if is_method {
                    self.writer
                        .write_push(Segment::Pointer, 0)
                        .map_err(|e| self.io_error(e))?;
                }
                let n_args = self.compile_expression_list()?;
                self.expect_symbol(Symbol::RParen)?;
                let qualified = format!("{}.{}", self.ctx.class_name, name);
                let total_args = if is_method { n_args + 1 } else { n_args };
                self.writer
                    .write_call(&qualified, total_args)
                    .map_err(|e| self.io_error(e))
            }
            Some(Symbol::Dot) => {
                self.advance()?;
                let member = self.expect_identifier()?;
                self.expect_symbol(Symbol::LParen)?;

                if let Ok((kind, declared_type, index)) = self.resolve(name) {
                    // `name` is a variable: implicit-this method call.
                    let segment = kind_to_segment(kind);
                    self.writer
                        .write_push(segment, index)
                        .map_err(|e| self.io_error(e))?;
                    let n_args = self.compile_expression_list()?;
                    self.expect_symbol(Symbol::RParen)?;
                    let qualified = format!("{declared_type}.{member}");
                    self.writer
                        .write_call(&qualified, n_args + 1)
                        .map_err(|e| self.io_error(e))
                } else {
                    // `name` is a class name: plain static call.
                    let n_args = self.compile_expression_list()?;
                    self.expect_symbol(Symbol::RParen)?;
                    let qualified = format!("{name}.{member}");
                    self.writer
                        .write_call(&qualified, n_args)
                        .map_err(|e| self.io_error(e))
                }
            }
            _ => {
                let (kind, _ty, index) = self.resolve(name)?;
                let segment = kind_to_segment(kind);
                self.writer
                    .write_push(segment, index)
                    .map_err(|e| self.io_error(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        let out = compile_class(src, Path::new("Foo.jack"), Vec::new()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn simple_function_returning_an_expression() {
        let out = compile("class Foo { function int g() { return 2+3; } }");
        assert_eq!(
            out,
            "function Foo.g 0\n\
             push constant 2\n\
             push constant 3\n\
             add\n\
             return\n"
        );
    }

    #[test]
    fn constructor_allocates_and_assigns_a_field() {
        let out = compile(
            "class Foo { field int x; constructor Foo new() { let x = 7; return this; } }",
        );
        assert_eq!(
            out,
            "function Foo.new 0\n\
             push constant 1\n\
             call Memory.alloc 1\n\
             pop pointer 0\n\
             push constant 7\n\
             pop this 0\n\
             push pointer 0\n\
             return\n"
        );
    }

    #[test]
    fn array_assignment_evaluates_rhs_before_clobbering_pointer_1() {
        let out = compile(
            "class Foo { function void f(Array a, int i, int j) { let a[i] = a[j]; return; } }",
        );
        assert_eq!(
            out,
            "function Foo.f 0\n\
             push argument 0\n\
             push argument 1\n\
             add\n\
             push argument 0\n\
             push argument 2\n\
             add\n\
             pop pointer 1\n\
             push that 0\n\
             pop temp 0\n\
             pop pointer 1\n\
             push temp 0\n\
             pop that 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn string_constant_builds_char_by_char() {
        let out = compile(r#"class Foo { function void f() { do g("AB"); return; } }"#);
        assert_eq!(
            out,
            "function Foo.f 0\n\
             push constant 2\n\
             call String.new 1\n\
             push constant 65\n\
             call String.appendChar 2\n\
             push constant 66\n\
             call String.appendChar 2\n\
             call Foo.g 1\n\
             pop temp 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn bare_call_to_a_declared_method_pushes_this() {
        let out = compile(
            "class Foo { method void helper() { return; } \
             method void run() { do helper(); return; } }",
        );
        assert!(out.contains("function Foo.run 0\npush argument 0\npop pointer 0\n"));
        assert!(out.contains("push pointer 0\ncall Foo.helper 1\n"));
    }

    #[test]
    fn bare_call_to_a_declared_function_has_no_implicit_this() {
        let out = compile(
            "class Foo { function void helper() { return; } \
             function void run() { do helper(); return; } }",
        );
        assert!(out.contains("call Foo.helper 0\n"));
        assert!(!out.contains("push pointer 0\ncall Foo.helper"));
    }

    #[test]
    fn if_else_uses_unique_labels_per_branch() {
        let out = compile(
            "class Foo { function void f(boolean b) { if (b) { let b = true; } else { let b = false; } return; } }",
        );
        assert!(out.contains("IF_FALSE.0"));
        assert!(out.contains("IF_END.0"));
    }

    #[test]
    fn while_loop_emits_begin_test_body_goto_end_in_order() {
        let out = compile(
            "class Foo { function void f(boolean b) { while (b) { let b = false; } return; } }",
        );
        assert_eq!(
            out,
            "function Foo.f 0\n\
             label WHILE_BEGIN.0\n\
             push argument 0\n\
             not\n\
             if-goto WHILE_END.0\n\
             push constant 0\n\
             pop argument 0\n\
             goto WHILE_BEGIN.0\n\
             label WHILE_END.0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn undeclared_identifier_is_a_resolve_error() {
        let err = compile_class(
            "class Foo { function void f() { let x = 1; return; } }",
            Path::new("Foo.jack"),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolchainError::Resolve { .. }));
    }
}
