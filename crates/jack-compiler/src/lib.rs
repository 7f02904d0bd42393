//! Jack-to-VM compiler
//!
//! Translates Jack source (a small object-oriented language) into
//! nand2tetris stack-machine VM code. The pipeline is a single linear
//! pass with no materialized AST: scanner -> symbol environment ->
//! recursive-descent parser/emitter -> VM writer.

pub mod compiler;
pub mod driver;
pub mod scanner;
pub mod symbol_table;
pub mod token;
pub mod vm_writer;
pub mod xml;

pub use compiler::compile_class;
pub use driver::{compile_file, compile_path, find_jack_files};
