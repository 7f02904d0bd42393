//! File-system driver for `vmt`.
//!
//! A single `X.vm` file translates to a sibling `X.asm`, without the
//! bootstrap. A directory `D` translates to `D/D.asm`: the bootstrap
//! followed by the concatenation of every `D/*.vm` file's translation, in
//! one combined program. Unlike the Jack driver, a directory here is a
//! single compilation unit — there is one output program, not one output
//! per input file — so a failure on any member file aborts the whole
//! build rather than letting the rest continue; the combined `D.asm`
//! never gets a partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use n2t_diagnostics::{ToolchainError, ToolchainResult};

use crate::codegen::AssemblyWriter;
use crate::command::parse;

fn io_err(path: &Path, source: std::io::Error) -> ToolchainError {
    ToolchainError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The base name used to mangle that file's `static` segment:
/// `static i` pushes/pops `@<filebase>.i`.
fn file_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_output(path: &Path, bytes: &[u8]) -> ToolchainResult<()> {
    let mut file = fs::File::create(path).map_err(|e| io_err(path, e))?;
    file.write_all(bytes).map_err(|e| io_err(path, e))?;
    file.flush().map_err(|e| io_err(path, e))
}

/// Translate a single `.vm` file to its `.asm` sibling. Single-file mode
/// never emits a bootstrap.
pub fn translate_file(path: &Path) -> ToolchainResult<PathBuf> {
    let source = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let commands = parse(&source, path)?;

    let mut writer = AssemblyWriter::new(Vec::new(), file_base_name(path));
    for (command, _line) in &commands {
        writer.write_command(command).map_err(|e| io_err(path, e))?;
    }

    let output_path = path.with_extension("asm");
    write_output(&output_path, &writer.into_inner())?;
    Ok(output_path)
}

/// Find every `*.vm` file directly under `dir` (not recursive).
pub fn find_vm_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "vm") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Translate every `.vm` file under `dir` into a single `D/D.asm`
/// program, bootstrap first. One writer is kept alive across every
/// member file so the call/comparison label counter stays monotonic
/// over the whole program; only the static-mangling file base changes
/// between files.
pub fn translate_directory(dir: &Path) -> ToolchainResult<PathBuf> {
    let files = find_vm_files(dir).map_err(|e| io_err(dir, e))?;
    let dir_name = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut writer = AssemblyWriter::new(Vec::new(), String::new());
    writer.write_bootstrap().map_err(|e| io_err(dir, e))?;

    for file in &files {
        let source = fs::read_to_string(file).map_err(|e| io_err(file, e))?;
        let commands = parse(&source, file)?;
        writer.set_file_base(file_base_name(file));
        for (command, _line) in &commands {
            writer.write_command(command).map_err(|e| io_err(file, e))?;
        }
    }

    let output_path = dir.join(format!("{dir_name}.asm"));
    write_output(&output_path, &writer.into_inner())?;
    Ok(output_path)
}

/// Translate `path`, which may be a single `.vm` file or a directory of
/// them.
pub fn translate_path(path: &Path) -> ToolchainResult<PathBuf> {
    if path.is_dir() {
        translate_directory(path)
    } else {
        translate_file(path)
    }
}
