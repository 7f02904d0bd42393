//! File-system driver for `jackc`.
//!
//! A single `.jack` file compiles to a sibling `.vm` file. A directory
//! compiles every `*.jack` file it contains (recursively) to its own
//! sibling `.vm` file. A fatal error in one file aborts only that file;
//! the driver continues with the rest and reports a non-zero exit only if
//! at least one file failed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use n2t_diagnostics::{ToolchainError, ToolchainResult};

use crate::compiler::compile_class;

/// Compile a single `.jack` file, writing its `.vm` sibling.
///
/// No partial output is left behind on failure: the buffer is built up
/// in memory and only written out once compilation succeeds in full.
pub fn compile_file(path: &Path) -> ToolchainResult<PathBuf> {
    let source = fs::read_to_string(path).map_err(|e| ToolchainError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let vm_code = compile_class(&source, path, Vec::new())?;

    let output_path = path.with_extension("vm");
    let mut file = fs::File::create(&output_path).map_err(|e| ToolchainError::Io {
        path: output_path.clone(),
        source: e,
    })?;
    file.write_all(&vm_code).map_err(|e| ToolchainError::Io {
        path: output_path.clone(),
        source: e,
    })?;
    file.flush().map_err(|e| ToolchainError::Io {
        path: output_path.clone(),
        source: e,
    })?;

    Ok(output_path)
}

/// Find every `*.jack` file under `dir`, recursing into subdirectories.
pub fn find_jack_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(find_jack_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "jack") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Compile `path`, which may be a single `.jack` file or a directory of
/// them. Returns the list of files that failed to *compile* (Lex/Syntax/
/// Resolve/Segment), each paired with its error; an empty vec means every
/// unit compiled. Per spec, an `Io` failure is a driver-level error rather
/// than a per-unit one: it aborts the whole run immediately instead of
/// being recorded alongside compile failures and left for the remaining
/// units to run past.
pub fn compile_path(path: &Path) -> ToolchainResult<Vec<(PathBuf, ToolchainError)>> {
    let units = if path.is_dir() {
        find_jack_files(path).map_err(|e| ToolchainError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
    } else {
        vec![path.to_path_buf()]
    };

    let mut failures = Vec::new();
    for unit in units {
        match compile_file(&unit) {
            Ok(_) => {}
            Err(e @ ToolchainError::Io { .. }) => return Err(e),
            Err(e) => failures.push((unit, e)),
        }
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn compiles_a_single_file_to_its_vm_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Main.jack");
        fs::write(&src, "class Main { function void main() { return; } }").unwrap();

        let out = compile_file(&src).unwrap();
        assert_eq!(out, dir.path().join("Main.vm"));
        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("function Main.main 0"));
    }

    #[test]
    fn directory_compile_continues_past_a_failing_unit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Good.jack"),
            "class Good { function void f() { return; } }",
        )
        .unwrap();
        fs::write(dir.path().join("Bad.jack"), "class 1Bad { }").unwrap();

        let failures = compile_path(dir.path()).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, dir.path().join("Bad.jack"));
        assert!(dir.path().join("Good.vm").exists());
    }

    #[test]
    fn an_io_failure_aborts_the_whole_run_instead_of_being_recorded_as_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Bad.jack"),
            "class Bad { function void f() { return; } }",
        )
        .unwrap();
        // Bad.vm already exists as a directory, so writing its compiled
        // output fails with an IO error rather than a compile error.
        fs::create_dir(dir.path().join("Bad.vm")).unwrap();

        let err = compile_path(dir.path()).unwrap_err();
        assert!(matches!(err, ToolchainError::Io { .. }));
    }
}
