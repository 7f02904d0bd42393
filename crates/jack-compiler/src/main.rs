//! `jackc` — compile Jack source to VM code.

use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile Jack source to nand2tetris VM code", long_about = None)]
struct Cli {
    /// A single `.jack` file, or a directory containing `.jack` files
    path: PathBuf,

    /// Print the scanner's XML token listing instead of compiling
    #[arg(long)]
    emit_tokens: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.emit_tokens {
        run_emit_tokens(&cli.path);
        return;
    }

    run_build(&cli.path);
}

fn run_build(path: &PathBuf) {
    let failures = match jackc::compile_path(path) {
        Ok(failures) => failures,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if failures.is_empty() {
        println!("Compiled {}", path.display());
        return;
    }

    for (file, err) in &failures {
        eprintln!("Error: {}: {}", file.display(), err);
    }
    eprintln!(
        "{} of {} file(s) failed to compile",
        failures.len(),
        failures.len() + count_successes(path, failures.len())
    );
    process::exit(1);
}

fn count_successes(path: &PathBuf, failure_count: usize) -> usize {
    let total = if path.is_dir() {
        jackc::find_jack_files(path).map(|v| v.len()).unwrap_or(0)
    } else {
        1
    };
    total.saturating_sub(failure_count)
}

fn run_emit_tokens(path: &PathBuf) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match jackc::scanner::tokenize(&source, path) {
        Ok(tokens) => print!("{}", jackc::xml::render_tokens(&tokens)),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
