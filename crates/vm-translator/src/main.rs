//! `vmt` — translate nand2tetris VM code to Hack assembly.

use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;

#[derive(ClapParser)]
#[command(name = "vmt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate nand2tetris VM code to Hack assembly", long_about = None)]
struct Cli {
    /// A single `.vm` file, or a directory containing `.vm` files
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    match vmt::translate_path(&cli.path) {
        Ok(output) => println!("Wrote {}", output.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
