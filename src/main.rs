use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pion::Shell;

/// Single-level file system simulator.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Command script to read instead of stdin
    input: Option<PathBuf>,

    /// File to write the output to instead of stdout
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("unable to open file {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("unable to open file {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    match Shell::new(input, output).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("shell error: {e}");
            ExitCode::FAILURE
        }
    }
}
