use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::Rng;

const LABELS: [&str; 3] = ["red", "white", "rose"];

/// Generates a synthetic labeled-vector dataset for the ranking job
#[derive(Debug, Parser)]
#[command(name = "feature-rank-datagen", version)]
struct Cli {
    /// Where to write the dataset
    output: PathBuf,

    /// Number of records
    #[arg(long, default_value_t = 500_000)]
    rows: usize,

    /// Readings per record
    #[arg(long, default_value_t = 20)]
    features: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match generate(&cli) {
        Ok(()) => {
            println!("wrote {} rows to {}", cli.rows, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("datagen failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: &Cli) -> std::io::Result<()> {
    let mut rng = rand::rng();
    let mut writer = BufWriter::new(File::create(&cli.output)?);

    // Header line, as the original generator writes; the analysis job
    // counts it as a parse error and moves on
    write!(writer, "wine_type")?;
    for i in 0..cli.features {
        write!(writer, ",feature_{i}")?;
    }
    writeln!(writer)?;

    for _ in 0..cli.rows {
        let label = LABELS[rng.random_range(0..LABELS.len())];
        write!(writer, "{label}")?;
        for _ in 0..cli.features {
            write!(writer, ",{}", rng.random_range(0.0..10.0))?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}
