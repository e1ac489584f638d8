#[cfg(feature = "cli")]
use std::{fs::File, io::BufReader, path::PathBuf};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use lacon::{read_triplets, CompressionConfig, NdMatrix, PatternCompressor, SparsityPattern};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Compress the sparsity pattern of a triplet matrix file by entry magnitude")]
struct Cli {
    /// Triplet file with one `row,col,value` entry per line
    input: PathBuf,

    /// Entries with magnitude at or below this value are dropped
    #[arg(short, long, default_value_t = 0.0)]
    threshold: f64,

    /// Row count (defaults to the largest row index + 1)
    #[arg(long)]
    rows: Option<usize>,

    /// Column count (defaults to the largest column index + 1)
    #[arg(long)]
    cols: Option<usize>,

    /// Compress rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the compressed pattern as JSON
    #[arg(long)]
    json: bool,
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = std::time::Instant::now();

    let triplets = read_triplets(BufReader::new(File::open(&cli.input)?))?;
    let rows = cli
        .rows
        .unwrap_or_else(|| triplets.iter().map(|&(row, _, _)| row + 1).max().unwrap_or(0));
    let cols = cli
        .cols
        .unwrap_or_else(|| triplets.iter().map(|&(_, col, _)| col + 1).max().unwrap_or(0));

    let mut matrix = NdMatrix::<f64>::zeros(rows, cols);
    let mut pattern = SparsityPattern::new(rows);
    for (row, col, value) in triplets {
        if row >= rows || col >= cols {
            return Err(format!("entry ({row}, {col}) outside a {rows}x{cols} matrix").into());
        }
        matrix.add_to_entry(row, col, value);
        pattern.insert(row, col);
    }

    let config = CompressionConfig::with_threshold(cli.threshold)
        .with_parallel(cli.parallel)
        .with_min_parallel_rows(1);
    let compressed = PatternCompressor::new(config).compress(&pattern, &matrix)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&compressed)?);
    } else {
        println!("Pattern: {rows} x {cols}");
        println!("  Entries before: {}", pattern.nnz());
        println!("  Entries after: {}", compressed.nnz());
        print!("{compressed}");
    }

    let elapsed = start_time.elapsed();
    eprintln!("Compressed in {elapsed:.2?}");

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This example requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --features cli --example compress_pattern");
    std::process::exit(1);
}
