//! PolyFactor Command Line Interface
//!
//! Usage:
//!   polyfactor [OPTIONS] [input-file]
//!   polyfactor --help
//!
//! Examples:
//!   polyfactor accesses.maps                 # Factor the maps in a file
//!   cat accesses.maps | polyfactor --verify  # Read from stdin, check round trips
//!   polyfactor --matrices -vv accesses.maps  # Show H and Q, debug logging

use clap::Parser;
use polyfactor::utils::PolyPrinter;
use polyfactor::FactorConfig;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use anyhow::{Result, Context};
use log::{info, debug, error};

/// PolyFactor - common-factor decomposition of affine maps
#[derive(Parser, Debug)]
#[command(name = "polyfactor")]
#[command(author = "PolyFactor Contributors")]
#[command(version)]
#[command(about = "Factor affine maps through a shared minimal intermediate space", long_about = None)]
struct Cli {
    /// Input file with one or more maps (defaults to stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verify every round trip, even in release builds
    #[arg(long)]
    verify: bool,

    /// Prefix of the provenance names given to input outputs
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Prefix of the intermediate dimension names
    #[arg(long, value_name = "PREFIX")]
    mid_prefix: Option<String>,

    /// Also print the trimmed Hermite factors
    #[arg(long)]
    matrices: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("PolyFactor v{}", polyfactor::VERSION);
    debug!("Input file: {:?}", cli.input);

    let source = read_input(&cli.input)?;

    let maps = polyfactor::parse_maps(&source)
        .with_context(|| "Failed to parse input")?;
    info!("Parsed {} maps", maps.len());

    let config = build_config(&cli);
    debug!("Factor config: {:?}", config);

    let result = match polyfactor::factor_with_config(&maps, &config) {
        Ok(result) => result,
        Err(e) => {
            error!("Factorization failed: {}", e);
            return Err(e.into());
        }
    };

    let mut printer = PolyPrinter::new().with_matrices(cli.matrices);
    printer.print_factorization(&maps, &result);
    write_output(&cli.output, printer.output())
}

fn build_config(cli: &Cli) -> FactorConfig {
    let mut config = FactorConfig::default();
    if cli.verify {
        config.verify = true;
    }
    if let Some(ref prefix) = cli.prefix {
        config.output_prefix = prefix.clone();
    }
    if let Some(ref prefix) = cli.mid_prefix {
        config.mid_prefix = prefix.clone();
    }
    config
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p)
            .with_context(|| format!("Failed to read input file: {:?}", p)),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .with_context(|| "Failed to read stdin")?;
            Ok(source)
        }
    }
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
