//! Standalone compress/decompress utility for the Huffman codec.

use clap::{Parser, Subcommand};
use codec_core::cli::validate_paths;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Subcommand)]
enum Commands {
    #[clap(alias = "c")]
    Compress {
        input_file: PathBuf,
        output_file: PathBuf,
    },
    #[clap(alias = "d")]
    Decompress {
        input_file: PathBuf,
        output_file: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Huffman coding utility.")]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
    /// Prints the code table and compression ratio after the operation.
    #[arg(short, long)]
    stats: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    let (input_file, output_file) = match &args.command {
        Commands::Compress {
            input_file,
            output_file,
        } => (input_file, output_file),
        Commands::Decompress {
            input_file,
            output_file,
        } => (input_file, output_file),
    };

    if let Err(e) = validate_paths(input_file, output_file) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let data = match std::fs::read(input_file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", input_file.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.command {
        Commands::Compress { .. } => {
            if args.stats {
                huffman_codec::compress_with_details(&data).map(|(out, details)| {
                    log::info!(
                        "{} codes, ratio {:.4}, size {}",
                        details.codes.len(),
                        details.compression_ratio,
                        details.size
                    );
                    out
                })
            } else {
                huffman_codec::compress(&data)
            }
        }
        Commands::Decompress { .. } => {
            if args.stats {
                huffman_codec::decompress_with_details(&data).map(|(out, details)| {
                    log::info!(
                        "{} codes, ratio {:.4}, size {}",
                        details.codes.len(),
                        details.compression_ratio,
                        details.size
                    );
                    out
                })
            } else {
                huffman_codec::decompress(&data)
            }
        }
    };

    match result {
        Ok(out) => {
            if let Err(e) = std::fs::write(output_file, out) {
                eprintln!("error: failed to write {}: {e}", output_file.display());
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
