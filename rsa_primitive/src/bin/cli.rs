//! Standalone key generation, encryption, and decryption utility for
//! textbook RSA with PKCS#1 v1.5 padding.

use clap::{Parser, Subcommand};
use rsa_primitive::{PrivateKey, PublicKey};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generates a key pair and writes the base64-encoded public and
    /// private keys to the given files.
    GenerateKeys {
        #[arg(long, default_value_t = 2048)]
        bits: usize,
        public_key_file: PathBuf,
        private_key_file: PathBuf,
    },
    /// Encrypts `input_file` with a base64-encoded public key.
    Encrypt {
        public_key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },
    /// Decrypts `input_file` with a base64-encoded private key.
    Decrypt {
        private_key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Textbook RSA key generation and PKCS#1 v1.5 encryption utility.")]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

fn run(args: &CliArgs) -> Result<(), String> {
    match &args.command {
        Commands::GenerateKeys {
            bits,
            public_key_file,
            private_key_file,
        } => {
            let (public_key, private_key) =
                rsa_primitive::generate_keys(*bits).map_err(|e| e.to_string())?;
            log::info!("generated a {bits}-bit key pair");
            std::fs::write(public_key_file, public_key.to_base64())
                .map_err(|e| format!("failed to write {}: {e}", public_key_file.display()))?;
            std::fs::write(private_key_file, private_key.to_base64())
                .map_err(|e| format!("failed to write {}: {e}", private_key_file.display()))?;
            Ok(())
        }
        Commands::Encrypt {
            public_key_file,
            input_file,
            output_file,
        } => {
            let encoded = std::fs::read_to_string(public_key_file)
                .map_err(|e| format!("failed to read {}: {e}", public_key_file.display()))?;
            let public_key = PublicKey::from_base64(encoded.trim()).map_err(|e| e.to_string())?;
            let data = std::fs::read(input_file)
                .map_err(|e| format!("failed to read {}: {e}", input_file.display()))?;
            let ciphertext = rsa_primitive::encrypt(&public_key, &data).map_err(|e| e.to_string())?;
            std::fs::write(output_file, ciphertext)
                .map_err(|e| format!("failed to write {}: {e}", output_file.display()))
        }
        Commands::Decrypt {
            private_key_file,
            input_file,
            output_file,
        } => {
            let encoded = std::fs::read_to_string(private_key_file)
                .map_err(|e| format!("failed to read {}: {e}", private_key_file.display()))?;
            let private_key = PrivateKey::from_base64(encoded.trim()).map_err(|e| e.to_string())?;
            let ciphertext = std::fs::read(input_file)
                .map_err(|e| format!("failed to read {}: {e}", input_file.display()))?;
            let message = rsa_primitive::decrypt(&private_key, &ciphertext).map_err(|e| e.to_string())?;
            std::fs::write(output_file, message)
                .map_err(|e| format!("failed to write {}: {e}", output_file.display()))
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
