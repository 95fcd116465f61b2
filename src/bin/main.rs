//! CMS encryption CLI
//!
//! Encrypts `-message` for the holder of `-cert` and prints the PEM envelope
//! or writes it to `-out`.

use cms_encrypt::cli::Cli;
use cms_encrypt::config::{ConfigManager, EncryptorConfiguration};
use cms_encrypt::{CmsResult, EncryptOutcome, EncryptRequest, EncryptWorkflow};
use std::path::Path;
use std::process::ExitCode;

/// Exit status for a failed run.
const EXIT_FAILURE: u8 = 1;
/// Exit status for a missing required argument.
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse_with_legacy_flags();

    let request = match cli.to_request() {
        Ok(request) => request,
        Err(missing) => {
            println!("{missing}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    // Loaded before logging starts so `verbose` in the file sets the filter too.
    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("Error running the command: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let verbose = cli.verbose || config.verbose;

    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&request, config, verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error running the command: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(request: &EncryptRequest, config: EncryptorConfiguration, verbose: bool) -> CmsResult<()> {
    let report = EncryptWorkflow::new(config).run(request)?;

    if verbose {
        eprintln!("Recipient: {}", report.recipient.subject);
        eprintln!("  Issuer: {}", report.recipient.issuer);
        eprintln!("  Serial: {}", report.recipient.serial_number);
        eprintln!("  Days until expiry: {}", report.recipient.days_until_expiry);
    }

    match report.outcome {
        EncryptOutcome::WrittenToFile { path, .. } => {
            println!("Wrote CMS content to file: {}", path.display());
        }
        EncryptOutcome::Encoded(envelope) => {
            println!("Encrypted using CMS:");
            println!("{}", String::from_utf8_lossy(envelope.as_bytes()));
        }
    }

    Ok(())
}

fn load_configuration(config_path: Option<&Path>) -> CmsResult<EncryptorConfiguration> {
    match config_path {
        // An explicitly named file must exist.
        Some(path) => ConfigManager::with_path(path).load(),
        None => ConfigManager::new()?.load_or_default(),
    }
}
