//! `EncryptWorkflow` orchestrates a single encryption run.
//!
//! Certificate loading, recipient checks, CMS encryption and output run in
//! that order with no retries; the first failure ends the run.

use crate::domain::envelope::{EncryptedEnvelope, OutputEncoding};
use crate::infra::config::EncryptorConfiguration;
use crate::infra::error::{CmsError, CmsResult};
use crate::infra::output::write_output;
use crate::services::{CertificateLoader, CmsEncryptor, RecipientAnalysis, RecipientValidator};
use std::path::PathBuf;

/// Everything one run needs, already taken from the command line.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub certificate_path: PathBuf,
    pub message: Vec<u8>,
    pub output_path: Option<PathBuf>,
    /// Overrides the configured output format when set
    pub encoding: Option<OutputEncoding>,
}

/// Where the encrypted envelope ended up.
#[derive(Debug)]
pub enum EncryptOutcome {
    WrittenToFile { path: PathBuf, bytes_written: usize },
    Encoded(EncryptedEnvelope),
}

#[derive(Debug)]
pub struct EncryptReport {
    pub outcome: EncryptOutcome,
    pub recipient: RecipientAnalysis,
}

pub struct EncryptWorkflow {
    config: EncryptorConfiguration,
}

impl EncryptWorkflow {
    #[must_use]
    pub fn new(config: EncryptorConfiguration) -> Self {
        Self { config }
    }

    pub fn run(&self, request: &EncryptRequest) -> CmsResult<EncryptReport> {
        let encoding = match request.encoding {
            Some(encoding) => encoding,
            None => self.config.output_encoding()?,
        };
        if !encoding.is_text() && request.output_path.is_none() {
            return Err(CmsError::InvalidInput(format!(
                "{encoding} output is binary and requires an output file"
            )));
        }

        // 1. Load certificate
        let certificate = CertificateLoader::load_from_path(&request.certificate_path)?;

        // 2. Inspect recipient
        let validator = RecipientValidator::new(
            self.config.expiry_warning_days,
            self.config.reject_expired_recipient,
        );
        let recipient = validator.validate(&certificate)?;

        // 3. Encrypt
        let envelope = CmsEncryptor::new(encoding).encrypt(&request.message, &certificate)?;

        // 4. Emit
        let outcome = match &request.output_path {
            Some(path) => {
                let bytes_written = write_output(path, envelope.as_bytes())?;
                log::info!("Wrote CMS content to {}", path.display());
                EncryptOutcome::WrittenToFile {
                    path: path.clone(),
                    bytes_written,
                }
            }
            None => EncryptOutcome::Encoded(envelope),
        };

        Ok(EncryptReport { outcome, recipient })
    }
}
