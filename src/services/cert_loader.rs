//! Certificate loading service.
//!
//! Reads a PEM file, takes its first encapsulated block, requires the
//! `CERTIFICATE` label and parses the DER payload.

use crate::domain::certificate::RecipientCertificate;
use crate::domain::constants::CERTIFICATE_PEM_LABEL;
use crate::infra::error::{CmsError, CmsResult};
use std::path::Path;

pub struct CertificateLoader;

impl CertificateLoader {
    /// Load a recipient certificate from a PEM file on disk.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> CmsResult<RecipientCertificate> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| {
            CmsError::IoError(format!(
                "Failed to read certificate {}: {e}",
                path.display()
            ))
        })?;

        let certificate = Self::load_from_pem(&pem)?;
        log::info!("Loaded recipient certificate: {}", certificate.subject());
        log::debug!(
            "Certificate serial {} issued by {}",
            certificate.serial_hex(),
            certificate.issuer()
        );
        Ok(certificate)
    }

    /// Decode the first PEM block of `input` as a certificate.
    ///
    /// Text before the block and any blocks after it are ignored. Base64
    /// line width and trailing whitespace are not checked.
    pub fn load_from_pem(input: &[u8]) -> CmsResult<RecipientCertificate> {
        let block = pem::parse(input).map_err(|e| match e {
            pem::PemError::MalformedFraming | pem::PemError::MissingBeginTag => {
                CmsError::FormatError("no PEM block containing a certificate found".to_string())
            }
            other => CmsError::FormatError(format!("failed to decode PEM block: {other}")),
        })?;

        if block.tag() != CERTIFICATE_PEM_LABEL {
            return Err(CmsError::FormatError(format!(
                "expected PEM block labeled {CERTIFICATE_PEM_LABEL}, found {}",
                block.tag()
            )));
        }

        RecipientCertificate::from_der(block.into_contents())
    }
}
