//! CMS Encrypt Library
//!
//! Encrypts a message for the holder of an X.509 certificate, producing CMS
//! enveloped data with AES-128-GCM content encryption and a single
//! key-transport recipient. The CMS work is done by OpenSSL; this crate loads
//! the certificate, drives OpenSSL's calls in the order it requires and
//! reports each stage's failure distinctly.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

use std::path::Path;

pub use domain::certificate::RecipientCertificate;
pub use domain::envelope::{EncryptedEnvelope, OutputEncoding};
pub use infra::config;
pub use infra::error::{self, CmsError, CmsResult};
pub use pipelines::{EncryptOutcome, EncryptReport, EncryptRequest, EncryptWorkflow};
pub use services::{CertificateLoader, CmsEncryptor, RecipientValidator};

/// Load the first PEM `CERTIFICATE` block of the file at `path`.
pub fn load_certificate<P: AsRef<Path>>(path: P) -> CmsResult<RecipientCertificate> {
    CertificateLoader::load_from_path(path)
}

/// Encrypt `data` for `recipient` and return PEM-wrapped CMS.
pub fn encrypt_cms(data: &[u8], recipient: &RecipientCertificate) -> CmsResult<Vec<u8>> {
    CmsEncryptor::new(OutputEncoding::Pem)
        .encrypt(data, recipient)
        .map(EncryptedEnvelope::into_bytes)
}
