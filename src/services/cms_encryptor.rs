//! CMS enveloped-data encryption service.
//!
//! Drives the native envelope through its four steps and maps each step's
//! failure onto its own error variant:
//!
//! | step | failure |
//! |------|---------|
//! | partial `CMS_encrypt` with AES-128-GCM | [`CmsError::CryptoInitError`] |
//! | DER → native certificate | [`CmsError::CertificateLoadError`] |
//! | attach recipient | [`CmsError::RecipientError`] |
//! | `CMS_final` | [`CmsError::FinalizationError`] |
//! | PEM / BER serialization | [`CmsError::EncodingError`] |

use crate::adapters::openssl_cms::PartialEnvelope;
use crate::domain::certificate::RecipientCertificate;
use crate::domain::envelope::{EncryptedEnvelope, OutputEncoding};
use crate::infra::error::{CmsError, CmsResult};
use openssl::symm::Cipher;
use openssl::x509::X509;

/// Encrypts messages for a single recipient using AES-128-GCM.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmsEncryptor {
    encoding: OutputEncoding,
}

impl CmsEncryptor {
    #[must_use]
    pub fn new(encoding: OutputEncoding) -> Self {
        Self { encoding }
    }

    #[must_use]
    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }

    /// Encrypt `data` for `recipient`.
    ///
    /// An empty message is rejected before any native structure is created.
    pub fn encrypt(
        &self,
        data: &[u8],
        recipient: &RecipientCertificate,
    ) -> CmsResult<EncryptedEnvelope> {
        if data.is_empty() {
            return Err(CmsError::InvalidInput(
                "message to encrypt must not be empty".to_string(),
            ));
        }

        log::debug!(
            "Encrypting {} bytes for {} (AES-128-GCM, {})",
            data.len(),
            recipient.subject(),
            self.encoding
        );

        let envelope = PartialEnvelope::new(Cipher::aes_128_gcm())
            .map_err(|e| CmsError::CryptoInitError(e.to_string()))?;

        let native_cert = X509::from_der(recipient.as_der()).map_err(|e| {
            CmsError::CertificateLoadError(format!("error parsing DER certificate: {e}"))
        })?;

        let envelope = envelope
            .add_recipient(&native_cert)
            .map_err(|e| CmsError::RecipientError(e.to_string()))?;

        let finalized = envelope
            .finalize(data)
            .map_err(|e| CmsError::FinalizationError(e.to_string()))?;

        let bytes = match self.encoding {
            OutputEncoding::Pem => finalized.to_pem(),
            OutputEncoding::Der => finalized.to_ber(),
        }
        .map_err(|e| CmsError::EncodingError(e.to_string()))?;

        log::info!("Produced {} byte CMS envelope", bytes.len());
        Ok(EncryptedEnvelope::new(bytes, self.encoding))
    }
}
