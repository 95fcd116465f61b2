//! Recipient certificate validation service.
//!
//! Inspects the recipient before any key is wrapped for it. Findings are
//! warnings; only the validity window can be made fatal, by configuration.

use crate::domain::certificate::RecipientCertificate;
use crate::domain::constants::{EC_PUBLIC_KEY_OID, RSA_ENCRYPTION_OID, SECONDS_PER_DAY};
use crate::infra::error::{CmsError, CmsResult};
use der::oid::AssociatedOid;
use der::Decode;
use std::time::SystemTime;
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};

/// How the recipient's public key delivers the content-encryption key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDelivery {
    /// RSA key transport (`KeyTransRecipientInfo`)
    KeyTransport,
    /// Elliptic-curve key agreement (`KeyAgreeRecipientInfo`)
    KeyAgreement,
    /// Anything else; OpenSSL decides whether it can be used
    Unknown,
}

#[derive(Debug, Clone)]
pub struct RecipientAnalysis {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub days_until_expiry: i64,
    pub is_within_validity: bool,
    pub key_delivery: KeyDelivery,
    pub key_usage_permits_encryption: bool,
    pub warnings: Vec<String>,
}

pub struct RecipientValidator {
    expiry_warning_days: u32,
    reject_outside_validity: bool,
}

impl RecipientValidator {
    #[must_use]
    pub fn new(expiry_warning_days: u32, reject_outside_validity: bool) -> Self {
        Self {
            expiry_warning_days,
            reject_outside_validity,
        }
    }

    /// Analyze `certificate` against the current time.
    pub fn validate(&self, certificate: &RecipientCertificate) -> CmsResult<RecipientAnalysis> {
        self.validate_at(certificate, SystemTime::now())
    }

    /// Analyze `certificate` as of `now`.
    pub fn validate_at(
        &self,
        certificate: &RecipientCertificate,
        now: SystemTime,
    ) -> CmsResult<RecipientAnalysis> {
        let key_delivery = classify_key(certificate);
        let mut analysis = RecipientAnalysis {
            subject: certificate.subject(),
            issuer: certificate.issuer(),
            serial_number: certificate.serial_hex(),
            days_until_expiry: certificate.seconds_until_expiry(now) / SECONDS_PER_DAY,
            is_within_validity: certificate.is_valid_at(now),
            key_delivery,
            key_usage_permits_encryption: true,
            warnings: Vec::new(),
        };

        log::debug!("Validating recipient certificate: {}", analysis.subject);

        if !analysis.is_within_validity {
            let reason = if now < certificate.not_before() {
                "Recipient certificate is not yet valid".to_string()
            } else {
                format!(
                    "Recipient certificate expired {} days ago",
                    -analysis.days_until_expiry
                )
            };
            if self.reject_outside_validity {
                return Err(CmsError::ValidationError(reason));
            }
            analysis.warnings.push(reason);
        } else if analysis.days_until_expiry < i64::from(self.expiry_warning_days) {
            analysis.warnings.push(format!(
                "Recipient certificate expires in {} days",
                analysis.days_until_expiry
            ));
        }

        match key_delivery {
            KeyDelivery::KeyTransport => {}
            KeyDelivery::KeyAgreement => analysis
                .warnings
                .push("Recipient key is elliptic-curve; key agreement will be used".to_string()),
            KeyDelivery::Unknown => analysis.warnings.push(format!(
                "Unrecognised recipient key algorithm: {}",
                certificate.public_key_algorithm()
            )),
        }

        match key_usage(certificate) {
            Ok(Some(usage)) => {
                let (required, name) = match key_delivery {
                    KeyDelivery::KeyAgreement => (KeyUsages::KeyAgreement, "keyAgreement"),
                    _ => (KeyUsages::KeyEncipherment, "keyEncipherment"),
                };
                if !usage.0.contains(required) {
                    analysis.key_usage_permits_encryption = false;
                    analysis
                        .warnings
                        .push(format!("Key usage extension does not include {name}"));
                }
            }
            Ok(None) => {}
            Err(e) => analysis
                .warnings
                .push(format!("Could not decode key usage extension: {e}")),
        }

        for warning in &analysis.warnings {
            log::warn!("{warning}");
        }

        Ok(analysis)
    }
}

fn classify_key(certificate: &RecipientCertificate) -> KeyDelivery {
    let oid = certificate.public_key_algorithm();
    if oid == RSA_ENCRYPTION_OID {
        KeyDelivery::KeyTransport
    } else if oid == EC_PUBLIC_KEY_OID {
        KeyDelivery::KeyAgreement
    } else {
        KeyDelivery::Unknown
    }
}

fn key_usage(certificate: &RecipientCertificate) -> der::Result<Option<KeyUsage>> {
    let Some(extensions) = certificate.certificate().tbs_certificate.extensions.as_ref() else {
        return Ok(None);
    };
    extensions
        .iter()
        .find(|ext| ext.extn_id == KeyUsage::OID)
        .map(|ext| KeyUsage::from_der(ext.extn_value.as_bytes()))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_construction() {
        let validator = RecipientValidator::new(30, true);
        assert_eq!(validator.expiry_warning_days, 30);
        assert!(validator.reject_outside_validity);
    }

    // Certificate-driven cases live in tests/recipient_validation_tests.rs
}
