//! Recipient certificate domain type.
//!
//! Holds the DER bytes of an X.509 certificate alongside its parsed form.
//! Loaded once per run and never mutated.

use crate::infra::error::{CmsError, CmsResult};
use der::asn1::ObjectIdentifier;
use der::Decode;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use x509_cert::Certificate;

/// X.509 certificate of the party a message is encrypted for.
#[derive(Clone)]
pub struct RecipientCertificate {
    der: Box<[u8]>,
    parsed: Certificate,
}

impl RecipientCertificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: Vec<u8>) -> CmsResult<Self> {
        let parsed = Certificate::from_der(&der)
            .map_err(|e| CmsError::ParseError(format!("Invalid X.509 certificate: {e}")))?;
        Ok(Self {
            der: der.into_boxed_slice(),
            parsed,
        })
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.parsed
    }

    /// Subject distinguished name in RFC 4514 form.
    #[must_use]
    pub fn subject(&self) -> String {
        self.parsed.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name in RFC 4514 form.
    #[must_use]
    pub fn issuer(&self) -> String {
        self.parsed.tbs_certificate.issuer.to_string()
    }

    #[must_use]
    pub fn serial_hex(&self) -> String {
        hex::encode(self.parsed.tbs_certificate.serial_number.as_bytes())
    }

    #[must_use]
    pub fn not_before(&self) -> SystemTime {
        UNIX_EPOCH + self.parsed.tbs_certificate.validity.not_before.to_unix_duration()
    }

    #[must_use]
    pub fn not_after(&self) -> SystemTime {
        UNIX_EPOCH + self.parsed.tbs_certificate.validity.not_after.to_unix_duration()
    }

    /// Seconds from `now` until `notAfter`; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: SystemTime) -> i64 {
        signed_seconds_between(now, self.not_after())
    }

    /// Whether `now` falls inside `[notBefore, notAfter]`.
    #[must_use]
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        self.not_before() <= now && now <= self.not_after()
    }

    #[must_use]
    pub fn public_key_algorithm(&self) -> ObjectIdentifier {
        self.parsed
            .tbs_certificate
            .subject_public_key_info
            .algorithm
            .oid
    }
}

fn signed_seconds_between(from: SystemTime, to: SystemTime) -> i64 {
    match to.duration_since(from) {
        Ok(ahead) => clamp_secs(ahead),
        Err(behind) => -clamp_secs(behind.duration()),
    }
}

fn clamp_secs(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

impl fmt::Debug for RecipientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RecipientCertificate(subject={}, len={})",
            self.subject(),
            self.der.len()
        )
    }
}
