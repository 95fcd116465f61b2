//! Throw-away recipient certificates.
//!
//! Every fixture lives in its own `TempDir`, which is removed when the
//! fixture is dropped.

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::KeyUsage;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

const DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Rsa,
    EcP256,
    /// Signature-only key type; OpenSSL cannot wrap a content key for it
    Ed25519,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// keyEncipherment (RSA) / keyAgreement (EC)
    Encryption,
    /// digitalSignature only
    SigningOnly,
    /// no KeyUsage extension at all
    Absent,
}

#[derive(Debug, Clone, Copy)]
pub struct CertOptions {
    pub key: KeyKind,
    pub usage: Usage,
    /// Offset of notBefore from now, in days
    pub not_before_days: i64,
    /// Offset of notAfter from now, in days
    pub not_after_days: i64,
}

impl Default for CertOptions {
    fn default() -> Self {
        Self {
            key: KeyKind::Rsa,
            usage: Usage::Encryption,
            not_before_days: -1,
            not_after_days: 365,
        }
    }
}

pub struct TestRecipient {
    pub dir: TempDir,
    pub cert: X509,
    pub key: PKey<Private>,
    pub cert_path: PathBuf,
}

impl TestRecipient {
    #[must_use]
    pub fn cert_pem(&self) -> Vec<u8> {
        self.cert.to_pem().expect("Should encode certificate PEM")
    }

    /// Path of a file inside this fixture's directory.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` into the fixture directory and return its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Should write fixture file");
        path
    }
}

/// RSA-2048 recipient valid from yesterday for a year, with keyEncipherment.
#[must_use]
pub fn rsa_recipient() -> TestRecipient {
    recipient_with(CertOptions::default())
}

#[must_use]
pub fn recipient_with(options: CertOptions) -> TestRecipient {
    let key = match options.key {
        KeyKind::Rsa => PKey::from_rsa(Rsa::generate(2048).expect("Should generate RSA key"))
            .expect("Should create PKey"),
        KeyKind::EcP256 => {
            let group =
                EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("Should load P-256");
            PKey::from_ec_key(EcKey::generate(&group).expect("Should generate EC key"))
                .expect("Should create PKey")
        }
        KeyKind::Ed25519 => PKey::generate_ed25519().expect("Should generate Ed25519 key"),
    };

    let cert = build_certificate(&key, options);
    let dir = TempDir::new().expect("Should create temp dir");
    let cert_path = dir.path().join("recipient.pem");
    std::fs::write(&cert_path, cert.to_pem().expect("Should encode PEM"))
        .expect("Should write certificate");

    TestRecipient {
        dir,
        cert,
        key,
        cert_path,
    }
}

fn build_certificate(key: &PKey<Private>, options: CertOptions) -> X509 {
    let mut name = X509NameBuilder::new().expect("Should create name builder");
    name.append_entry_by_text("CN", "Test Recipient")
        .expect("Should add CN");
    name.append_entry_by_text("O", "CMS Encrypt Tests")
        .expect("Should add O");
    let name = name.build();

    let mut builder = X509Builder::new().expect("Should create X509 builder");
    builder.set_version(2).expect("Should set version");
    let serial = BigNum::from_u32(0x1234)
        .expect("Should create serial")
        .to_asn1_integer()
        .expect("Should convert serial");
    builder
        .set_serial_number(&serial)
        .expect("Should set serial");
    builder.set_subject_name(&name).expect("Should set subject");
    builder.set_issuer_name(&name).expect("Should set issuer");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_secs() as i64;
    let not_before = Asn1Time::from_unix((now + options.not_before_days * DAY) as _)
        .expect("Should create not_before");
    let not_after = Asn1Time::from_unix((now + options.not_after_days * DAY) as _)
        .expect("Should create not_after");
    builder
        .set_not_before(&not_before)
        .expect("Should set not_before");
    builder
        .set_not_after(&not_after)
        .expect("Should set not_after");
    builder.set_pubkey(key).expect("Should set pubkey");

    let usage = match (options.usage, options.key) {
        (Usage::Absent, _) => None,
        (Usage::SigningOnly, _) => Some(KeyUsage::new().critical().digital_signature().build()),
        (Usage::Encryption, KeyKind::Rsa | KeyKind::Ed25519) => {
            Some(KeyUsage::new().critical().key_encipherment().build())
        }
        (Usage::Encryption, KeyKind::EcP256) => {
            Some(KeyUsage::new().critical().key_agreement().build())
        }
    };
    if let Some(ext) = usage {
        builder
            .append_extension(ext.expect("Should build key usage"))
            .expect("Should add key usage");
    }

    // Ed25519 signs the message directly and takes no digest.
    let digest = match options.key {
        KeyKind::Ed25519 => MessageDigest::null(),
        KeyKind::Rsa | KeyKind::EcP256 => MessageDigest::sha256(),
    };
    builder.sign(key, digest).expect("Should sign");
    builder.build()
}
