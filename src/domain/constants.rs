//! Domain constants for PEM labels, algorithm identifiers and defaults.
//! Keep this intentionally small; only broadly reused literals should live here.

use der::asn1::ObjectIdentifier;

// === PEM ===

/// Label of the PEM block holding an X.509 certificate
pub const CERTIFICATE_PEM_LABEL: &str = "CERTIFICATE";

/// First line of PEM-encoded CMS output
pub const CMS_PEM_HEADER: &str = "-----BEGIN CMS-----";

// === Algorithm identifiers ===

/// rsaEncryption (PKCS #1)
pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// id-ecPublicKey (RFC 5480)
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// id-aes128-GCM, the content-encryption algorithm of every envelope we produce
pub const AES_128_GCM_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.6");

// === Defaults ===

/// Days before recipient certificate expiry at which a warning is emitted
pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 30;

/// Seconds per day, for validity-window arithmetic
pub const SECONDS_PER_DAY: i64 = 86_400;
