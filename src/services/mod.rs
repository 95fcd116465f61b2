//! Service layer module root.
//! Contains the certificate loader, recipient checks and the CMS encryptor.

pub mod cert_loader;
pub mod cms_encryptor;
pub mod recipient_validator;

pub use cert_loader::CertificateLoader;
pub use cms_encryptor::CmsEncryptor;
pub use recipient_validator::{KeyDelivery, RecipientAnalysis, RecipientValidator};
