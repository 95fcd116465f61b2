//! Workflow pipelines orchestrating stateless services.

pub mod encrypt;

pub use encrypt::{EncryptOutcome, EncryptReport, EncryptRequest, EncryptWorkflow};
