//! Adapters over native libraries.

pub mod openssl_cms;

pub use openssl_cms::{
    AddressedEnvelope, FinalizedEnvelope, NativeError, NativeResult, PartialEnvelope,
};
