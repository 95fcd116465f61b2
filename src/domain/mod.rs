pub mod certificate;
pub mod constants;
pub mod envelope;
