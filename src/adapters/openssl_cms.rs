//! Scoped handles over OpenSSL's CMS enveloped-data API.
//!
//! OpenSSL requires a fixed call order when building an envelope in partial
//! mode:
//!
//! 1. `CMS_encrypt` with no recipients and no content (`CMS_PARTIAL`)
//! 2. `CMS_add1_recipient_cert`
//! 3. `CMS_final` with the plaintext, exactly once, never with streaming
//! 4. `PEM_write_bio_CMS_stream` / `i2d_CMS_bio_stream`
//!
//! Each step here consumes the previous state and returns the next, so the
//! order is checked at compile time. Every native handle is owned by a value
//! whose `Drop` releases it, on success and on every early return.
//!
//! Failures drain OpenSSL's per-thread error queue into a [`NativeError`] at
//! the call that failed; nothing reads the queue later.

use foreign_types::{foreign_type, ForeignType, ForeignTypeRef};
use openssl::error::ErrorStack;
use openssl::symm::Cipher;
use openssl::x509::X509Ref;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr;

/// Entry points `openssl-sys` does not bind.
#[allow(non_camel_case_types)]
mod ffi {
    use openssl_sys::{CMS_ContentInfo, BIO, X509};
    use std::os::raw::{c_int, c_uint};

    pub enum CMS_RecipientInfo {}

    extern "C" {
        pub fn CMS_add1_recipient_cert(
            cms: *mut CMS_ContentInfo,
            recip: *mut X509,
            flags: c_uint,
        ) -> *mut CMS_RecipientInfo;

        pub fn CMS_final(
            cms: *mut CMS_ContentInfo,
            data: *mut BIO,
            dcont: *mut BIO,
            flags: c_uint,
        ) -> c_int;

        pub fn PEM_write_bio_CMS_stream(
            out: *mut BIO,
            cms: *mut CMS_ContentInfo,
            input: *mut BIO,
            flags: c_int,
        ) -> c_int;

        pub fn i2d_CMS_bio_stream(
            out: *mut BIO,
            cms: *mut CMS_ContentInfo,
            input: *mut BIO,
            flags: c_int,
        ) -> c_int;
    }
}

/// A failed native call and the OpenSSL error text it left behind.
#[derive(Debug, Clone)]
pub struct NativeError {
    call: &'static str,
    detail: String,
}

impl NativeError {
    fn from_queue(call: &'static str) -> Self {
        Self::from_stack(call, &ErrorStack::get())
    }

    fn from_stack(call: &'static str, stack: &ErrorStack) -> Self {
        let detail = if stack.errors().is_empty() {
            "no error reported by OpenSSL".to_string()
        } else {
            stack.to_string()
        };
        Self { call, detail }
    }

    fn with_detail(call: &'static str, detail: impl Into<String>) -> Self {
        Self {
            call,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.call, self.detail)
    }
}

impl std::error::Error for NativeError {}

pub type NativeResult<T> = Result<T, NativeError>;

foreign_type! {
    type CType = openssl_sys::CMS_ContentInfo;
    fn drop = openssl_sys::CMS_ContentInfo_free;

    /// Owned `CMS_ContentInfo`
    pub struct CmsHandle;
    /// Borrowed `CMS_ContentInfo`
    pub struct CmsHandleRef;
}

foreign_type! {
    type CType = openssl_sys::BIO;
    fn drop = openssl_sys::BIO_free_all;

    /// Owned growable memory BIO
    pub struct MemBio;
    /// Borrowed memory BIO
    pub struct MemBioRef;
}

impl MemBio {
    fn new() -> NativeResult<Self> {
        unsafe {
            let bio = openssl_sys::BIO_new(openssl_sys::BIO_s_mem());
            if bio.is_null() {
                return Err(NativeError::from_queue("BIO_new"));
            }
            Ok(MemBio::from_ptr(bio))
        }
    }
}

impl MemBioRef {
    /// Copy of everything written to the BIO so far.
    fn to_vec(&self) -> Vec<u8> {
        unsafe {
            let mut data: *mut c_char = ptr::null_mut();
            let len = openssl_sys::BIO_ctrl(
                self.as_ptr(),
                openssl_sys::BIO_CTRL_INFO,
                0,
                &mut data as *mut *mut c_char as *mut c_void,
            );
            if len <= 0 || data.is_null() {
                return Vec::new();
            }
            std::slice::from_raw_parts(data as *const u8, len as usize).to_vec()
        }
    }
}

/// Read-only memory BIO borrowing `data` for its whole lifetime.
struct MemBioSlice<'a> {
    bio: *mut openssl_sys::BIO,
    _data: PhantomData<&'a [u8]>,
}

impl<'a> MemBioSlice<'a> {
    fn new(data: &'a [u8]) -> NativeResult<Self> {
        let len = c_int::try_from(data.len()).map_err(|_| {
            NativeError::with_detail(
                "BIO_new_mem_buf",
                format!("input of {} bytes exceeds the native size limit", data.len()),
            )
        })?;
        // A zero-length slice still has a non-null, aligned pointer; OpenSSL
        // never dereferences it when `len` is 0.
        let bio = unsafe { openssl_sys::BIO_new_mem_buf(data.as_ptr() as *const c_void, len) };
        if bio.is_null() {
            return Err(NativeError::from_queue("BIO_new_mem_buf"));
        }
        Ok(Self {
            bio,
            _data: PhantomData,
        })
    }

    fn as_ptr(&self) -> *mut openssl_sys::BIO {
        self.bio
    }
}

impl Drop for MemBioSlice<'_> {
    fn drop(&mut self) {
        unsafe {
            openssl_sys::BIO_free_all(self.bio);
        }
    }
}

/// Step 1: an enveloped-data structure with a content cipher but no
/// recipients and no content.
pub struct PartialEnvelope {
    cms: CmsHandle,
}

impl PartialEnvelope {
    /// `CMS_encrypt(NULL, NULL, cipher, CMS_PARTIAL | CMS_BINARY)`.
    pub fn new(cipher: Cipher) -> NativeResult<Self> {
        openssl_sys::init();
        // Stale entries from unrelated calls would otherwise be blamed on us.
        let _ = ErrorStack::get();

        let flags: c_uint = openssl_sys::CMS_PARTIAL | openssl_sys::CMS_BINARY;
        unsafe {
            let cms = openssl_sys::CMS_encrypt(
                ptr::null_mut(),
                ptr::null_mut(),
                cipher.as_ptr(),
                flags,
            );
            if cms.is_null() {
                return Err(NativeError::from_queue("CMS_encrypt"));
            }
            Ok(Self {
                cms: CmsHandle::from_ptr(cms),
            })
        }
    }

    /// Step 2: attach `recipient` as the sole key-transport recipient.
    ///
    /// OpenSSL takes its own reference on the certificate.
    pub fn add_recipient(self, recipient: &X509Ref) -> NativeResult<AddressedEnvelope> {
        let info =
            unsafe { ffi::CMS_add1_recipient_cert(self.cms.as_ptr(), recipient.as_ptr(), 0) };
        if info.is_null() {
            return Err(NativeError::from_queue("CMS_add1_recipient_cert"));
        }
        Ok(AddressedEnvelope { cms: self.cms })
    }
}

/// Step 2 done: exactly one recipient attached, content not yet encrypted.
pub struct AddressedEnvelope {
    cms: CmsHandle,
}

impl AddressedEnvelope {
    /// Step 3: encrypt `data` and wrap the content key for the recipient.
    ///
    /// Consumes the envelope, so finalization happens at most once.
    /// `CMS_BINARY` keeps OpenSSL from canonicalizing line endings.
    pub fn finalize(self, data: &[u8]) -> NativeResult<FinalizedEnvelope> {
        let input = MemBioSlice::new(data)?;
        let rc = unsafe {
            ffi::CMS_final(
                self.cms.as_ptr(),
                input.as_ptr(),
                ptr::null_mut(),
                openssl_sys::CMS_BINARY,
            )
        };
        if rc != 1 {
            return Err(NativeError::from_queue("CMS_final"));
        }
        Ok(FinalizedEnvelope { cms: self.cms })
    }
}

/// Step 3 done: content encrypted, ready to serialize.
pub struct FinalizedEnvelope {
    cms: CmsHandle,
}

impl FinalizedEnvelope {
    /// Step 4: PEM-wrapped BER (`-----BEGIN CMS-----`).
    pub fn to_pem(&self) -> NativeResult<Vec<u8>> {
        self.write_with("PEM_write_bio_CMS_stream", |out, cms| unsafe {
            ffi::PEM_write_bio_CMS_stream(out, cms, ptr::null_mut(), 0)
        })
    }

    /// Step 4: raw BER.
    pub fn to_ber(&self) -> NativeResult<Vec<u8>> {
        self.write_with("i2d_CMS_bio_stream", |out, cms| unsafe {
            ffi::i2d_CMS_bio_stream(out, cms, ptr::null_mut(), 0)
        })
    }

    fn write_with<F>(&self, call: &'static str, write: F) -> NativeResult<Vec<u8>>
    where
        F: FnOnce(*mut openssl_sys::BIO, *mut openssl_sys::CMS_ContentInfo) -> c_int,
    {
        let out = MemBio::new()?;
        if write(out.as_ptr(), self.cms.as_ptr()) != 1 {
            return Err(NativeError::from_queue(call));
        }
        let bytes = out.to_vec();
        if bytes.is_empty() {
            return Err(NativeError::with_detail(call, "no output data"));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::cms::CmsContentInfo;
    use openssl::hash::MessageDigest;
    use openssl::pkey::{PKey, Private};
    use openssl::rsa::Rsa;
    use openssl::x509::{X509Builder, X509NameBuilder, X509};

    fn test_recipient() -> (X509, PKey<Private>) {
        let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "Adapter Test").unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(1).unwrap())
            .unwrap();
        builder.set_pubkey(&pkey).unwrap();
        builder.sign(&pkey, MessageDigest::sha256()).unwrap();
        (builder.build(), pkey)
    }

    #[test]
    fn full_sequence_round_trips() {
        let (cert, pkey) = test_recipient();
        let plaintext = b"line one\nline two\r\n";

        let pem = PartialEnvelope::new(Cipher::aes_128_gcm())
            .unwrap()
            .add_recipient(&cert)
            .unwrap()
            .finalize(plaintext)
            .unwrap()
            .to_pem()
            .unwrap();
        assert!(pem.starts_with(b"-----BEGIN CMS-----"));

        let cms = CmsContentInfo::from_pem(&pem).unwrap();
        let decrypted = cms.decrypt(&pkey, &cert).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ber_output_is_a_sequence() {
        let (cert, _) = test_recipient();
        let ber = PartialEnvelope::new(Cipher::aes_128_gcm())
            .unwrap()
            .add_recipient(&cert)
            .unwrap()
            .finalize(b"payload")
            .unwrap()
            .to_ber()
            .unwrap();
        assert_eq!(ber[0], 0x30);
    }

    #[test]
    fn native_error_display_names_call() {
        let err = NativeError::with_detail("CMS_final", "boom");
        assert_eq!(err.to_string(), "CMS_final failed: boom");
    }

    #[test]
    fn empty_queue_has_placeholder_detail() {
        let _ = ErrorStack::get();
        let err = NativeError::from_queue("BIO_new");
        assert_eq!(err.to_string(), "BIO_new failed: no error reported by OpenSSL");
    }
}
