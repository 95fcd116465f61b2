use std::env;

/// OpenSSL 3.0 is the first release whose CMS layer accepts AEAD content ciphers.
const OPENSSL_3_0_0: u64 = 0x3000_0000;

fn main() {
    println!("cargo:rerun-if-env-changed=DEP_OPENSSL_VERSION_NUMBER");
    check_openssl_version();
}

fn check_openssl_version() {
    // Exported by openssl-sys to crates that depend on it directly.
    let Ok(raw) = env::var("DEP_OPENSSL_VERSION_NUMBER") else {
        println!("cargo:warning=Could not determine the linked OpenSSL version");
        println!("cargo:warning=AES-128-GCM CMS encryption requires OpenSSL 3.0 or newer");
        return;
    };

    match u64::from_str_radix(raw.trim(), 16) {
        Ok(version) if version >= OPENSSL_3_0_0 => {}
        Ok(version) => {
            println!(
                "cargo:warning=Linked OpenSSL version 0x{version:x} predates 3.0; \
                 CMS encryption with AES-128-GCM will fail at runtime"
            );
            print_install_hint();
        }
        Err(_) => {
            println!("cargo:warning=Unrecognised OpenSSL version number: {raw}");
        }
    }
}

fn print_install_hint() {
    if cfg!(target_os = "windows") {
        println!("cargo:warning=Install OpenSSL 3 with: vcpkg install openssl:x64-windows");
        println!("cargo:warning=Then set VCPKG_ROOT or OPENSSL_DIR before building");
    } else if cfg!(target_os = "macos") {
        println!("cargo:warning=Install OpenSSL 3 with: brew install openssl@3");
        println!("cargo:warning=Then export OPENSSL_DIR=$(brew --prefix openssl@3)");
    } else {
        println!("cargo:warning=Install the OpenSSL 3 development package (libssl-dev / openssl-devel)");
    }
}
