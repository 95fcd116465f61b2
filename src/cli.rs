//! Command-line definition.
//!
//! Flags are spelled with a single dash (`-cert`, `-message`, `-out`), the
//! way OpenSSL-style tools take them. clap only understands `--long`, so
//! [`normalize_legacy_flags`] rewrites the single-dash spellings before
//! parsing; flag values are passed through untouched.

use crate::domain::envelope::OutputEncoding;
use crate::pipelines::EncryptRequest;
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Long flags accepted with a single dash, and whether each takes a value.
const LEGACY_FLAGS: &[(&str, bool)] = &[
    ("cert", true),
    ("message", true),
    ("out", true),
    ("format", true),
    ("config", true),
    ("verbose", false),
    ("help", false),
    ("version", false),
];

#[derive(Parser, Debug)]
#[command(name = "cms-encrypt")]
#[command(about = "Encrypt a message for a certificate holder as CMS enveloped data")]
#[command(long_about = "
cms-encrypt - CMS (PKCS#7) enveloped-data encryption with AES-128-GCM

The message is encrypted with a fresh AES-128-GCM key and the key is wrapped
for the public key in the given certificate. Output is PEM (BEGIN CMS) unless
-format der is requested.

EXAMPLES:
    # Print the envelope
    cms-encrypt -cert recipient.pem -message \"hello\"

    # Write the envelope to a file
    cms-encrypt -cert recipient.pem -message \"hello\" -out hello.cms.pem

    # Decrypt with OpenSSL
    openssl cms -decrypt -inform PEM -in hello.cms.pem -inkey recipient.key

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
pub struct Cli {
    /// PEM-encoded X.509 certificate of the recipient
    #[arg(long, value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// Plaintext message to encrypt, passed through byte for byte
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub message: Option<OsString>,

    /// Output file (defaults to printing on stdout)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Output encoding (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Pem,
    Der,
}

impl From<FormatArg> for OutputEncoding {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pem => OutputEncoding::Pem,
            FormatArg::Der => OutputEncoding::Der,
        }
    }
}

/// A required flag that was absent or empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissingArgument {
    #[error("missing required argument: -cert")]
    Cert,
    #[error("missing required argument: -message")]
    Message,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags.
    #[must_use]
    pub fn parse_with_legacy_flags() -> Self {
        Self::parse_from(normalize_legacy_flags(std::env::args_os()))
    }

    /// Turn parsed flags into a request; empty values count as missing.
    pub fn to_request(&self) -> Result<EncryptRequest, MissingArgument> {
        let certificate_path = self
            .cert
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(MissingArgument::Cert)?;
        let message = self
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .ok_or(MissingArgument::Message)?;

        Ok(EncryptRequest {
            certificate_path,
            message: os_string_into_bytes(message),
            output_path: self.out.clone().filter(|p| !p.as_os_str().is_empty()),
            encoding: self.format.map(Into::into),
        })
    }
}

/// Rewrite `-cert`, `-message=...` and friends to their `--` form.
///
/// The first item is the program name and is kept as is. Values following a
/// value-taking flag are never rewritten, and everything after `--` is left alone.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = iter.next().into_iter().collect();
    let mut expecting_value = false;

    while let Some(arg) = iter.next() {
        if expecting_value {
            normalized.push(arg);
            expecting_value = false;
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if text == "--" {
            normalized.push(arg);
            normalized.extend(iter.by_ref());
            break;
        }

        if let Some(rest) = text.strip_prefix("--") {
            let (name, inline_value) = split_flag(rest);
            expecting_value = !inline_value && takes_value(name);
            normalized.push(arg);
            continue;
        }

        if let Some(rest) = text.strip_prefix('-') {
            let (name, inline_value) = split_flag(rest);
            if is_legacy_flag(name) {
                expecting_value = !inline_value && takes_value(name);
                normalized.push(OsString::from(format!("-{text}")));
                continue;
            }
        }

        normalized.push(arg);
    }

    normalized
}

#[cfg(unix)]
fn os_string_into_bytes(value: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    value.into_vec()
}

// Windows arguments are UTF-16; unpaired surrogates are replaced.
#[cfg(not(unix))]
fn os_string_into_bytes(value: OsString) -> Vec<u8> {
    value.to_string_lossy().into_owned().into_bytes()
}

fn split_flag(flag: &str) -> (&str, bool) {
    match flag.split_once('=') {
        Some((name, _)) => (name, true),
        None => (flag, false),
    }
}

fn is_legacy_flag(name: &str) -> bool {
    LEGACY_FLAGS.iter().any(|(flag, _)| *flag == name)
}

fn takes_value(name: &str) -> bool {
    LEGACY_FLAGS
        .iter()
        .any(|(flag, value)| *flag == name && *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(args: &[&str]) -> Vec<String> {
        normalize_legacy_flags(args.iter().copied())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn rewrites_single_dash_flags() {
        assert_eq!(
            normalize(&["cms-encrypt", "-cert", "c.pem", "-message", "hi", "-out", "o.pem"]),
            vec!["cms-encrypt", "--cert", "c.pem", "--message", "hi", "--out", "o.pem"]
        );
    }

    #[test]
    fn keeps_double_dash_and_short_flags() {
        assert_eq!(
            normalize(&["cms-encrypt", "--cert", "c.pem", "-v", "--message=hi"]),
            vec!["cms-encrypt", "--cert", "c.pem", "-v", "--message=hi"]
        );
    }

    #[test]
    fn rewrites_inline_values() {
        assert_eq!(
            normalize(&["cms-encrypt", "-cert=c.pem", "-format=der"]),
            vec!["cms-encrypt", "--cert=c.pem", "--format=der"]
        );
    }

    #[test]
    fn never_rewrites_flag_values() {
        assert_eq!(
            normalize(&["cms-encrypt", "-message", "-out", "-cert", "c.pem"]),
            vec!["cms-encrypt", "--message", "-out", "--cert", "c.pem"]
        );
        assert_eq!(
            normalize(&["cms-encrypt", "--message", "-cert"]),
            vec!["cms-encrypt", "--message", "-cert"]
        );
    }

    #[test]
    fn stops_after_separator() {
        assert_eq!(
            normalize(&["cms-encrypt", "--", "-cert"]),
            vec!["cms-encrypt", "--", "-cert"]
        );
    }

    #[test]
    fn parses_legacy_command_line() {
        let cli = Cli::parse_from(normalize_legacy_flags([
            "cms-encrypt",
            "-cert",
            "recipient.pem",
            "-message",
            "secret",
            "-format",
            "der",
            "-out",
            "msg.der",
        ]));
        let request = cli.to_request().unwrap();
        assert_eq!(request.certificate_path, PathBuf::from("recipient.pem"));
        assert_eq!(request.message, b"secret");
        assert_eq!(request.output_path, Some(PathBuf::from("msg.der")));
        assert_eq!(request.encoding, Some(OutputEncoding::Der));
    }

    #[test]
    fn missing_arguments_reported_in_order() {
        let cli = Cli::parse_from(["cms-encrypt"]);
        assert_eq!(cli.to_request().unwrap_err(), MissingArgument::Cert);

        let cli = Cli::parse_from(["cms-encrypt", "--cert", "c.pem"]);
        assert_eq!(cli.to_request().unwrap_err(), MissingArgument::Message);

        let cli = Cli::parse_from(["cms-encrypt", "--cert", "c.pem", "--message", ""]);
        assert_eq!(cli.to_request().unwrap_err(), MissingArgument::Message);
        assert_eq!(
            MissingArgument::Message.to_string(),
            "missing required argument: -message"
        );
    }

    #[cfg(unix)]
    #[test]
    fn message_bytes_need_not_be_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let raw = vec![b'h', 0xe9, 0xff, b'!'];
        let cli = Cli::parse_from([
            OsString::from("cms-encrypt"),
            OsString::from("--cert"),
            OsString::from("c.pem"),
            OsString::from("--message"),
            OsString::from_vec(raw.clone()),
        ]);
        assert_eq!(cli.to_request().unwrap().message, raw);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
