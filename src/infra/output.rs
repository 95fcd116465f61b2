//! Output file writing.

use crate::infra::error::{CmsError, CmsResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Permission bits for newly created output files on Unix.
#[cfg(unix)]
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Write `bytes` to `path`, creating the file or truncating an existing one.
///
/// Returns the number of bytes written.
pub fn write_output<P: AsRef<Path>>(path: P, bytes: &[u8]) -> CmsResult<usize> {
    let path = path.as_ref();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OUTPUT_FILE_MODE);
    }

    let mut file = options.open(path).map_err(|e| {
        CmsError::IoError(format!(
            "Failed to open output file {}: {e}",
            path.display()
        ))
    })?;

    file.write_all(bytes).map_err(|e| {
        CmsError::IoError(format!(
            "Failed to write output file {}: {e}",
            path.display()
        ))
    })?;
    file.flush()?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}
