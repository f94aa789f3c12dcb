//! Reading raw input files, optionally gzip-compressed.

use crate::error::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read a whole file into memory. Paths ending in `.gz` are decompressed.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut file = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(file).read_to_end(&mut buf)?;
    } else {
        file.read_to_end(&mut buf)?;
    }
    log::debug!("source: read {} bytes from {}", buf.len(), path.display());
    Ok(buf)
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
