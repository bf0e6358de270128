//! Content-Encoding handling for upstream bodies.

use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

/// Content coding declared by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCoding {
    Identity,
    Gzip,
    Other(String),
}

impl ContentCoding {
    /// Interpret a `Content-Encoding` header value.
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return ContentCoding::Identity;
        };

        if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") {
            ContentCoding::Gzip
        } else if value.eq_ignore_ascii_case("identity") {
            ContentCoding::Identity
        } else {
            ContentCoding::Other(value.to_string())
        }
    }
}

/// Decompress a complete gzip payload, including concatenated members.
///
/// Output beyond `limit` bytes is an `InvalidData` error.
pub fn gunzip(compressed: &[u8], limit: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(compressed.len().saturating_mul(4).min(limit));
    MultiGzDecoder::new(compressed)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)?;

    if out.len() > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("decompressed body exceeds {} bytes", limit),
        ));
    }
    Ok(out)
}
