//! JSON response bodies with optional pooled gzip compression.
//!
//! Compressors are drawn from a [`GzipPool`] through a [`PooledEncoder`]
//! guard. The guard returns its compressor to the pool when dropped, after
//! resetting it, so a compressor is never shared between two responses and
//! never leaks on an error path.
//!
//! The pool holds raw deflate streams and frames them as gzip (RFC 1952)
//! itself: a fixed 10-byte header, the deflate data, then CRC-32 and input
//! size as little-endian `u32`s. `flate2`'s deflate writer can be reset in
//! place, which its gzip writer cannot.

use std::io::{self, Write};

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use parking_lot::Mutex;
use serde::Serialize;

/// Gzip member header: magic, CM=deflate, no flags, no mtime, XFL=0, OS=unknown.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];

/// Default number of idle compressors kept for reuse.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Errors produced while encoding a response body.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to compress response: {0}")]
    Io(#[from] io::Error),
}

struct Compressor {
    encoder: DeflateEncoder<Vec<u8>>,
    crc: Crc,
}

impl Compressor {
    fn new(level: Compression) -> Self {
        Self {
            encoder: DeflateEncoder::new(Vec::new(), level),
            crc: Crc::new(),
        }
    }

    /// Finishes the current stream, returns its deflate bytes and leaves
    /// the compressor ready for a new stream.
    fn take_stream(&mut self) -> io::Result<Vec<u8>> {
        let deflated = self.encoder.reset(Vec::new())?;
        Ok(deflated)
    }
}

/// Shared pool of reusable gzip compressors.
pub struct GzipPool {
    idle: Mutex<Vec<Compressor>>,
    level: Compression,
    max_idle: usize,
}

impl Default for GzipPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl GzipPool {
    /// Creates a pool using the fast compression level.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            level: Compression::fast(),
            max_idle,
        }
    }

    /// Checks out a compressor, creating one when the pool is empty.
    pub fn acquire(&self) -> PooledEncoder<'_> {
        let compressor = self
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| Compressor::new(self.level));
        PooledEncoder {
            pool: self,
            compressor: Some(compressor),
            dirty: false,
        }
    }

    /// Number of compressors currently waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, compressor: Compressor) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(compressor);
        }
    }
}

/// Exclusive checkout of one pooled compressor.
///
/// Write the uncompressed body into it, then call [`finish`](Self::finish)
/// to obtain the gzip bytes.
pub struct PooledEncoder<'a> {
    pool: &'a GzipPool,
    compressor: Option<Compressor>,
    dirty: bool,
}

impl PooledEncoder<'_> {
    fn compressor(&mut self) -> io::Result<&mut Compressor> {
        self.compressor
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "compressor already released"))
    }

    /// Completes the gzip member and returns it.
    pub fn finish(mut self) -> io::Result<Vec<u8>> {
        let compressor = self.compressor()?;
        let deflated = compressor.take_stream()?;
        let crc = compressor.crc.sum();
        let size = compressor.crc.amount();
        compressor.crc.reset();
        self.dirty = false;

        let mut out = Vec::with_capacity(GZIP_HEADER.len() + deflated.len() + 8);
        out.extend_from_slice(&GZIP_HEADER);
        out.extend_from_slice(&deflated);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        Ok(out)
    }
}

impl Write for PooledEncoder<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.dirty = true;
        let compressor = self.compressor()?;
        let written = compressor.encoder.write(buf)?;
        compressor.crc.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.compressor()?.encoder.flush()
    }
}

impl Drop for PooledEncoder<'_> {
    fn drop(&mut self) {
        let Some(mut compressor) = self.compressor.take() else {
            return;
        };
        if self.dirty {
            // Abandoned mid-stream: discard the partial output.
            if compressor.take_stream().is_err() {
                return;
            }
            compressor.crc.reset();
        }
        self.pool.release(compressor);
    }
}

/// An encoded JSON body, compressed or not.
#[derive(Debug)]
pub enum EncodedBody {
    Plain(Vec<u8>),
    Gzip(Vec<u8>),
}

/// Serializes `value` as JSON, streaming it through a pooled gzip
/// compressor when `gzip` is set.
pub fn encode_json<T: Serialize>(
    value: &T,
    gzip: bool,
    pool: &GzipPool,
) -> Result<EncodedBody, EncodeError> {
    if !gzip {
        return Ok(EncodedBody::Plain(serde_json::to_vec(value)?));
    }

    let mut encoder = pool.acquire();
    serde_json::to_writer(&mut encoder, value)?;
    Ok(EncodedBody::Gzip(encoder.finish()?))
}

impl IntoResponse for EncodedBody {
    fn into_response(self) -> Response {
        let json = HeaderValue::from_static("application/json");
        match self {
            EncodedBody::Plain(bytes) => ([(header::CONTENT_TYPE, json)], bytes).into_response(),
            EncodedBody::Gzip(bytes) => (
                [
                    (header::CONTENT_TYPE, json),
                    (header::CONTENT_ENCODING, HeaderValue::from_static("gzip")),
                    (header::VARY, HeaderValue::from_static("accept-encoding")),
                ],
                bytes,
            )
                .into_response(),
        }
    }
}

/// Whether the request's `Accept-Encoding` allows a gzip body.
///
/// `gzip`, `x-gzip` and `*` are accepted unless given `q=0`.
pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|coding| {
            let mut parts = coding.split(';');
            let name = parts.next().unwrap_or_default().trim();
            let gzip_like = name.eq_ignore_ascii_case("gzip")
                || name.eq_ignore_ascii_case("x-gzip")
                || name == "*";
            gzip_like && !parts.any(is_zero_quality)
        })
}

fn is_zero_quality(param: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("q")
        && value
            .trim()
            .parse::<f32>()
            .map(|q| q <= 0.0)
            .unwrap_or(false)
}
