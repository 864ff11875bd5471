//! Response body buffering and decoding.
//!
//! Only HTML responses come through here. Chunks are kept in arrival order and
//! joined once the stream ends; nothing is matched against a partial document.

use std::io::Read;

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use flate2::read::MultiGzDecoder;
use futures_util::StreamExt;
use thiserror::Error;

/// Errors raised while assembling or decoding a body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read upstream body: {0}")]
    Stream(#[from] axum::Error),

    #[error("failed to decompress gzip body: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Collects body chunks until end-of-stream.
#[derive(Debug, Default)]
pub struct BodyAccumulator {
    chunks: Vec<Bytes>,
    len: usize,
}

impl BodyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Bytes) {
        self.len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Total bytes received so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Join every chunk into one buffer.
    pub fn finish(self) -> Bytes {
        match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.into_iter().next().unwrap_or_default(),
            _ => {
                let mut buf = BytesMut::with_capacity(self.len);
                for chunk in self.chunks {
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        }
    }
}

/// Drain a body stream to completion.
pub async fn collect_body(body: Body) -> Result<Bytes, DecodeError> {
    let mut stream = body.into_data_stream();
    let mut accumulator = BodyAccumulator::new();
    while let Some(chunk) = stream.next().await {
        accumulator.push(chunk?);
    }
    Ok(accumulator.finish())
}

/// Turn the raw body into text, gunzipping first when `compressed`.
///
/// Every gzip member is decoded, not just the first.
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_text(data: &[u8], compressed: bool) -> Result<String, DecodeError> {
    if compressed {
        let mut decoded = Vec::new();
        MultiGzDecoder::new(data).read_to_end(&mut decoded)?;
        Ok(String::from_utf8_lossy(&decoded).into_owned())
    } else {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}
