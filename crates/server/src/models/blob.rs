//! Blob domain types.
//!
//! Blobs are stored chunked so arbitrarily large uploads never require
//! a single contiguous database value, and downloads can be streamed
//! chunk by chunk.

use bytes::Bytes;

use artisan_collective_core::BlobId;

/// Chunk size for stored blobs (255 KiB).
pub const CHUNK_SIZE: usize = 255 * 1024;

/// A stored binary object with its ordered chunks.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Unique blob ID.
    pub id: BlobId,
    /// Filename recorded at upload.
    pub filename: String,
    /// Content type recorded at upload.
    pub content_type: String,
    /// Total length in bytes.
    pub length: u64,
    /// Ordered content chunks; concatenated they form the full object.
    pub chunks: Vec<Bytes>,
}

/// Data required to store a blob.
#[derive(Debug, Clone)]
pub struct NewBlob {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Split blob content into fixed-size chunks.
///
/// Empty input yields no chunks; the blob row still records length 0.
#[must_use]
pub fn chunk_bytes(data: &Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(data.len().div_ceil(CHUNK_SIZE));
    let mut offset = 0;
    while offset < data.len() {
        let end = usize::min(offset + CHUNK_SIZE, data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_empty() {
        assert!(chunk_bytes(&Bytes::new()).is_empty());
    }

    #[test]
    fn test_chunking_small_payload_is_single_chunk() {
        let data = Bytes::from_static(b"hello");
        let chunks = chunk_bytes(&data);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks.first(), Some(&data));
    }

    #[test]
    fn test_chunking_splits_and_reassembles() {
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 10]);
        let chunks = chunk_bytes(&data);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), data.len());

        let mut reassembled = Vec::new();
        for chunk in &chunks {
            reassembled.extend_from_slice(chunk);
        }
        assert_eq!(reassembled, data.to_vec());
    }
}
