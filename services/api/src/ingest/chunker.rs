//! services/api/src/ingest/chunker.rs
//!
//! Splits extracted document text into bounded, overlapping chunks for
//! embedding.

use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

use doc_chat_core::ports::{PortError, PortResult};

/// Maximum chunk size in characters.
pub const CHUNK_SIZE: usize = 2000;
/// Overlap between consecutive chunks in characters.
pub const CHUNK_OVERLAP: usize = 300;

/// Splits text into chunks of at most `CHUNK_SIZE` characters with
/// `CHUNK_OVERLAP` characters shared between neighbors. Empty and
/// whitespace-only chunks are discarded.
pub fn split_text(text: &str) -> PortResult<Vec<String>> {
    let config = ChunkConfig::new(CHUNK_SIZE)
        .with_overlap(CHUNK_OVERLAP)
        .map_err(|e| PortError::Unexpected(format!("Invalid chunking configuration: {}", e)))?;
    let splitter = TextSplitter::new(config);

    let chunks: Vec<String> = splitter
        .chunks(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(str::to_string)
        .collect();

    debug!(
        input_len = text.len(),
        chunk_count = chunks.len(),
        "Text chunked"
    );

    Ok(chunks)
}
