//! Block encoding: file content → ordered base64 `Block` payloads.
//!
//! The console stores a Lua file as a sequence of base64 blocks that it
//! decodes and concatenates in document order. Blocks are cut on byte
//! boundaries by default; [`ChunkUnit::Chars`] cuts on character boundaries
//! instead, so no block ever holds half of a multi-byte character.

use crate::config::ChunkUnit;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io;
use tracing::debug;

/// Split `content` into consecutive slices of at most `block_size` units.
///
/// The last slice may be shorter; empty content yields no slices. In
/// [`ChunkUnit::Chars`] mode the content must be valid UTF-8.
pub fn split_blocks(
    content: &[u8],
    unit: ChunkUnit,
    block_size: usize,
) -> io::Result<Vec<&[u8]>> {
    let block_size = block_size.max(1);
    match unit {
        ChunkUnit::Bytes => Ok(content.chunks(block_size).collect()),
        ChunkUnit::Chars => {
            let text = std::str::from_utf8(content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            Ok(split_chars(text, block_size)
                .into_iter()
                .map(str::as_bytes)
                .collect())
        }
    }
}

/// Cut `text` every `block_size` characters.
fn split_chars(text: &str, block_size: usize) -> Vec<&str> {
    let mut blocks = Vec::with_capacity(text.len() / block_size + 1);
    let mut start = 0;
    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % block_size == 0 {
            blocks.push(&text[start..offset]);
            start = offset;
        }
    }
    if start < text.len() {
        blocks.push(&text[start..]);
    }
    blocks
}

/// Split and base64-encode `content`, one string per `Block` element.
pub fn encode_blocks(
    content: &[u8],
    unit: ChunkUnit,
    block_size: usize,
) -> io::Result<Vec<String>> {
    let blocks: Vec<String> = split_blocks(content, unit, block_size)?
        .into_iter()
        .map(|block| STANDARD.encode(block))
        .collect();
    debug!(
        "Encoded {} bytes → {} block(s) of ≤{} {:?}",
        content.len(),
        blocks.len(),
        block_size,
        unit
    );
    Ok(blocks)
}

/// Reassemble the original content from encoded blocks.
pub fn decode_blocks<S: AsRef<str>>(blocks: &[S]) -> Result<Vec<u8>, base64::DecodeError> {
    let mut content = Vec::new();
    for block in blocks {
        content.extend(STANDARD.decode(block.as_ref())?);
    }
    Ok(content)
}
