//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`CharacterTextSplitter`] - merges separator-delimited pieces up to a size limit with overlap
//! - [`FixedSizeChunker`] - splits by character count with configurable overlap
//!
//! All sizes are measured in characters (Unicode scalar values), never bytes.

use std::collections::VecDeque;

use tracing::debug;

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split raw text into ordered, non-empty chunk strings.
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text,
                    position: i,
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.id.clone(),
                }
            })
            .collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Character windows of `chunk_size` advancing by `chunk_size - chunk_overlap`.
///
/// The last window may be shorter. Windows always start and end on char boundaries.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let boundaries: Vec<usize> =
        text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let char_count = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// # Example
///
/// ```rust,ignore
/// use askpdf_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        split_by_size(text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }
}

/// Splits text on a separator, then greedily merges the pieces into chunks.
///
/// Pieces are re-joined with the separator while the merged length stays within
/// `chunk_size`. When a chunk is emitted, the next one starts with the trailing
/// pieces of the previous chunk, the fewest that add up to at least `chunk_overlap`
/// characters while still leaving room for the next piece. A single piece longer
/// than `chunk_size` is cut into fixed windows (see [`FixedSizeChunker`]), so no
/// chunk ever exceeds `chunk_size`. Chunks are whitespace-trimmed and never empty.
///
/// # Example
///
/// ```rust,ignore
/// use askpdf_rag::CharacterTextSplitter;
///
/// let splitter = CharacterTextSplitter::new("\n", 1000, 200);
/// let chunks = splitter.split_text(&text);
/// ```
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    /// Create a new `CharacterTextSplitter`.
    ///
    /// # Arguments
    ///
    /// * `separator`: preferred split boundary, removed from the output at split points
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: minimum number of characters repeated between consecutive chunks,
///   when whole pieces allow it
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { separator: separator.into(), chunk_size, chunk_overlap }
    }

    fn emit(&self, pieces: &VecDeque<&str>, chunks: &mut Vec<String>) {
        if pieces.is_empty() {
            return;
        }
        let joined = pieces.iter().copied().collect::<Vec<_>>().join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

impl Chunker for CharacterTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let separator_len = char_len(&self.separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in text.split(self.separator.as_str()).filter(|p| !p.is_empty()) {
            let len = char_len(piece);

            if len > self.chunk_size {
                self.emit(&current, &mut chunks);
                current.clear();
                total = 0;
                debug!(piece_len = len, chunk_size = self.chunk_size, "splitting oversized piece");
                chunks.extend(
                    split_by_size(piece, self.chunk_size, self.chunk_overlap)
                        .into_iter()
                        .map(|window| window.trim().to_string())
                        .filter(|window| !window.is_empty()),
                );
                continue;
            }

            let joiner = if current.is_empty() { 0 } else { separator_len };
            if total + len + joiner > self.chunk_size && !current.is_empty() {
                self.emit(&current, &mut chunks);

                // Keep the shortest tail of at least `chunk_overlap` chars, dropping
                // more only when `piece` would not fit after it.
                while let Some(&first) = current.front() {
                    let joined = if current.len() > 1 { separator_len } else { 0 };
                    let rest = total - char_len(first) - joined;
                    let no_room = total + separator_len + len > self.chunk_size;
                    if !no_room && rest < self.chunk_overlap {
                        break;
                    }
                    current.pop_front();
                    total = rest;
                }
            }

            total += len + if current.is_empty() { 0 } else { separator_len };
            current.push_back(piece);
        }

        self.emit(&current, &mut chunks);
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(n: usize) -> String {
        (0..n).map(|i| (b'a' + (i % 26) as u8) as char).collect()
    }

    #[test]
    fn fixed_windows_start_every_step() {
        let text = alphabet(2500);
        let chunks = FixedSizeChunker::new(1000, 200).split_text(&text);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![1000, 1000, 900, 100]);
        for (i, chunk) in chunks.iter().enumerate() {
            let expected: String = text.chars().skip(i * 800).take(1000).collect();
            assert_eq!(chunk, &expected);
        }
    }

    #[test]
    fn fixed_windows_respect_char_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(20);
        let chunks = FixedSizeChunker::new(7, 2).split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
        assert_eq!(chunks[0], "héllo w");
        assert_eq!(chunks[1], " wörld ");
    }

    #[test]
    fn separator_free_text_of_2500_chars_gives_four_chunks() {
        let text = alphabet(2500);
        let chunks = CharacterTextSplitter::new("\n", 1000, 200).split_text(&text);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 900);
        assert_eq!(chunks[3].chars().count(), 100);
        assert!(text.starts_with(&chunks[0]));
        assert!(text.ends_with(&chunks[3]));
    }

    #[test]
    fn lines_are_merged_up_to_the_limit_with_line_overlap() {
        // 25 lines of 99 chars joined by '\n' -> 2499 chars.
        let lines: Vec<String> = (0..25).map(|i| format!("{i:02}{}", "x".repeat(97))).collect();
        let text = lines.join("\n");
        let chunks = CharacterTextSplitter::new("\n", 1000, 200).split_text(&text);

        // Two lines (199 chars) fall short of the overlap, so three are carried.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], lines[0..10].join("\n"));
        assert_eq!(chunks[1], lines[7..17].join("\n"));
        assert_eq!(chunks[2], lines[14..24].join("\n"));
        assert_eq!(chunks[3], lines[21..25].join("\n"));
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
    }

    #[test]
    fn chunks_end_at_separator_not_at_the_numeric_boundary() {
        let text = format!("{}\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = CharacterTextSplitter::new("\n", 100, 10).split_text(&text);
        assert_eq!(chunks, vec!["a".repeat(60), "b".repeat(60)]);
    }

    #[test]
    fn oversized_line_between_short_lines() {
        let text = format!("intro\n{}\noutro", "z".repeat(250));
        let chunks = CharacterTextSplitter::new("\n", 100, 20).split_text(&text);
        assert_eq!(chunks.first().map(String::as_str), Some("intro"));
        assert_eq!(chunks.last().map(String::as_str), Some("outro"));
        assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= 100));
        // 250 chars in windows of 100 advancing by 80: 0, 80, 160, 240.
        assert_eq!(chunks.len(), 6);
    }

    #[test]
    fn blank_input_yields_nothing() {
        let splitter = CharacterTextSplitter::new("\n", 100, 10);
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("\n\n  \n").is_empty());
    }

    #[test]
    fn chunks_are_trimmed_and_empty_pieces_dropped() {
        let chunks = CharacterTextSplitter::new("\n", 100, 10).split_text("\n\n  hello  \n\nworld\n");
        assert_eq!(chunks, vec!["hello  \nworld"]);
    }

    #[test]
    fn chunk_ids_and_metadata() {
        let mut document = Document::new("doc", "doc.pdf", "one\ntwo\nthree");
        document.metadata.insert("source".into(), "doc.pdf".into());
        let chunks = CharacterTextSplitter::new("\n", 5, 0).chunk(&document);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].id, "doc_2");
        assert_eq!(chunks[2].position, 2);
        assert_eq!(chunks[2].document_id, "doc");
        assert_eq!(chunks[2].metadata.get("chunk_index").map(String::as_str), Some("2"));
        assert_eq!(chunks[2].metadata.get("source").map(String::as_str), Some("doc.pdf"));
        assert!(chunks.iter().all(|c| c.embedding.is_empty()));
    }
}
