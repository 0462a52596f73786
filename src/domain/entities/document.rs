use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, Result};

/// Characters a window may be cut after instead of at its hard end.
const BOUNDARY_CHARS: [char; 5] = ['\n', '.', '!', '?', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    /// Character offset where the untrimmed window starts.
    pub start: usize,
    /// Character offset one past the end of the untrimmed window.
    pub end: usize,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            index,
            text: text.into(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
}

impl SearchResult {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// A hit returned by a vector index: the position of the stored vector and
/// its similarity score (higher is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub score: f32,
}

impl Neighbor {
    pub fn new(position: usize, score: f32) -> Self {
        Self { position, score }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub boundary_lookback: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            boundary_lookback: 100,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_boundary_lookback(mut self, lookback: usize) -> Self {
        self.boundary_lookback = lookback;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits text into overlapping windows of `chunk_size` characters.
///
/// A window that ends inside the text is cut just after the nearest boundary
/// character found within its last `boundary_lookback` characters, so chunks
/// tend to end on a sentence, line or word. Consecutive windows share
/// `chunk_overlap` raw characters. Each window is trimmed and blank windows
/// are dropped; the remaining chunks are indexed sequentially from 0.
///
/// Offsets are in characters, never bytes, so multi-byte text is never split
/// inside a code point.
pub fn split_into_chunks(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = start + config.chunk_size;

        if end < len {
            let floor = start.max(end.saturating_sub(config.boundary_lookback));
            if let Some(i) = (floor + 1..=end)
                .rev()
                .find(|&i| BOUNDARY_CHARS.contains(&chars[i]))
            {
                end = i + 1;
            }
        }

        let window_end = end.min(len);
        let window: String = chars[start..window_end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk::new(chunks.len(), trimmed, start, window_end));
        }

        let next = end.saturating_sub(config.chunk_overlap);
        if next >= len {
            break;
        }
        // An early boundary cut can leave no room for the overlap, and an
        // unvalidated zero `chunk_size` gives an empty window.
        start = if next > start { next } else { end.max(start + 1) };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(chunk_size, chunk_overlap).unwrap()
    }

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_split_empty() {
        assert!(split_into_chunks("", &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn test_split_whitespace_only() {
        assert!(split_into_chunks("   \n\t  ", &config(3, 1)).is_empty());
    }

    #[test]
    fn test_split_short_text_single_chunk() {
        let chunks = split_into_chunks("  Hello world.  ", &ChunkingConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.");
        assert_eq!(chunks[0].index, 0);
        assert_eq!((chunks[0].start, chunks[0].end), (0, 16));
    }

    #[test]
    fn test_split_sentences_small_window() {
        let chunks = split_into_chunks("A. B. C. D. E.", &config(5, 2));

        assert_eq!(texts(&chunks), vec!["A. B.", ". C.", ". D.", ". E.", "."]);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 7));
        for letter in ["A", "B", "C", "D", "E"] {
            assert!(chunks.iter().any(|c| c.text.contains(letter)), "{letter} missing");
        }
    }

    #[test]
    fn test_split_cuts_at_sentence_boundary() {
        let text = "alpha beta.   gamma delta.   epsilon zeta.";
        let chunks = split_into_chunks(text, &config(17, 2));
        assert_eq!(texts(&chunks), vec!["alpha beta.", "gamma delta.", "epsilon zeta."]);
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_split_hard_cut_without_boundary() {
        let chunks = split_into_chunks("abcdefghij", &config(4, 1));
        assert_eq!(texts(&chunks), vec!["abcd", "defg", "ghij", "j"]);
    }

    #[test]
    fn test_split_overlap_repeats_raw_characters() {
        let chunks = split_into_chunks("abcdefghij", &config(4, 1));
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - 1);
        }
    }

    #[test]
    fn test_split_lookback_is_bounded() {
        // The only boundary is 6 characters back, outside a 3 character lookback.
        let text = "abc defghijklmnop";
        let cfg = config(10, 2).with_boundary_lookback(3);
        let chunks = split_into_chunks(text, &cfg);
        assert_eq!(chunks[0].text, "abc defghi");

        let cfg = config(10, 2).with_boundary_lookback(100);
        let chunks = split_into_chunks(text, &cfg);
        assert_eq!(chunks[0].text, "abc");
    }

    #[test]
    fn test_split_advances_when_cut_is_early() {
        // Cutting after the space leaves the overlap pointing back at start.
        let chunks = split_into_chunks("a bcdefg", &config(5, 2));
        assert!(!chunks.is_empty());
        for pair in chunks.windows(2) {
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_split_terminates_on_unvalidated_config() {
        let zero = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            boundary_lookback: 100,
        };
        assert!(split_into_chunks("abc", &zero).is_empty());

        let wide_overlap = ChunkingConfig {
            chunk_size: 2,
            chunk_overlap: 5,
            boundary_lookback: 100,
        };
        let chunks = split_into_chunks("abcdef", &wide_overlap);
        assert_eq!(texts(&chunks), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn test_split_multibyte() {
        let text = "héllo wörld ñandú çava";
        let chunks = split_into_chunks(text, &config(8, 2));
        assert!(!chunks.is_empty());
        assert!(chunks.iter().any(|c| c.text.contains("ñandú")));
    }

    #[test]
    fn test_config_rejects_overlap_not_below_size() {
        assert!(matches!(
            ChunkingConfig::new(100, 100),
            Err(DomainError::Validation(_))
        ));
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(100, 50).is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = ChunkingConfig::default();
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.chunk_overlap, 200);
        assert_eq!(cfg.boundary_lookback, 100);
    }
}
