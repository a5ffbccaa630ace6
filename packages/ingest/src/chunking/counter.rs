//! Token counting.

use tiktoken_rs::CoreBPE;

use crate::error::{IngestError, Result};

/// Counts tokens of a text. The chunker only ever asks for counts.
pub trait TokenCounter: Sync {
    /// Number of tokens in `text`.
    fn count_tokens(&self, text: &str) -> Result<usize>;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Sync,
{
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self(text))
    }
}

/// `cl100k_base` tokenizer, the encoding of the downstream embedding model.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the `cl100k_base` encoding.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| IngestError::Tokenization(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.bpe.encode_ordinary(text).len())
    }
}
