// ============================================================
// Layer 4 — Word Tokenizer
// ============================================================
// Splits caption text into word-level tokens.
//
// Uses the `Whitespace` pre-tokenizer from the tokenizers crate,
// which matches the pattern  \w+|[^\w\s]+
//   "a red cat."     → ["a", "red", "cat", "."]
//   "no (acute) mass" → ["no", "(", "acute", ")", "mass"]
//
// The tokenizer is stateless: the same text always produces
// the same tokens, so counts never depend on call order.

use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use crate::error::{PrepError, Result};

#[derive(Debug, Clone)]
pub struct WordTokenizer {
    inner: Whitespace,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self { inner: Whitespace::default() }
    }

    /// Split `text` into owned word tokens.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut pretokenized = PreTokenizedString::from(text);
        self.inner
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| PrepError::Tokenizer(e.to_string()))?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(token, _, _)| token.to_string())
            .collect())
    }

    /// Number of tokens in `text`
    pub fn count(&self, text: &str) -> Result<usize> {
        Ok(self.tokenize(text)?.len())
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
