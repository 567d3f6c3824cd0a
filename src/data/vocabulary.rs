// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Word-level vocabulary built from training captions.
//
// Index layout is fixed:
//
//   0     <start>
//   1     <end>
//   2     <pad>
//   3     <unk>
//   4..   retained tokens, in the order they first appear
//
// A token is retained when it occurs at least `min_frequency`
// times across all training captions. Everything else encodes
// to <unk>.

use std::collections::HashMap;

use crate::data::tokenizer::WordTokenizer;
use crate::error::Result;

pub const START_TOKEN: &str = "<start>";
pub const END_TOKEN:   &str = "<end>";
pub const PAD_TOKEN:   &str = "<pad>";
pub const UNK_TOKEN:   &str = "<unk>";

/// Reserved tokens, in index order.
pub const SPECIAL_TOKENS: [&str; 4] = [START_TOKEN, END_TOKEN, PAD_TOKEN, UNK_TOKEN];

pub const START_ID: usize = 0;
pub const END_ID:   usize = 1;
pub const PAD_ID:   usize = 2;
pub const UNK_ID:   usize = 3;

pub const DEFAULT_MIN_FREQUENCY: usize = 3;

/// Bidirectional token ↔ index mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    word2idx:      HashMap<String, usize>,
    idx2word:      Vec<String>,
    frequencies:   HashMap<String, usize>,
    min_frequency: usize,
}

impl Vocabulary {
    /// Specials followed by `tokens`, in order. Duplicates and special
    /// symbols inside `tokens` are skipped.
    pub fn from_tokens<I>(tokens: I, frequencies: HashMap<String, usize>, min_frequency: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut idx2word: Vec<String> = SPECIAL_TOKENS.iter().map(|s| s.to_string()).collect();
        let mut word2idx: HashMap<String, usize> = idx2word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        for token in tokens {
            if word2idx.contains_key(&token) {
                continue;
            }
            word2idx.insert(token.clone(), idx2word.len());
            idx2word.push(token);
        }

        Self {
            word2idx,
            idx2word,
            frequencies,
            min_frequency,
        }
    }

    /// Vocabulary containing only the special tokens.
    pub fn specials_only(min_frequency: usize) -> Self {
        Self::from_tokens(Vec::new(), HashMap::new(), min_frequency)
    }

    pub fn len(&self) -> usize {
        self.idx2word.len()
    }

    /// Never true: the special tokens are always present.
    pub fn is_empty(&self) -> bool {
        self.idx2word.is_empty()
    }

    pub fn min_frequency(&self) -> usize {
        self.min_frequency
    }

    pub fn contains(&self, token: &str) -> bool {
        self.word2idx.contains_key(token)
    }

    /// Index of `token`, falling back to `<unk>`.
    pub fn index_of(&self, token: &str) -> usize {
        self.word2idx.get(token).copied().unwrap_or(UNK_ID)
    }

    pub fn token_of(&self, index: usize) -> Option<&str> {
        self.idx2word.get(index).map(String::as_str)
    }

    /// Training-set count of a retained token (0 for specials and unknowns).
    pub fn frequency(&self, token: &str) -> usize {
        self.frequencies.get(token).copied().unwrap_or(0)
    }

    pub fn word2idx(&self) -> &HashMap<String, usize> {
        &self.word2idx
    }

    pub fn idx2word(&self) -> &[String] {
        &self.idx2word
    }

    pub fn frequencies(&self) -> &HashMap<String, usize> {
        &self.frequencies
    }

    /// Tokens after the specials, in index order
    pub fn retained(&self) -> &[String] {
        &self.idx2word[SPECIAL_TOKENS.len()..]
    }

    /// `<start>` + token indices + `<end>`
    pub fn encode(&self, caption: &str) -> Result<Vec<usize>> {
        let tokens = WordTokenizer::new().tokenize(caption)?;
        Ok(self.encode_tokens(&tokens))
    }

    pub fn encode_tokens(&self, tokens: &[String]) -> Vec<usize> {
        let mut ids = Vec::with_capacity(tokens.len() + 2);
        ids.push(START_ID);
        ids.extend(tokens.iter().map(|t| self.index_of(t)));
        ids.push(END_ID);
        ids
    }

    /// Encode to exactly `max_len` indices. Long captions are cut and
    /// still end with `<end>`; short ones are padded with `<pad>`.
    /// `<start>` always comes first, so `max_len == 1` gives `[<start>]`.
    pub fn encode_padded(&self, caption: &str, max_len: usize) -> Result<Vec<usize>> {
        let mut ids = self.encode(caption)?;
        if ids.len() > max_len {
            ids.truncate(max_len);
            if max_len >= 2 {
                ids[max_len - 1] = END_ID;
            }
        }
        ids.resize(max_len, PAD_ID);
        Ok(ids)
    }

    /// Turn indices back into text. Stops at `<end>`, skips `<start>`
    /// and `<pad>`, and renders out-of-range indices as `<unk>`.
    pub fn decode(&self, ids: &[usize]) -> String {
        let mut words = Vec::with_capacity(ids.len());
        for &id in ids {
            match id {
                END_ID => break,
                START_ID | PAD_ID => continue,
                _ => words.push(self.token_of(id).unwrap_or(UNK_TOKEN)),
            }
        }
        words.join(" ")
    }
}

// ─── VocabularyBuilder ────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    min_frequency: usize,
    tokenizer:     WordTokenizer,
}

impl VocabularyBuilder {
    pub fn new(min_frequency: usize) -> Self {
        Self { min_frequency, tokenizer: WordTokenizer::new() }
    }

    /// Count tokens over all captions and keep the frequent ones.
    pub fn build(&self, captions: &[String]) -> Result<Vocabulary> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for caption in captions {
            for token in self.tokenizer.tokenize(caption)? {
                let count = counts.entry(token).or_insert_with_key(|t| {
                    first_seen.push(t.clone());
                    0
                });
                *count += 1;
            }
        }

        let retained: Vec<String> = first_seen
            .into_iter()
            .filter(|t| counts[t] >= self.min_frequency && !SPECIAL_TOKENS.contains(&t.as_str()))
            .collect();
        let frequencies = retained.iter().map(|t| (t.clone(), counts[t])).collect();

        let vocab = Vocabulary::from_tokens(retained, frequencies, self.min_frequency);
        tracing::info!(
            "Vocabulary: {} distinct tokens, {} kept (min frequency {}), size {}",
            counts.len(),
            vocab.len() - SPECIAL_TOKENS.len(),
            self.min_frequency,
            vocab.len()
        );
        Ok(vocab)
    }
}

impl Default for VocabularyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FREQUENCY)
    }
}
