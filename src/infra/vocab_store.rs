// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the vocabulary built from the training captions.
//
// Two files are written into the output directory:
//
//   vocab.json      — word2idx, idx2word, min_frequency and the
//                     retained-token counts; load() rebuilds an
//                     identical Vocabulary from it
//
//   tokenizer.json  — HuggingFace WordLevel tokenizer with the
//                     same ids, so a trainer can call
//                     Tokenizer::from_file() and get the exact
//                     indices this crate assigned
//
// Reference: tokenizers crate, WordLevel model JSON format

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::vocabulary::{Vocabulary, SPECIAL_TOKENS, UNK_TOKEN};

pub const VOCAB_FILE:     &str = "vocab.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// On-disk layout of vocab.json
#[derive(Debug, Serialize, Deserialize)]
struct VocabFile {
    min_frequency: usize,
    word2idx:      BTreeMap<String, usize>,
    idx2word:      Vec<String>,
    frequencies:   BTreeMap<String, usize>,
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Write vocab.json
    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let file = VocabFile {
            min_frequency: vocab.min_frequency(),
            word2idx:      vocab.word2idx().iter().map(|(k, &v)| (k.clone(), v)).collect(),
            idx2word:      vocab.idx2word().to_vec(),
            frequencies:   vocab.frequencies().iter().map(|(k, &v)| (k.clone(), v)).collect(),
        };

        let path = self.vocab_path();
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::info!("Vocabulary ({} tokens) saved to '{}'", vocab.len(), path.display());
        Ok(())
    }

    /// Read vocab.json back, checking that the index layout is intact.
    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.vocab_path();
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
        let file: VocabFile = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary file '{}'", path.display()))?;

        if file.idx2word.len() < SPECIAL_TOKENS.len()
            || file.idx2word[..SPECIAL_TOKENS.len()] != SPECIAL_TOKENS
        {
            bail!("'{}' does not start with the reserved tokens {:?}", path.display(), SPECIAL_TOKENS);
        }

        let frequencies: HashMap<String, usize> = file.frequencies.into_iter().collect();
        let vocab = Vocabulary::from_tokens(
            file.idx2word[SPECIAL_TOKENS.len()..].iter().cloned(),
            frequencies,
            file.min_frequency,
        );

        // Duplicates collapse in from_tokens; any mismatch means a broken file
        if vocab.len() != file.idx2word.len()
            || file.word2idx.len() != file.idx2word.len()
            || file.word2idx.iter().any(|(w, &i)| vocab.token_of(i) != Some(w.as_str()))
        {
            bail!("'{}' has inconsistent word2idx / idx2word tables", path.display());
        }

        tracing::debug!("Loaded vocabulary of {} tokens", vocab.len());
        Ok(vocab)
    }

    /// Write tokenizer.json in HuggingFace format and load it back.
    pub fn export_tokenizer(&self, vocab: &Vocabulary) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let ids: BTreeMap<&str, usize> = vocab
            .idx2word()
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, content)| {
                serde_json::json!({
                    "id": id, "content": content, "single_word": false, "lstrip": false,
                    "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": ids,
                "unk_token": UNK_TOKEN
            }
        });

        let path = self.tokenizer_path();
        std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", path.display()))?;
        tracing::info!("Tokenizer exported to '{}'", path.display());

        self.load_tokenizer()
    }

    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        let path = self.tokenizer_path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocabulary::VocabularyBuilder;

    fn vocab() -> Vocabulary {
        let caps: Vec<String> = ["a red cat", "a red cat", "a blue dog"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        VocabularyBuilder::new(2).build(&caps).unwrap()
    }

    #[test]
    fn test_save_then_load_is_identical() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let v     = vocab();

        store.save(&v).unwrap();
        assert_eq!(store.load().unwrap(), v);
    }

    #[test]
    fn test_load_rejects_reordered_specials() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        std::fs::write(
            store.vocab_path(),
            r#"{"min_frequency": 1, "word2idx": {}, "idx2word": ["<pad>", "<start>", "<end>", "<unk>"], "frequencies": {}}"#,
        )
        .unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_rejects_inconsistent_tables() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        std::fs::write(
            store.vocab_path(),
            r#"{"min_frequency": 1, "word2idx": {"cat": 9},
                "idx2word": ["<start>", "<end>", "<pad>", "<unk>", "cat"], "frequencies": {}}"#,
        )
        .unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_rejects_incomplete_word2idx() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        std::fs::write(
            store.vocab_path(),
            r#"{"min_frequency": 1, "word2idx": {"<start>": 0, "<end>": 1},
                "idx2word": ["<start>", "<end>", "<pad>", "<unk>", "cat"], "frequencies": {"cat": 2}}"#,
        )
        .unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_missing_vocab_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VocabStore::new(dir.path().join("nope")).load().is_err());
    }

    #[test]
    fn test_exported_tokenizer_uses_same_ids() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let v     = vocab();

        let tokenizer = store.export_tokenizer(&v).unwrap();
        let enc = tokenizer.encode("a red cat zebra", false).unwrap();
        let ids: Vec<usize> = enc.get_ids().iter().map(|&i| i as usize).collect();
        assert_eq!(
            ids,
            vec![v.index_of("a"), v.index_of("red"), v.index_of("cat"), v.index_of("zebra")]
        );
        assert_eq!(tokenizer.get_vocab_size(false), v.len());
    }
}
