// ============================================================
// Layer 4 — Caption Preprocessor
// ============================================================
// Normalises raw training captions before vocabulary building.
//
// Cleaning steps (applied in order):
//   1. Map tabs, non-breaking/zero-width spaces, BOMs and
//      control characters to a plain space
//   2. Lowercase
//   3. Separate punctuation from neighbouring words
//      ("mass,no effusion." → "mass , no effusion .")
//   4. Collapse runs of spaces and trim the ends
//
// The result is a fixed point: cleaning an already cleaned
// caption returns it unchanged.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise one caption.
    pub fn separate_sequences(&self, text: &str) -> String {
        // ── Step 1: Normalise individual characters ───────────────────────────
        let normalised = text.chars().map(|c| match c {
            '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
            c if c.is_whitespace() || c.is_control() => ' ',
            c => c,
        });

        // ── Step 2 + 3: Lowercase and pad punctuation with spaces ────────────
        let mut spaced = String::with_capacity(text.len() + 8);
        for c in normalised.flat_map(char::to_lowercase) {
            if is_separable(c) {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            } else {
                spaced.push(c);
            }
        }

        // ── Step 4: Collapse whitespace ───────────────────────────────────────
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalise every caption, keeping order.
    pub fn preprocess_all(&self, captions: &[String]) -> Vec<String> {
        captions
            .iter()
            .map(|c| self.separate_sequences(c))
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Punctuation and symbols that become standalone tokens.
fn is_separable(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separates_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(
            p.separate_sequences("Mass,no effusion."),
            "mass , no effusion ."
        );
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        let p = Preprocessor::new();
        assert_eq!(p.separate_sequences("  chest \t x\u{00A0}ray  "), "chest x ray");
    }

    #[test]
    fn test_control_chars_become_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.separate_sequences("left\x01lung\r\nclear"), "left lung clear");
    }

    #[test]
    fn test_idempotent() {
        let p = Preprocessor::new();
        let samples = [
            "CT scan: (axial) shows 2.5cm mass -- no effusion!!",
            "a..b",
            "  Ünïcode  Ärzte—Bericht  ",
            "x-ray of the LEFT hand; 'normal'",
            "",
            "   ",
            "already clean text",
        ];
        for s in samples {
            let once  = p.separate_sequences(s);
            let twice = p.separate_sequences(&once);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_preprocess_all_keeps_order() {
        let p   = Preprocessor::new();
        let out = p.preprocess_all(&["B.".to_string(), "a".to_string()]);
        assert_eq!(out, vec!["b .", "a"]);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.separate_sequences(""), "");
    }
}
