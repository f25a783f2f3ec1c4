use crate::types::Vocabulary;

/// Transcript characters resolved to alignment-target vocabulary indices.
///
/// `ids[i]` is the vocabulary index of `symbols[i]`. The blank index never
/// appears here.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSequence {
    pub ids: Vec<usize>,
    pub symbols: Vec<char>,
}

impl TargetSequence {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Resolve a transcript into alignment targets.
///
/// The transcript is case-normalized to match the vocabulary: an
/// uppercase-only alphabet uppercases the transcript, anything else
/// lowercases it. Whitespace and non-alphabetic characters are dropped, as
/// are symbols missing from the vocabulary and any symbol that resolves to
/// the blank index (the blank is the CTC separator, never a target).
pub fn build_target_sequence(transcript: &str, vocab: &Vocabulary) -> TargetSequence {
    let mut has_upper = false;
    let mut has_lower = false;
    for c in vocab.symbols().filter(|c| c.is_alphabetic()) {
        if c.is_uppercase() {
            has_upper = true;
        }
        if c.is_lowercase() {
            has_lower = true;
        }
    }
    let cleaned = if has_upper && !has_lower {
        transcript.to_uppercase()
    } else {
        transcript.to_lowercase()
    };

    let mut ids = Vec::new();
    let mut symbols = Vec::new();
    for c in cleaned.chars().filter(|c| c.is_alphabetic()) {
        let Some(id) = vocab.id(c) else {
            continue;
        };
        if id == vocab.blank_id() {
            continue;
        }
        ids.push(id);
        symbols.push(c);
    }

    TargetSequence { ids, symbols }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vocab_lower() -> Vocabulary {
        let mut m = HashMap::new();
        m.insert('a', 1);
        m.insert('b', 2);
        m.insert('c', 3);
        Vocabulary::new(m, 0)
    }

    fn vocab_upper() -> Vocabulary {
        let mut m = HashMap::new();
        m.insert('A', 1);
        m.insert('B', 2);
        m.insert('C', 3);
        Vocabulary::new(m, 0)
    }

    #[test]
    fn empty_transcript_produces_empty_targets() {
        let seq = build_target_sequence("", &vocab_lower());
        assert!(seq.is_empty());
    }

    #[test]
    fn whitespace_is_dropped_entirely() {
        let seq = build_target_sequence("ab  ba", &vocab_lower());
        assert_eq!(seq.ids, vec![1, 2, 2, 1]);
        assert_eq!(seq.symbols, vec!['a', 'b', 'b', 'a']);
    }

    #[test]
    fn uppercase_only_vocab_uppercases_transcript() {
        let seq = build_target_sequence("ab", &vocab_upper());
        assert_eq!(seq.symbols, vec!['A', 'B']);
        assert_eq!(seq.ids, vec![1, 2]);
    }

    #[test]
    fn lowercase_vocab_lowercases_transcript() {
        let seq = build_target_sequence("AB", &vocab_lower());
        assert_eq!(seq.symbols, vec!['a', 'b']);
    }

    #[test]
    fn unknown_and_non_alphabetic_symbols_skipped() {
        let seq = build_target_sequence("a1x-b!", &vocab_lower());
        assert_eq!(seq.symbols, vec!['a', 'b']);
    }

    #[test]
    fn symbols_mapping_to_blank_are_stripped() {
        // 'z' shares index 0 with the blank; it must never become a target.
        let mut m = HashMap::new();
        m.insert('z', 0);
        m.insert('a', 1);
        let vocab = Vocabulary::new(m, 0);
        let seq = build_target_sequence("za", &vocab);
        assert_eq!(seq.ids, vec![1]);
        assert_eq!(seq.symbols, vec!['a']);
    }
}
