use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Round a time in seconds to millisecond precision. Applied exactly once,
/// at record construction.
pub(crate) fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// One transcript symbol mapped onto a span of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedToken {
    pub token: String,
    /// Seconds from the start of the recording, [start, end).
    pub start: f64,
    pub end: f64,
    /// Confidence in [0, 1].
    pub score: f64,
}

/// Token-level alignment result: one entry per aligned transcript symbol
/// plus an utterance-level score.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAlignment {
    pub tokens: Vec<AlignedToken>,
    /// Overall alignment confidence: mean of per-token scores, 0.0 when
    /// nothing aligned.
    pub score: f64,
}

impl TokenAlignment {
    pub fn new(tokens: Vec<AlignedToken>) -> Self {
        let score = if tokens.is_empty() {
            0.0
        } else {
            round_ms(tokens.iter().map(|t| t.score).sum::<f64>() / tokens.len() as f64)
        };
        Self { tokens, score }
    }

    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            score: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

/// Position of a phoneme within its owning word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemePosition {
    Initial,
    Medial,
    Final,
}

impl PhonemePosition {
    pub(crate) fn from_index(index: usize, count: usize) -> Self {
        if index == 0 {
            Self::Initial
        } else if index + 1 == count {
            Self::Final
        } else {
            Self::Medial
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeTimestamp {
    /// ARPAbet symbol, possibly with a stress digit suffix (e.g. "AH0").
    pub phoneme: String,
    pub start: f64,
    pub end: f64,
    /// Position in the full phoneme sequence of the utterance.
    pub index: usize,
    pub word: Option<String>,
    pub position: PhonemePosition,
    pub confidence: f64,
}

/// Combined alignment result handed to the caller for scoring or archival.
/// This crate never persists it itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub word_timestamps: Vec<WordTimestamp>,
    pub phoneme_timestamps: Vec<PhonemeTimestamp>,
    pub audio_path: String,
    pub text: String,
}

/// Per-frame emission log-probabilities over the model vocabulary,
/// frames x vocab_size. Produced once per request and consumed once.
#[derive(Debug, Clone)]
pub struct EmissionMatrix {
    log_probs: Vec<Vec<f32>>,
}

impl EmissionMatrix {
    pub fn new(log_probs: Vec<Vec<f32>>) -> Result<Self, AlignmentError> {
        let Some(first) = log_probs.first() else {
            return Err(AlignmentError::invalid_input("emission matrix has no frames"));
        };
        let vocab_size = first.len();
        if vocab_size == 0 {
            return Err(AlignmentError::invalid_input("emission matrix has empty rows"));
        }
        if log_probs.iter().any(|row| row.len() != vocab_size) {
            return Err(AlignmentError::invalid_input(
                "emission matrix rows have inconsistent vocabulary size",
            ));
        }
        Ok(Self { log_probs })
    }

    pub fn frames(&self) -> usize {
        self.log_probs.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.log_probs[0].len()
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.log_probs
    }
}

/// Symbol/index table belonging to one acoustic-model variant. The blank
/// index separates CTC runs and must never appear in an alignment target.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    symbol_to_id: HashMap<char, usize>,
    id_to_symbol: Vec<Option<char>>,
    blank_id: usize,
}

impl Vocabulary {
    pub fn new(symbol_to_id: HashMap<char, usize>, blank_id: usize) -> Self {
        let max_id = symbol_to_id
            .values()
            .copied()
            .max()
            .unwrap_or(0)
            .max(blank_id);
        let mut id_to_symbol = vec![None; max_id + 1];
        for (&symbol, &id) in &symbol_to_id {
            id_to_symbol[id] = Some(symbol);
        }
        Self {
            symbol_to_id,
            id_to_symbol,
            blank_id,
        }
    }

    /// Parse a `vocab.json` symbol -> index table. Multi-character keys
    /// (special tokens like `<pad>`) are skipped.
    pub fn from_json_file(path: &Path, blank_id: usize) -> Result<Self, AlignmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read vocab.json", e))?;
        let raw: HashMap<String, usize> =
            serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse vocab.json", e))?;

        let symbol_to_id = raw
            .into_iter()
            .filter_map(|(k, v)| {
                let mut it = k.chars();
                let c = it.next()?;
                if it.next().is_some() {
                    return None;
                }
                Some((c, v))
            })
            .collect();
        Ok(Self::new(symbol_to_id, blank_id))
    }

    pub fn id(&self, symbol: char) -> Option<usize> {
        self.symbol_to_id.get(&symbol).copied()
    }

    pub fn symbol(&self, id: usize) -> Option<char> {
        self.id_to_symbol.get(id).copied().flatten()
    }

    pub fn blank_id(&self) -> usize {
        self.blank_id
    }

    /// Highest index plus one; the emission matrix must be at least this wide.
    pub fn size(&self) -> usize {
        self.id_to_symbol.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbol_to_id.keys().copied()
    }
}
