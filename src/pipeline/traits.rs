use std::path::Path;

use crate::error::AlignmentError;
use crate::types::{EmissionMatrix, TokenAlignment, Vocabulary};

/// Opaque acoustic model. Loaded once per process and shared read-only
/// across requests; producing emissions is a bounded synchronous call whose
/// batching/concurrency is the provider's own concern.
pub trait EmissionProvider: Send + Sync {
    /// Per-frame emission log-probabilities for a mono waveform at the
    /// expected sample rate. Columns index into [`Self::vocabulary`].
    fn emissions(&self, samples: &[f32]) -> Result<EmissionMatrix, AlignmentError>;

    fn vocabulary(&self) -> &Vocabulary;

    /// Whether the vocabulary maps transcript symbols directly, making
    /// forced alignment possible. When false only greedy decode-then-match
    /// is usable. Decides the [`TokenAligner`] strategy at build time.
    fn supports_direct_alignment(&self) -> bool;
}

/// Audio decoding/resampling boundary. Implementations return mono samples
/// normalized to the pipeline's expected sample rate.
pub trait AudioLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<(Vec<f32>, u32), AlignmentError>;
}

/// Grapheme-to-phoneme conversion, consulted only when no precomputed
/// phoneme sequence is supplied.
pub trait GraphemeToPhoneme: Send + Sync {
    fn words_to_phonemes(&self, text: &str) -> Vec<(String, Vec<String>)>;
}

/// Strategy seam over the two model variants: map a transcript onto frame
/// spans of the emission matrix, with an utterance-level score.
pub trait TokenAligner: Send + Sync {
    fn aligned_tokens(
        &self,
        emissions: &EmissionMatrix,
        vocab: &Vocabulary,
        transcript: &str,
        audio_duration: f64,
    ) -> Result<TokenAlignment, AlignmentError>;
}
