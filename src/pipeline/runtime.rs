use std::path::Path;
use std::sync::Arc;

use crate::alignment::fallback::{
    uniform_token_spread, uniform_word_spread, DEFAULT_FALLBACK_DURATION_S,
};
use crate::alignment::phonemes::{
    distribute_across_utterance, distribute_within_words, weighted_phoneme_spread,
};
use crate::alignment::repair::repair_spans;
use crate::alignment::words::group_tokens_into_words;
use crate::pipeline::traits::{AudioLoader, EmissionProvider, GraphemeToPhoneme, TokenAligner};
use crate::types::{AlignmentRecord, PhonemeTimestamp, TokenAlignment, WordTimestamp};

/// The alignment pipeline: emissions -> token alignment -> word boundaries
/// -> phoneme distribution, with repair and the fallback chain in between.
///
/// Every public method recovers failures internally and returns a usable
/// (possibly low-confidence) result; nothing here raises to the caller.
/// Holds no request state between calls.
pub struct PronunciationAligner {
    provider: Arc<dyn EmissionProvider>,
    audio_loader: Box<dyn AudioLoader>,
    g2p: Option<Box<dyn GraphemeToPhoneme>>,
    token_aligner: Box<dyn TokenAligner>,
    expected_sample_rate_hz: u32,
}

pub(crate) struct PronunciationAlignerParts {
    pub provider: Arc<dyn EmissionProvider>,
    pub audio_loader: Box<dyn AudioLoader>,
    pub g2p: Option<Box<dyn GraphemeToPhoneme>>,
    pub token_aligner: Box<dyn TokenAligner>,
    pub expected_sample_rate_hz: u32,
}

impl std::fmt::Debug for PronunciationAligner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PronunciationAligner")
            .field("expected_sample_rate_hz", &self.expected_sample_rate_hz)
            .field("has_g2p", &self.g2p.is_some())
            .finish_non_exhaustive()
    }
}

impl PronunciationAligner {
    pub(crate) fn from_parts(parts: PronunciationAlignerParts) -> Self {
        Self {
            provider: parts.provider,
            audio_loader: parts.audio_loader,
            g2p: parts.g2p,
            token_aligner: parts.token_aligner,
            expected_sample_rate_hz: parts.expected_sample_rate_hz,
        }
    }

    /// Character-level alignment of a transcript onto a waveform, with an
    /// utterance-level score (mean of per-token confidences). Guaranteed
    /// non-empty for a non-empty transcript and positive-duration audio: any
    /// model or alignment failure degrades to the uniform character spread.
    pub fn aligned_tokens(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
        transcript: &str,
    ) -> TokenAlignment {
        let transcript = transcript.trim();
        if samples.is_empty() || transcript.is_empty() || sample_rate_hz == 0 {
            return TokenAlignment::empty();
        }

        if sample_rate_hz != self.expected_sample_rate_hz {
            tracing::warn!(
                expected_rate_hz = self.expected_sample_rate_hz,
                actual_rate_hz = sample_rate_hz,
                "aligner expects a specific sample rate; quality may degrade"
            );
        }

        let audio_duration = samples.len() as f64 / sample_rate_hz as f64;

        let emissions = match self.provider.emissions(samples) {
            Ok(emissions) => emissions,
            Err(err) => {
                tracing::warn!(error = %err, "emission computation failed");
                return TokenAlignment::new(uniform_token_spread(transcript, audio_duration));
            }
        };

        match self.token_aligner.aligned_tokens(
            &emissions,
            self.provider.vocabulary(),
            transcript,
            audio_duration,
        ) {
            Ok(alignment) if !alignment.is_empty() => alignment,
            Ok(_) => {
                tracing::warn!("token alignment produced no tokens");
                TokenAlignment::new(uniform_token_spread(transcript, audio_duration))
            }
            Err(err) => {
                tracing::warn!(error = %err, "token alignment failed");
                TokenAlignment::new(uniform_token_spread(transcript, audio_duration))
            }
        }
    }

    /// Word boundaries for a transcript over a recording. Falls back to a
    /// uniform word spread (2 s assumed duration if even loading fails).
    pub fn word_timestamps(&self, audio_path: &Path, text: &str) -> Vec<WordTimestamp> {
        let (samples, sample_rate_hz) = match self.audio_loader.load(audio_path) {
            Ok(audio) => audio,
            Err(err) => {
                tracing::warn!(error = %err, path = %audio_path.display(), "audio load failed");
                return uniform_word_spread(text, DEFAULT_FALLBACK_DURATION_S);
            }
        };
        let audio_duration = duration_seconds(&samples, sample_rate_hz);

        let alignment = self.aligned_tokens(&samples, sample_rate_hz, text);
        if alignment.is_empty() {
            tracing::warn!("no character alignments found, using duration estimation");
            return uniform_word_spread(text, audio_duration);
        }

        let words = group_tokens_into_words(text, &alignment.tokens);
        if words.is_empty() {
            return uniform_word_spread(text, audio_duration);
        }
        words
    }

    /// Weight-proportional phoneme spread over the whole recording, with no
    /// word alignment involved.
    pub fn phoneme_timestamps(
        &self,
        audio_path: &Path,
        expected_phonemes: &[String],
    ) -> Vec<PhonemeTimestamp> {
        if expected_phonemes.is_empty() {
            return Vec::new();
        }
        let audio_duration = match self.audio_loader.load(audio_path) {
            Ok((samples, sample_rate_hz)) => duration_seconds(&samples, sample_rate_hz),
            Err(err) => {
                tracing::warn!(error = %err, path = %audio_path.display(), "audio load failed");
                DEFAULT_FALLBACK_DURATION_S
            }
        };
        let mut phonemes = weighted_phoneme_spread(expected_phonemes, audio_duration);
        repair_spans(&mut phonemes);
        phonemes
    }

    /// Phoneme boundaries backed by word-level forced alignment.
    ///
    /// A supplied `expected_phonemes` sequence is preferred so stored
    /// reference data is reused rather than re-derived; otherwise the
    /// configured G2P produces phonemes per word. Without word timestamps
    /// the whole-recording spread takes over.
    pub fn phoneme_timestamps_with_text(
        &self,
        audio_path: &Path,
        text: &str,
        expected_phonemes: Option<&[String]>,
    ) -> Vec<PhonemeTimestamp> {
        let word_timestamps = self.word_timestamps(audio_path, text);
        if word_timestamps.is_empty() {
            tracing::warn!("no word timestamps from alignment, using fallback");
            return self.phoneme_timestamps(audio_path, expected_phonemes.unwrap_or_default());
        }

        let mut phonemes = match expected_phonemes {
            Some(phonemes) => distribute_across_utterance(phonemes, &word_timestamps, text),
            None => match &self.g2p {
                Some(g2p) => {
                    let word_phonemes = g2p.words_to_phonemes(text);
                    distribute_within_words(&word_phonemes, &word_timestamps)
                }
                None => {
                    tracing::warn!("no phoneme sequence supplied and no G2P configured");
                    Vec::new()
                }
            },
        };
        repair_spans(&mut phonemes);
        phonemes
    }

    /// Full word + phoneme alignment for one recording, bundled for the
    /// caller to score or archive.
    pub fn align_audio(&self, audio_path: &Path, text: &str) -> AlignmentRecord {
        let word_timestamps = self.word_timestamps(audio_path, text);
        let phoneme_timestamps = self.phoneme_timestamps_with_text(audio_path, text, None);
        AlignmentRecord {
            word_timestamps,
            phoneme_timestamps,
            audio_path: audio_path.display().to_string(),
            text: text.to_string(),
        }
    }
}

fn duration_seconds(samples: &[f32], sample_rate_hz: u32) -> f64 {
    if sample_rate_hz == 0 {
        return 0.0;
    }
    samples.len() as f64 / f64::from(sample_rate_hz)
}
