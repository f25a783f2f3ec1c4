use crate::alignment::greedy::{extract_segments, match_segments_to_transcript};
use crate::alignment::tokenization::build_target_sequence;
use crate::alignment::trellis::forced_align_trellis;
use crate::error::AlignmentError;
use crate::pipeline::traits::TokenAligner;
use crate::types::{round_ms, AlignedToken, EmissionMatrix, TokenAlignment, Vocabulary};

/// Forced alignment through the CTC Viterbi trellis. Requires a vocabulary
/// that maps transcript symbols directly.
pub struct TrellisAligner;

impl TokenAligner for TrellisAligner {
    fn aligned_tokens(
        &self,
        emissions: &EmissionMatrix,
        vocab: &Vocabulary,
        transcript: &str,
        audio_duration: f64,
    ) -> Result<TokenAlignment, AlignmentError> {
        let targets = build_target_sequence(transcript, vocab);
        if targets.is_empty() {
            return Err(AlignmentError::invalid_input(
                "no valid alignment targets in transcript",
            ));
        }
        // The blank indexes emission columns too, so bound-check it as well.
        let max_target = targets
            .ids
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(vocab.blank_id());
        if max_target >= emissions.vocab_size() {
            return Err(AlignmentError::invalid_input(format!(
                "target index {max_target} exceeds emission vocabulary size {}",
                emissions.vocab_size()
            )));
        }

        let spans = forced_align_trellis(emissions.rows(), &targets.ids, vocab.blank_id());
        if spans.is_empty() {
            return Err(AlignmentError::runtime(
                "forced alignment",
                format!(
                    "no feasible path for {} targets over {} frames",
                    targets.len(),
                    emissions.frames()
                ),
            ));
        }

        let frame_duration = audio_duration / emissions.frames() as f64;
        let tokens = spans
            .iter()
            .zip(&targets.symbols)
            .map(|(span, &symbol)| AlignedToken {
                token: symbol.to_string(),
                start: round_ms(span.start_frame as f64 * frame_duration),
                end: round_ms(span.end_frame as f64 * frame_duration),
                score: span.score,
            })
            .collect();
        Ok(TokenAlignment::new(tokens))
    }
}

/// Greedy decode-then-match alignment for models without a direct-alignment
/// vocabulary.
pub struct GreedyCtcAligner;

impl TokenAligner for GreedyCtcAligner {
    fn aligned_tokens(
        &self,
        emissions: &EmissionMatrix,
        vocab: &Vocabulary,
        transcript: &str,
        audio_duration: f64,
    ) -> Result<TokenAlignment, AlignmentError> {
        let segments = extract_segments(emissions.rows(), vocab);
        let frame_duration = audio_duration / emissions.frames() as f64;
        let transcript = transcript.to_uppercase();
        let tokens = match_segments_to_transcript(&segments, transcript.trim(), frame_duration);
        Ok(TokenAlignment::new(tokens))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vocab() -> Vocabulary {
        let mut m = HashMap::new();
        m.insert('a', 1);
        m.insert('b', 2);
        Vocabulary::new(m, 0)
    }

    fn emissions(favored: &[usize], vocab_size: usize) -> EmissionMatrix {
        let rows = favored
            .iter()
            .map(|&id| {
                let mut row = vec![-10.0f32; vocab_size];
                row[id] = -0.05;
                row
            })
            .collect();
        EmissionMatrix::new(rows).expect("rectangular emissions")
    }

    #[test]
    fn trellis_tokens_convert_frames_to_seconds() {
        let em = emissions(&[1, 1, 2, 2], 3);
        let alignment = TrellisAligner
            .aligned_tokens(&em, &vocab(), "ab", 1.0)
            .expect("alignment succeeds");
        let tokens = &alignment.tokens;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "a");
        assert_eq!(tokens[0].start, 0.0);
        assert_eq!(tokens[0].end, 0.5);
        assert_eq!(tokens[1].start, 0.5);
        assert_eq!(tokens[1].end, 1.0);
        let mean = (tokens[0].score + tokens[1].score) / 2.0;
        assert!((alignment.score - mean).abs() < 1e-3);
        assert!(alignment.score > 0.0);
    }

    #[test]
    fn trellis_rejects_unresolvable_transcript() {
        let em = emissions(&[1, 1], 3);
        let err = TrellisAligner
            .aligned_tokens(&em, &vocab(), "xyz 123", 1.0)
            .unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }

    #[test]
    fn trellis_rejects_targets_beyond_vocab_size() {
        // Emission matrix narrower than the resolved target index.
        let em = emissions(&[1, 1], 2);
        let err = TrellisAligner
            .aligned_tokens(&em, &vocab(), "b", 1.0)
            .unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }

    #[test]
    fn trellis_reports_infeasible_paths() {
        let em = emissions(&[1], 3);
        let err = TrellisAligner
            .aligned_tokens(&em, &vocab(), "ab", 1.0)
            .unwrap_err();
        assert!(matches!(err, AlignmentError::Runtime { .. }));
    }

    #[test]
    fn greedy_aligner_matches_decoded_segments() {
        let em = emissions(&[1, 1, 0, 2, 2], 3);
        let alignment = GreedyCtcAligner
            .aligned_tokens(&em, &vocab(), "ab", 1.0)
            .expect("greedy path is infallible");
        let tokens = &alignment.tokens;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "A");
        assert_eq!(tokens[0].start, 0.0);
        assert!(tokens[1].start > tokens[0].start);
        assert!(alignment.score > 0.0 && alignment.score <= 1.0);
    }

    #[test]
    fn greedy_aligner_returns_empty_for_silent_decode() {
        let em = emissions(&[0, 0, 0], 3);
        let alignment = GreedyCtcAligner
            .aligned_tokens(&em, &vocab(), "ab", 1.0)
            .expect("greedy path is infallible");
        assert!(alignment.is_empty());
        assert_eq!(alignment.score, 0.0);
    }
}
