use crate::alignment::weights::weight_of;
use crate::types::{round_ms, PhonemePosition, PhonemeTimestamp, WordTimestamp};

/// Confidence for phonemes placed by proportional word assignment rather
/// than per-word matching.
const DISTRIBUTED_CONFIDENCE: f64 = 0.7;
/// Neutral confidence when no word timing informs the spread at all.
const SPREAD_CONFIDENCE: f64 = 0.5;

/// Lay phonemes out inside matched word boundaries.
///
/// `word_phonemes` pairs each word with its phoneme sequence (G2P output or
/// stored reference data); it is zipped with `word_timestamps` up to the
/// shorter length. Within a word, each phoneme receives
/// `weight / total_weight` of the word's duration, sequentially from the
/// word's start.
pub fn distribute_within_words(
    word_phonemes: &[(String, Vec<String>)],
    word_timestamps: &[WordTimestamp],
) -> Vec<PhonemeTimestamp> {
    let mut phoneme_timestamps = Vec::new();
    let mut phoneme_index = 0usize;

    for (word_ts, (word, phonemes)) in word_timestamps.iter().zip(word_phonemes) {
        if phonemes.is_empty() {
            continue;
        }

        let word_duration = word_ts.end - word_ts.start;
        let total_weight: f64 = phonemes.iter().map(|p| weight_of(p)).sum();
        let mut current_time = word_ts.start;

        for (j, phoneme) in phonemes.iter().enumerate() {
            let duration = (weight_of(phoneme) / total_weight) * word_duration;
            phoneme_timestamps.push(PhonemeTimestamp {
                phoneme: phoneme.clone(),
                start: round_ms(current_time),
                end: round_ms(current_time + duration),
                index: phoneme_index,
                word: Some(word.clone()),
                position: PhonemePosition::from_index(j, phonemes.len()),
                confidence: word_ts.confidence,
            });
            current_time += duration;
            phoneme_index += 1;
        }
    }

    tracing::debug!(
        phoneme_count = phoneme_timestamps.len(),
        "distributed phonemes within word bounds"
    );
    phoneme_timestamps
}

/// Spread one flat phoneme sequence across the whole utterance span.
///
/// Used when phonemes arrive as a single precomputed sequence not grouped
/// per word. The owning word is approximated by proportional index into the
/// whitespace-split word list, so confidence is fixed below
/// alignment-derived values.
pub fn distribute_across_utterance(
    phonemes: &[String],
    word_timestamps: &[WordTimestamp],
    text: &str,
) -> Vec<PhonemeTimestamp> {
    let (Some(first), Some(last)) = (word_timestamps.first(), word_timestamps.last()) else {
        return Vec::new();
    };
    let total_start = first.start;
    let total_duration = last.end - total_start;
    if total_duration <= 0.0 || phonemes.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let total_weight: f64 = phonemes.iter().map(|p| weight_of(p)).sum();

    let mut phoneme_timestamps = Vec::with_capacity(phonemes.len());
    let mut current_time = total_start;

    for (i, phoneme) in phonemes.iter().enumerate() {
        let duration = (weight_of(phoneme) / total_weight) * total_duration;
        let word = if words.is_empty() {
            None
        } else {
            let word_idx = (i * words.len() / phonemes.len()).min(words.len() - 1);
            Some(words[word_idx].to_string())
        };

        phoneme_timestamps.push(PhonemeTimestamp {
            phoneme: phoneme.clone(),
            start: round_ms(current_time),
            end: round_ms(current_time + duration),
            index: i,
            word,
            position: PhonemePosition::from_index(i, phonemes.len()),
            confidence: DISTRIBUTED_CONFIDENCE,
        });
        current_time += duration;
    }

    tracing::debug!(
        phoneme_count = phonemes.len(),
        word_count = word_timestamps.len(),
        "distributed precomputed phonemes across utterance"
    );
    phoneme_timestamps
}

/// Weight-proportional spread over the full recording, ignoring any word
/// grouping. Terminal phoneme fallback: cannot fail given a positive
/// duration and a non-empty sequence.
pub fn weighted_phoneme_spread(phonemes: &[String], audio_duration: f64) -> Vec<PhonemeTimestamp> {
    if phonemes.is_empty() || audio_duration <= 0.0 {
        return Vec::new();
    }

    let total_weight: f64 = phonemes.iter().map(|p| weight_of(p)).sum();
    let mut phoneme_timestamps = Vec::with_capacity(phonemes.len());
    let mut current_time = 0.0f64;

    for (i, phoneme) in phonemes.iter().enumerate() {
        let duration = (weight_of(phoneme) / total_weight) * audio_duration;
        phoneme_timestamps.push(PhonemeTimestamp {
            phoneme: phoneme.clone(),
            start: round_ms(current_time),
            end: round_ms(current_time + duration),
            index: i,
            word: None,
            position: PhonemePosition::from_index(i, phonemes.len()),
            confidence: SPREAD_CONFIDENCE,
        });
        current_time += duration;
    }

    phoneme_timestamps
}
