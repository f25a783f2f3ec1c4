use crate::types::{round_ms, AlignedToken, WordTimestamp};

/// Neutral confidence for evenly spread characters.
pub const UNIFORM_TOKEN_CONFIDENCE: f64 = 0.5;
/// Confidence for evenly spread words; lower than the character-level
/// fallback since the granularity is coarser.
pub const UNIFORM_WORD_CONFIDENCE: f64 = 0.3;
/// Assumed recording length when even the audio duration is unknown.
pub const DEFAULT_FALLBACK_DURATION_S: f64 = 2.0;

/// Terminal fallback: divide the recording evenly across the transcript's
/// alphabetic characters. Cannot fail given a positive duration and at least
/// one such character.
///
/// Preprocessing matches the direct-alignment path: lowercase, spaces and
/// punctuation removed.
pub fn uniform_token_spread(transcript: &str, audio_duration: f64) -> Vec<AlignedToken> {
    let chars: Vec<char> = transcript
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if chars.is_empty() || audio_duration <= 0.0 {
        return Vec::new();
    }

    tracing::warn!(
        char_count = chars.len(),
        "using uniform fallback alignment"
    );

    let token_duration = audio_duration / chars.len() as f64;
    chars
        .into_iter()
        .enumerate()
        .map(|(i, c)| AlignedToken {
            token: c.to_string(),
            start: round_ms(i as f64 * token_duration),
            end: round_ms((i + 1) as f64 * token_duration),
            score: UNIFORM_TOKEN_CONFIDENCE,
        })
        .collect()
}

/// Divide the recording evenly across whitespace-split words. Used when
/// character-level alignment is entirely unavailable.
pub fn uniform_word_spread(text: &str, audio_duration: f64) -> Vec<WordTimestamp> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || audio_duration <= 0.0 {
        return Vec::new();
    }

    tracing::warn!(word_count = words.len(), "using uniform word estimation");

    let word_duration = audio_duration / words.len() as f64;
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| WordTimestamp {
            word: word.to_uppercase(),
            start: round_ms(i as f64 * word_duration),
            end: round_ms((i + 1) as f64 * word_duration),
            confidence: UNIFORM_WORD_CONFIDENCE,
        })
        .collect()
}
