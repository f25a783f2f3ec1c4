use crate::alignment::repair::repair_spans;
use crate::types::{round_ms, AlignedToken, WordTimestamp};

/// Confidence used when a word matched no tokens at all.
const UNMATCHED_WORD_CONFIDENCE: f64 = 0.5;

/// Group character-level aligned tokens into word boundaries.
///
/// The transcript is split on whitespace; each word consumes as many
/// subsequent non-separator tokens as it has characters. If the token stream
/// runs out mid-word, that word keeps whatever it matched and extraction
/// stops; trailing words get no timestamps. The result is passed through the
/// repair pass before being returned.
pub fn group_tokens_into_words(text: &str, tokens: &[AlignedToken]) -> Vec<WordTimestamp> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let words: Vec<String> = text
        .to_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut word_timestamps = Vec::with_capacity(words.len());
    let mut token_idx = 0usize;

    for word in &words {
        // Separator and blank tokens carry no lexical content.
        while token_idx < tokens.len() && is_separator(&tokens[token_idx].token) {
            token_idx += 1;
        }
        if token_idx >= tokens.len() {
            break;
        }

        let word_start = tokens[token_idx].start;
        let mut word_end = word_start;
        let mut score_sum = 0.0f64;
        let mut matched = 0usize;

        for _ in word.chars() {
            if token_idx >= tokens.len() {
                break;
            }
            let token = &tokens[token_idx];
            word_end = token.end;
            score_sum += token.score;
            matched += 1;
            token_idx += 1;
        }

        let confidence = if matched > 0 {
            round_ms(score_sum / matched as f64)
        } else {
            UNMATCHED_WORD_CONFIDENCE
        };

        word_timestamps.push(WordTimestamp {
            word: word.clone(),
            start: round_ms(word_start),
            end: round_ms(word_end),
            confidence,
        });
    }

    repair_spans(&mut word_timestamps);
    tracing::debug!(word_count = word_timestamps.len(), "grouped aligned tokens into words");
    word_timestamps
}

fn is_separator(token: &str) -> bool {
    matches!(token, "|" | " " | "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(sym: &str, start: f64, end: f64, score: f64) -> AlignedToken {
        AlignedToken {
            token: sym.to_string(),
            start,
            end,
            score,
        }
    }

    #[test]
    fn words_aggregate_their_tokens() {
        let tokens = vec![
            token("s", 0.0, 0.1, 0.9),
            token("h", 0.1, 0.2, 0.8),
            token("e", 0.2, 0.3, 0.7),
            token("s", 0.35, 0.45, 0.6),
            token("a", 0.45, 0.55, 0.6),
            token("w", 0.55, 0.7, 0.6),
        ];
        let words = group_tokens_into_words("she saw", &tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "SHE");
        assert_eq!(words[0].start, 0.0);
        assert_eq!(words[0].end, 0.3);
        assert!((words[0].confidence - 0.8).abs() < 1e-9);
        assert_eq!(words[1].word, "SAW");
        assert_eq!(words[1].start, 0.35);
        assert_eq!(words[1].end, 0.7);
    }

    #[test]
    fn separator_tokens_are_skipped() {
        let tokens = vec![
            token("a", 0.0, 0.2, 0.9),
            token("|", 0.2, 0.25, 0.1),
            token("b", 0.25, 0.5, 0.9),
        ];
        let words = group_tokens_into_words("a b", &tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].start, 0.25);
    }

    #[test]
    fn exhausted_tokens_stop_extraction() {
        let tokens = vec![token("s", 0.0, 0.1, 0.9), token("h", 0.1, 0.2, 0.9)];
        let words = group_tokens_into_words("she saw", &tokens);
        // "she" keeps its two matched characters; "saw" gets nothing.
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "SHE");
        assert_eq!(words[0].end, 0.2);
    }

    #[test]
    fn output_is_monotonic_after_repair() {
        let tokens = vec![
            token("a", 0.0, 0.4, 0.9),
            token("b", 0.3, 0.5, 0.9), // overlaps previous word
        ];
        let words = group_tokens_into_words("a b", &tokens);
        assert_eq!(words.len(), 2);
        assert!(words[1].start >= words[0].end);
    }

    #[test]
    fn no_tokens_means_no_words() {
        assert!(group_tokens_into_words("she saw", &[]).is_empty());
    }
}
