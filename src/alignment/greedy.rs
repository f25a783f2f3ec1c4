use crate::types::{round_ms, AlignedToken, Vocabulary};

/// Forward-scanning window when matching expected transcript symbols
/// against decoded segments. Known approximation: repeated-symbol clusters
/// can misalign within the window.
pub const MATCH_LOOKAHEAD_SEGMENTS: usize = 5;

/// Neutral confidence for interpolated (unmatched) symbols.
const INTERPOLATED_SCORE: f64 = 0.5;

/// One run of identical greedy-decoded symbols.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharSegment {
    pub symbol: char,
    pub start_frame: usize,
    pub end_frame: usize,
    /// Emission log-probability at the run's midpoint frame.
    pub log_prob: f64,
}

/// Greedy per-frame best-symbol decode collapsed into contiguous segments
/// (standard CTC collapsing). Blank runs and runs decoding to whitespace or
/// the word separator are discarded.
pub(crate) fn extract_segments(log_probs: &[Vec<f32>], vocab: &Vocabulary) -> Vec<CharSegment> {
    let num_frames = log_probs.len();
    let mut segments = Vec::new();
    let mut current_id: Option<usize> = None;
    let mut start_frame = 0usize;

    let close_run = |id: usize, start: usize, end: usize, segments: &mut Vec<CharSegment>| {
        if id == vocab.blank_id() {
            return;
        }
        let Some(symbol) = vocab.symbol(id) else {
            return;
        };
        if symbol.is_whitespace() || symbol == '|' {
            return;
        }
        let mid_frame = (start + end) / 2;
        let log_prob = f64::from(log_probs[mid_frame.min(num_frames - 1)][id]);
        segments.push(CharSegment {
            symbol,
            start_frame: start,
            end_frame: end,
            log_prob,
        });
    };

    for (frame_idx, row) in log_probs.iter().enumerate() {
        let best_id = argmax(row);
        if current_id != Some(best_id) {
            if let Some(id) = current_id {
                close_run(id, start_frame, frame_idx, &mut segments);
            }
            current_id = Some(best_id);
            start_frame = frame_idx;
        }
    }
    if let Some(id) = current_id {
        close_run(id, start_frame, num_frames, &mut segments);
    }

    segments
}

fn argmax(row: &[f32]) -> usize {
    let mut best_id = 0usize;
    let mut best = f32::NEG_INFINITY;
    for (id, &lp) in row.iter().enumerate() {
        if lp > best {
            best = lp;
            best_id = id;
        }
    }
    best_id
}

/// Match expected transcript symbols against decoded segments.
///
/// Two tiers: a case-insensitive greedy match within a
/// [`MATCH_LOOKAHEAD_SEGMENTS`]-wide forward window, and positional
/// interpolation for symbols with no match. The output always has one token
/// per expected symbol, so decode noise never produces a count mismatch.
pub(crate) fn match_segments_to_transcript(
    segments: &[CharSegment],
    transcript: &str,
    frame_duration: f64,
) -> Vec<AlignedToken> {
    let expected: Vec<char> = transcript.chars().filter(|c| !c.is_whitespace()).collect();
    if segments.is_empty() || expected.is_empty() {
        return Vec::new();
    }

    let total_duration = segments[segments.len() - 1].end_frame as f64 * frame_duration;
    let mut tokens = Vec::with_capacity(expected.len());
    let mut seg_idx = 0usize;
    let mut interpolated = 0usize;

    for (char_idx, &expected_char) in expected.iter().enumerate() {
        let search_end = (seg_idx + MATCH_LOOKAHEAD_SEGMENTS).min(segments.len());
        let matched = segments[seg_idx..search_end]
            .iter()
            .position(|seg| seg.symbol.eq_ignore_ascii_case(&expected_char))
            .map(|offset| seg_idx + offset);

        match matched {
            Some(i) => {
                let seg = &segments[i];
                let score = (0.5 + seg.log_prob).clamp(0.0, 1.0);
                tokens.push(AlignedToken {
                    token: expected_char.to_string(),
                    start: round_ms(seg.start_frame as f64 * frame_duration),
                    end: round_ms(seg.end_frame as f64 * frame_duration),
                    score,
                });
                seg_idx = i + 1;
            }
            None => {
                let progress = char_idx as f64 / expected.len() as f64;
                let char_duration = total_duration / expected.len() as f64;
                tokens.push(AlignedToken {
                    token: expected_char.to_string(),
                    start: round_ms(progress * total_duration),
                    end: round_ms(progress * total_duration + char_duration),
                    score: INTERPOLATED_SCORE,
                });
                interpolated += 1;
            }
        }
    }

    if interpolated > 0 {
        tracing::debug!(
            interpolated,
            total = expected.len(),
            "greedy alignment interpolated unmatched symbols"
        );
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vocab() -> Vocabulary {
        let mut m = HashMap::new();
        m.insert('a', 1);
        m.insert('b', 2);
        m.insert('|', 3);
        Vocabulary::new(m, 0)
    }

    fn emissions(favored: &[usize]) -> Vec<Vec<f32>> {
        favored
            .iter()
            .map(|&id| {
                let mut row = vec![-10.0f32; 4];
                row[id] = -0.1;
                row
            })
            .collect()
    }

    #[test]
    fn consecutive_identical_symbols_collapse() {
        let log_probs = emissions(&[1, 1, 0, 2, 2]);
        let segments = extract_segments(&log_probs, &vocab());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].symbol, 'a');
        assert_eq!(segments[0].start_frame, 0);
        assert_eq!(segments[0].end_frame, 2);
        assert_eq!(segments[1].symbol, 'b');
        assert_eq!(segments[1].start_frame, 3);
        assert_eq!(segments[1].end_frame, 5);
    }

    #[test]
    fn blank_and_separator_runs_are_discarded() {
        let log_probs = emissions(&[0, 3, 3, 0]);
        assert!(extract_segments(&log_probs, &vocab()).is_empty());
    }

    #[test]
    fn matched_symbols_use_segment_spans() {
        let log_probs = emissions(&[1, 1, 0, 2, 2]);
        let segments = extract_segments(&log_probs, &vocab());
        let tokens = match_segments_to_transcript(&segments, "AB", 0.02);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "A");
        assert_eq!(tokens[0].start, 0.0);
        assert_eq!(tokens[0].end, 0.04);
        assert_eq!(tokens[1].start, 0.06);
        assert_eq!(tokens[1].end, 0.1);
        // clamp(0.5 + (-0.1)) = 0.4
        assert!((tokens[0].score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn unmatched_symbols_are_interpolated() {
        let log_probs = emissions(&[1, 1, 0, 2, 2]);
        let segments = extract_segments(&log_probs, &vocab());
        // 'x' never decodes; it gets a positional span with neutral score.
        let tokens = match_segments_to_transcript(&segments, "axb", 0.02);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].token, "x");
        assert!((tokens[1].score - 0.5).abs() < 1e-9);
        let width = tokens[1].end - tokens[1].start;
        // total duration 0.1 over three expected symbols
        assert!((width - 0.1 / 3.0).abs() < 2e-3);
    }

    #[test]
    fn lookahead_window_bounds_the_search() {
        // Six 'a' runs separated by blanks, then one 'b'; 'b' sits past the
        // five-segment window from the start so the first expected 'b'
        // interpolates instead of jumping ahead.
        let log_probs = emissions(&[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 2]);
        let segments = extract_segments(&log_probs, &vocab());
        assert_eq!(segments.len(), 7);
        let tokens = match_segments_to_transcript(&segments, "ba", 0.02);
        assert_eq!(tokens.len(), 2);
        assert!((tokens[0].score - 0.5).abs() < 1e-9);
        // 'a' still matches inside the window.
        assert!((tokens[1].score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_produce_no_tokens() {
        assert!(match_segments_to_transcript(&[], "ab", 0.02).is_empty());
        let log_probs = emissions(&[1]);
        let segments = extract_segments(&log_probs, &vocab());
        assert!(match_segments_to_transcript(&segments, "  ", 0.02).is_empty());
    }
}
