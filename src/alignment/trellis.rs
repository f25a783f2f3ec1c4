/// Frame range assigned to one alignment target, with a bounded confidence
/// taken from the emission at the span's midpoint frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpan {
    pub start_frame: usize,
    pub end_frame: usize,
    pub score: f64,
}

/// Blank-interleaved CTC state lattice over a target sequence: state `2i+1`
/// emits `targets[i]`, every even state emits the blank. Never materialized;
/// states are addressed by index and parity.
struct Lattice<'a> {
    targets: &'a [usize],
    blank_id: usize,
}

impl Lattice<'_> {
    fn len(&self) -> usize {
        2 * self.targets.len() + 1
    }

    fn symbol(&self, s: usize) -> usize {
        if s % 2 == 0 {
            self.blank_id
        } else {
            self.targets[s / 2]
        }
    }

    /// Whether a two-state skip may land on `s`. Only token states accept a
    /// skip, and only when the token before them differs; equal adjacent
    /// tokens must pass through the separating blank.
    fn skip_allowed(&self, s: usize) -> bool {
        s % 2 == 1 && s >= 3 && self.targets[s / 2] != self.targets[s / 2 - 1]
    }
}

/// CTC Viterbi forced alignment.
///
/// Targets are raw vocabulary indices (no blanks); blanks are interleaved
/// internally. The maximum-likelihood monotonic path visits every target in
/// order, may stall on a target or a blank, and never skips a target. A
/// target's span ends where the next target's first frame begins; the last
/// target runs to the final frame.
///
/// Returns one span per target, or an empty vector when no feasible path
/// exists (too few frames for the target sequence).
pub fn forced_align_trellis(
    log_probs: &[Vec<f32>],
    targets: &[usize],
    blank_id: usize,
) -> Vec<FrameSpan> {
    let t_len = log_probs.len();
    if t_len == 0 || targets.is_empty() {
        return Vec::new();
    }

    // Adjacent identical targets force a blank frame between them.
    let dup_pairs = targets.windows(2).filter(|w| w[0] == w[1]).count();
    if t_len < targets.len() + dup_pairs {
        return Vec::new();
    }

    let lattice = Lattice { targets, blank_id };
    let frame_states = best_frame_states(log_probs, &lattice);

    let mut start_frames: Vec<Option<usize>> = vec![None; targets.len()];
    for (frame, &s) in frame_states.iter().enumerate() {
        if s % 2 == 1 {
            let token_idx = s / 2;
            if start_frames[token_idx].is_none() {
                start_frames[token_idx] = Some(frame);
            }
        }
    }
    if start_frames.iter().any(Option::is_none) {
        // Infeasible lattice walked through -inf states; treat as failure.
        return Vec::new();
    }

    let mut spans = Vec::with_capacity(targets.len());
    for (i, start) in start_frames.iter().enumerate() {
        let start_frame = start.unwrap_or(0);
        let end_frame = if i + 1 < targets.len() {
            start_frames[i + 1].unwrap_or(t_len)
        } else {
            t_len
        };
        let end_frame = end_frame.max(start_frame + 1);
        let mid_frame = ((start_frame + end_frame) / 2).min(t_len - 1);
        let score = f64::from(log_probs[mid_frame][targets[i]])
            .exp()
            .clamp(0.0, 1.0);
        spans.push(FrameSpan {
            start_frame,
            end_frame,
            score,
        });
    }
    spans
}

/// Viterbi over the lattice, banded to states that are reachable from the
/// start and can still reach an accepting end state. Returns the state the
/// optimal path occupies at each frame.
fn best_frame_states(log_probs: &[Vec<f32>], lattice: &Lattice) -> Vec<usize> {
    let t_len = log_probs.len();
    let s_len = lattice.len();

    let mut prev = vec![f32::NEG_INFINITY; s_len];
    let mut curr = vec![f32::NEG_INFINITY; s_len];
    // Per-cell back step: how many states the path moved entering this frame.
    let mut steps = vec![0u8; t_len * s_len];

    prev[0] = log_probs[0][lattice.symbol(0)];
    if s_len > 1 {
        prev[1] = log_probs[0][lattice.symbol(1)];
    }

    for t in 1..t_len {
        let row = &log_probs[t];
        let frames_left = t_len - 1 - t;
        let lo = s_len.saturating_sub(2 + 2 * frames_left);
        let hi = (2 * t + 1).min(s_len - 1);

        curr.fill(f32::NEG_INFINITY);
        for s in lo..=hi {
            let stay = prev[s];
            let advance = if s >= 1 { prev[s - 1] } else { f32::NEG_INFINITY };
            let skip = if lattice.skip_allowed(s) {
                prev[s - 2]
            } else {
                f32::NEG_INFINITY
            };
            // Ties keep the smaller step, so runs begin as early as possible.
            let (best, step) = if skip > stay && skip > advance {
                (skip, 2u8)
            } else if advance > stay {
                (advance, 1)
            } else {
                (stay, 0)
            };
            curr[s] = best + row[lattice.symbol(s)];
            steps[t * s_len + s] = step;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    // Accepting states: the final blank or the last token state.
    let mut s = s_len - 1;
    if s_len >= 2 && prev[s_len - 2] > prev[s_len - 1] {
        s = s_len - 2;
    }

    let mut frame_states = vec![0usize; t_len];
    frame_states[t_len - 1] = s;
    for t in (1..t_len).rev() {
        s -= usize::from(steps[t * s_len + s]);
        frame_states[t - 1] = s;
    }
    frame_states
}
