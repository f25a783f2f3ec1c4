pub mod fallback;
pub(crate) mod greedy;
pub mod phonemes;
pub mod repair;
pub mod tokenization;
pub mod trellis;
pub mod weights;
pub mod words;
