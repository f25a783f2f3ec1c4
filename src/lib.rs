pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use pipeline::builder::PronunciationAlignerBuilder;
pub use pipeline::defaults::{GreedyCtcAligner, TrellisAligner};
pub use pipeline::handle::ModelHandle;
pub use pipeline::runtime::PronunciationAligner;
pub use pipeline::traits::{AudioLoader, EmissionProvider, GraphemeToPhoneme, TokenAligner};
pub use types::{
    AlignedToken, AlignmentRecord, EmissionMatrix, PhonemePosition, PhonemeTimestamp,
    TokenAlignment, Vocabulary, WordTimestamp,
};
