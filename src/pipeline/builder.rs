use std::sync::Arc;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{GreedyCtcAligner, TrellisAligner};
use crate::pipeline::runtime::{PronunciationAligner, PronunciationAlignerParts};
use crate::pipeline::traits::{AudioLoader, EmissionProvider, GraphemeToPhoneme, TokenAligner};

pub struct PronunciationAlignerBuilder {
    config: AlignerConfig,
    provider: Option<Arc<dyn EmissionProvider>>,
    audio_loader: Option<Box<dyn AudioLoader>>,
    g2p: Option<Box<dyn GraphemeToPhoneme>>,
    token_aligner: Option<Box<dyn TokenAligner>>,
}

impl PronunciationAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            provider: None,
            audio_loader: None,
            g2p: None,
            token_aligner: None,
        }
    }

    /// The shared acoustic model handle. Required.
    pub fn with_provider(mut self, provider: Arc<dyn EmissionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Audio decoding boundary. Required.
    pub fn with_audio_loader(mut self, audio_loader: Box<dyn AudioLoader>) -> Self {
        self.audio_loader = Some(audio_loader);
        self
    }

    pub fn with_g2p(mut self, g2p: Box<dyn GraphemeToPhoneme>) -> Self {
        self.g2p = Some(g2p);
        self
    }

    /// Override the alignment strategy. By default it is selected from the
    /// provider's capability flag at build time.
    pub fn with_token_aligner(mut self, token_aligner: Box<dyn TokenAligner>) -> Self {
        self.token_aligner = Some(token_aligner);
        self
    }

    pub fn build(self) -> Result<PronunciationAligner, AlignmentError> {
        let provider = self.provider.ok_or_else(|| {
            AlignmentError::model_unavailable("no emission provider configured")
        })?;
        let audio_loader = self
            .audio_loader
            .ok_or_else(|| AlignmentError::invalid_input("no audio loader configured"))?;

        let token_aligner = match self.token_aligner {
            Some(token_aligner) => token_aligner,
            None if provider.supports_direct_alignment() => {
                tracing::info!("using trellis forced-alignment strategy");
                Box::new(TrellisAligner)
            }
            None => {
                tracing::info!("vocabulary lacks direct alignment support, using greedy strategy");
                Box::new(GreedyCtcAligner)
            }
        };

        let expected_sample_rate_hz = if self.config.expected_sample_rate_hz == 0 {
            AlignerConfig::DEFAULT_SAMPLE_RATE_HZ
        } else {
            self.config.expected_sample_rate_hz
        };

        Ok(PronunciationAligner::from_parts(PronunciationAlignerParts {
            provider,
            audio_loader,
            g2p: self.g2p,
            token_aligner,
            expected_sample_rate_hz,
        }))
    }
}
