use std::sync::{Arc, Mutex, OnceLock};

use crate::error::AlignmentError;
use crate::pipeline::traits::EmissionProvider;

/// Initialize-once shared handle to the acoustic model.
///
/// Loading is expensive, so the provider is created at most once per handle
/// and shared read-only afterwards. Concurrent callers race only on the
/// first load: one wins the init lock and loads, the rest observe the stored
/// provider. A failed load leaves the slot empty, so a later call may retry.
pub struct ModelHandle {
    slot: OnceLock<Arc<dyn EmissionProvider>>,
    init: Mutex<()>,
}

impl ModelHandle {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<Arc<dyn EmissionProvider>> {
        self.slot.get().cloned()
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<dyn EmissionProvider>, AlignmentError>
    where
        F: FnOnce() -> Result<Arc<dyn EmissionProvider>, AlignmentError>,
    {
        if let Some(provider) = self.slot.get() {
            return Ok(provider.clone());
        }

        let _guard = self
            .init
            .lock()
            .map_err(|_| AlignmentError::runtime("model init", "poisoned init lock"))?;
        if let Some(provider) = self.slot.get() {
            return Ok(provider.clone());
        }

        tracing::info!("loading acoustic model");
        let provider = load()?;
        let _ = self.slot.set(provider.clone());
        Ok(provider)
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::{EmissionMatrix, Vocabulary};

    struct StubProvider {
        vocab: Vocabulary,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                vocab: Vocabulary::new(HashMap::new(), 0),
            }
        }
    }

    impl EmissionProvider for StubProvider {
        fn emissions(&self, _samples: &[f32]) -> Result<EmissionMatrix, AlignmentError> {
            EmissionMatrix::new(vec![vec![0.0f32; 2]; 1])
        }

        fn vocabulary(&self) -> &Vocabulary {
            &self.vocab
        }

        fn supports_direct_alignment(&self) -> bool {
            true
        }
    }

    #[test]
    fn loads_exactly_once() {
        let handle = ModelHandle::new();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let provider = handle
                .get_or_load(|| {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(StubProvider::new()) as Arc<dyn EmissionProvider>)
                })
                .expect("load succeeds");
            assert!(provider.supports_direct_alignment());
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(handle.get().is_some());
    }

    #[test]
    fn failed_load_leaves_slot_empty_for_retry() {
        let handle = ModelHandle::new();
        let result = handle.get_or_load(|| {
            Err(AlignmentError::model_unavailable("checkpoint missing"))
        });
        assert!(result.is_err());
        assert!(handle.get().is_none());

        let retried = handle
            .get_or_load(|| Ok(Arc::new(StubProvider::new()) as Arc<dyn EmissionProvider>));
        assert!(retried.is_ok());
    }

    #[test]
    fn shared_across_threads() {
        let handle = Arc::new(ModelHandle::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                let loads = Arc::clone(&loads);
                std::thread::spawn(move || {
                    handle
                        .get_or_load(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(Arc::new(StubProvider::new()) as Arc<dyn EmissionProvider>)
                        })
                        .expect("load succeeds");
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread completes");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
