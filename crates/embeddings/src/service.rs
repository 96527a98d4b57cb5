//! Lazily-initialized embedding service shared by writers and searchers.

use std::sync::{Arc, OnceLock};

use agentmem_core::{EMBEDDING_INPUT_MAX_CHARS, MemoryConfig, l2_normalize, truncate_chars};

use crate::provider::{EmbeddingProvider, ProviderKind};

type SharedProvider = Arc<dyn EmbeddingProvider>;

/// Resolves at most one provider for the life of the process.
///
/// The preference list is walked on first use; the first provider that
/// loads is kept. If none loads, the service stays unavailable and every
/// `embed` returns `None`. Concurrent first callers block on the same
/// `OnceLock` initialization instead of loading the model twice.
pub struct EmbeddingService {
    preferences: Vec<ProviderKind>,
    provider: OnceLock<Option<SharedProvider>>,
}

impl std::fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("preferences", &self.preferences)
            .field("provider", &self.provider.get().map(|p| p.as_ref().map(|p| p.name().to_owned())))
            .finish()
    }
}

impl EmbeddingService {
    #[must_use]
    pub fn new(preferences: Vec<ProviderKind>) -> Self {
        Self { preferences, provider: OnceLock::new() }
    }

    /// Build from provider names; unknown names are logged and dropped.
    #[must_use]
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let preferences = names
            .iter()
            .filter_map(|name| match name.as_ref().parse::<ProviderKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring embedding provider");
                    None
                },
            })
            .collect();
        Self::new(preferences)
    }

    #[must_use]
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::from_names(config.embedding_providers.as_slice())
    }

    /// A service that never produces vectors.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { preferences: Vec::new(), provider: OnceLock::from(None) }
    }

    /// A service bound to an already-constructed provider.
    #[must_use]
    pub fn with_provider(provider: SharedProvider) -> Self {
        Self { preferences: Vec::new(), provider: OnceLock::from(Some(provider)) }
    }

    fn provider(&self) -> Option<&SharedProvider> {
        self.provider.get_or_init(|| self.resolve()).as_ref()
    }

    fn resolve(&self) -> Option<SharedProvider> {
        for kind in &self.preferences {
            match kind.load() {
                Ok(provider) => {
                    tracing::info!(
                        provider = provider.name(),
                        dimensions = provider.dimensions(),
                        "embedding provider selected"
                    );
                    return Some(provider);
                },
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "embedding provider failed to load");
                },
            }
        }
        if !self.preferences.is_empty() {
            tracing::warn!("no embedding provider could be loaded, semantic search disabled");
        }
        None
    }

    /// Forces provider resolution. Loading a model can be slow.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider().is_some()
    }

    #[must_use]
    pub fn provider_name(&self) -> Option<String> {
        self.provider().map(|p| p.name().to_owned())
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<usize> {
        self.provider().map(|p| p.dimensions())
    }

    /// Resolve the provider on the blocking thread pool. Async callers await
    /// this before the synchronous accessors so a cold model load never runs
    /// on a runtime worker.
    pub async fn ensure_ready(self: &Arc<Self>) -> bool {
        if let Some(resolved) = self.provider.get() {
            return resolved.is_some();
        }
        let service = Arc::clone(self);
        match tokio::task::spawn_blocking(move || service.is_available()).await {
            Ok(available) => available,
            Err(e) => {
                tracing::warn!(error = %e, "embedding provider resolution failed");
                false
            },
        }
    }

    /// Embed `text`, truncated to the input cap and L2-normalized.
    ///
    /// Failures are logged and mapped to `None`; callers treat that as
    /// "semantic signal unavailable".
    #[must_use]
    pub fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let provider = self.provider()?;
        let input = truncate_chars(text, EMBEDDING_INPUT_MAX_CHARS);
        match provider.embed(input) {
            Ok(mut vector) => {
                l2_normalize(&mut vector);
                Some(vector)
            },
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "embedding generation failed");
                None
            },
        }
    }

    /// `embed` on the blocking thread pool.
    pub async fn embed_blocking(self: &Arc<Self>, text: String) -> Option<Vec<f32>> {
        let service = Arc::clone(self);
        match tokio::task::spawn_blocking(move || service.embed(&text)).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(error = %e, "embedding task failed");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::EmbeddingError;
    use crate::hashing::HashingProvider;

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Generation("boom".to_owned()))
        }
    }

    struct RecordingProvider {
        seen_chars: AtomicUsize,
    }

    impl EmbeddingProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.seen_chars.store(text.chars().count(), Ordering::SeqCst);
            Ok(vec![3.0, 4.0])
        }
    }

    #[test]
    fn unavailable_service_returns_none() {
        let service = EmbeddingService::unavailable();
        assert!(!service.is_available());
        assert!(service.embed("anything").is_none());
        assert!(service.provider_name().is_none());
    }

    #[test]
    fn empty_preference_list_is_unavailable() {
        let service = EmbeddingService::from_names::<&str>(&[]);
        assert!(service.embed("anything").is_none());
    }

    #[test]
    fn provider_failure_is_swallowed() {
        let service = EmbeddingService::with_provider(Arc::new(FailingProvider));
        assert!(service.is_available());
        assert!(service.embed("text").is_none());
    }

    #[test]
    fn output_is_normalized_and_input_truncated() {
        let provider = Arc::new(RecordingProvider { seen_chars: AtomicUsize::new(0) });
        let service = EmbeddingService::with_provider(provider.clone());
        let long = "é".repeat(EMBEDDING_INPUT_MAX_CHARS + 50);
        let vector = service.embed(&long).unwrap();
        assert_eq!(provider.seen_chars.load(Ordering::SeqCst), EMBEDDING_INPUT_MAX_CHARS);
        assert!((vector[0] - 0.6).abs() < 1e-6);
        assert!((vector[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn unknown_names_are_skipped_and_next_preference_wins() {
        let service = EmbeddingService::from_names(&["nonsense", "hash"]);
        assert_eq!(service.provider_name().as_deref(), Some("hash"));
        assert_eq!(service.dimensions(), Some(agentmem_core::EMBEDDING_DIMENSION));
    }

    #[test]
    fn hashing_provider_round_trips_through_service() {
        let service = EmbeddingService::with_provider(Arc::new(HashingProvider::default()));
        let a = service.embed("connection pool").unwrap();
        let b = service.embed("connection pool").unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn embed_blocking_matches_sync_embed() {
        let service = Arc::new(EmbeddingService::from_names(&["hash"]));
        let sync = service.embed("migrate schema");
        let via_pool = service.embed_blocking("migrate schema".to_owned()).await;
        assert_eq!(sync, via_pool);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ensure_ready_resolves_cold_service() {
        let service = Arc::new(EmbeddingService::from_names(&["hash"]));
        assert!(service.provider.get().is_none());

        assert!(service.ensure_ready().await);
        assert!(service.provider.get().is_some_and(Option::is_some));
        assert!(service.ensure_ready().await);
    }

    #[tokio::test]
    async fn ensure_ready_reports_missing_provider() {
        assert!(!Arc::new(EmbeddingService::unavailable()).ensure_ready().await);
        assert!(!Arc::new(EmbeddingService::from_names(&["nonsense"])).ensure_ready().await);
    }
}
