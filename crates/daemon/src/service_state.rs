use std::sync::Arc;

use common::lister::{DirectoryLister, ListError};
use common::registry::{CodeRegistry, RegistryError};

use crate::http_server::rate_limit::RateLimiter;
use crate::ServiceConfig;

/// Main service state, shared by every request handler.
///
/// Everything in here is either immutable after startup or, for the
/// rate limiter, synchronized internally.
#[derive(Clone)]
pub struct State {
    registry: Arc<CodeRegistry>,
    lister: Arc<DirectoryLister>,
    limiter: Arc<RateLimiter>,
}

impl State {
    pub fn new(registry: CodeRegistry, lister: DirectoryLister, limiter: RateLimiter) -> Self {
        Self {
            registry: Arc::new(registry),
            lister: Arc::new(lister),
            limiter: Arc::new(limiter),
        }
    }

    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let registry = CodeRegistry::load(&config.codes_file)?;
        if registry.is_empty() {
            tracing::warn!(
                path = %config.codes_file.display(),
                "no access codes configured, every code will be rejected"
            );
        }

        let lister = DirectoryLister::new(&config.upload_dir).await?;
        tracing::info!(root = %lister.root().display(), "serving letters");

        for directory in registry.directories() {
            if !lister.root().join(directory.as_str()).is_dir() {
                tracing::warn!(%directory, "directory unlocked by an access code does not exist");
            }
        }

        let limiter = RateLimiter::new(
            config.rate_limit.window(),
            config.rate_limit.max_requests,
        );

        Ok(Self::new(registry, lister, limiter))
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    pub fn lister(&self) -> &DirectoryLister {
        &self.lister
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to load access codes: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to open upload directory: {0}")]
    Storage(#[from] ListError),
}
