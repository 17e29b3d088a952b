use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::store::{MemoryTemplateBackend, TemplateCache, TemplateRepository};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub repository: Arc<TemplateRepository>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, repository: Arc<TemplateRepository>) -> Self {
        Self {
            settings: Arc::new(settings),
            repository,
            start_time: Instant::now(),
        }
    }

    /// State over an empty in-memory store, honoring the cache and render settings.
    pub fn in_memory(settings: Settings) -> Self {
        let repository = TemplateRepository::new(
            Arc::new(MemoryTemplateBackend::new()),
            TemplateCache::from_config(&settings.cache),
            settings.render.strict,
        );
        Self::new(settings, Arc::new(repository))
    }
}
