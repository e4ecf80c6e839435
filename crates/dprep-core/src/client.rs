//! Contexto explícito de engine que se pasa a cada dataflow y builder.

use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::engine::EngineApi;

pub struct EngineClient {
    engine: Arc<dyn EngineApi>,
    config: ClientConfig,
}

impl EngineClient {
    pub fn new(engine: Arc<dyn EngineApi>) -> Self {
        Self::with_config(engine, ClientConfig::default())
    }

    pub fn with_config(engine: Arc<dyn EngineApi>, config: ClientConfig) -> Self {
        Self { engine, config }
    }

    /// Atajo habitual: cliente compartido listo para construir dataflows.
    pub fn shared(engine: Arc<dyn EngineApi>) -> Arc<Self> {
        Arc::new(Self::new(engine))
    }

    pub fn engine(&self) -> &dyn EngineApi {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineClient").field("config", &self.config).finish_non_exhaustive()
    }
}
