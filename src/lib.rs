//! DataPrep Rust
//!
//! Fachada sobre `dprep-core`:
//! - Reexporta el núcleo (dataflows, builders, referencias, secretos).
//! - `config` lee la configuración del cliente desde el entorno (`.env`).
//! - `connect` crea un `EngineClient` compartido con esa configuración.

pub mod config;
pub mod errors;

use std::sync::Arc;

pub use dprep_core::*;

/// Cliente compartido sobre `engine` con la configuración global.
pub fn connect(engine: Arc<dyn EngineApi>) -> Arc<EngineClient> {
    connect_with(engine, config::CONFIG.clone())
}

pub fn connect_with(engine: Arc<dyn EngineApi>, config: ClientConfig) -> Arc<EngineClient> {
    log::debug!("connecting client (default name '{}', split suffix '{}', ambiguous dates {})",
                config.default_dataflow_name,
                config.split_suffix,
                config.ambiguous_dates);
    Arc::new(EngineClient::with_config(engine, config))
}
