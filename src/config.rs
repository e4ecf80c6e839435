//! Configuración del cliente a partir del entorno.
//! Carga `.env` una sola vez y expone un `ClientConfig` inmutable (`CONFIG`).
use std::env;

use dprep_core::config::{AmbiguousDatePolicy, ClientConfig};
use once_cell::sync::Lazy;

use crate::errors::ConfigError;

pub const DEFAULT_NAME_VAR: &str = "DPREP_DEFAULT_DATAFLOW_NAME";
pub const SPLIT_SUFFIX_VAR: &str = "DPREP_SPLIT_SUFFIX";
pub const AMBIGUOUS_DATES_VAR: &str = "DPREP_AMBIGUOUS_DATES";

/// Configuración global, evaluada una sola vez. Los valores inválidos se
/// sustituyen por los de defecto con un warning.
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
    from_lookup(|key| env::var(key).ok()).unwrap_or_else(|err| {
                                             log::warn!("{err}; using default client configuration");
                                             ClientConfig::default()
                                         })
});

fn non_empty(key: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { key: key.to_string() }),
        other => Ok(other),
    }
}

/// Construye la configuración leyendo cada variable con `lookup`. Las
/// ausentes toman el valor por defecto.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    if let Some(name) = non_empty(DEFAULT_NAME_VAR, lookup(DEFAULT_NAME_VAR))? {
        config.default_dataflow_name = name;
    }
    if let Some(suffix) = non_empty(SPLIT_SUFFIX_VAR, lookup(SPLIT_SUFFIX_VAR))? {
        config.split_suffix = suffix;
    }
    if let Some(policy) = non_empty(AMBIGUOUS_DATES_VAR, lookup(AMBIGUOUS_DATES_VAR))? {
        config.ambiguous_dates =
            policy.parse::<AmbiguousDatePolicy>()
                  .map_err(|reason| ConfigError::Invalid { key: AMBIGUOUS_DATES_VAR.to_string(),
                                                          reason })?;
    }
    Ok(config)
}
