//! Errores de configuración del entorno.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("variable {key} está vacía")]
    Empty { key: String },
    #[error("valor inválido para {key}: {reason}")]
    Invalid { key: String, reason: String },
}
