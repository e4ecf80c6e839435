//! Configuración del cliente (valor plano, sin leer el entorno).

use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_DATAFLOW_NAME, DEFAULT_SPLIT_SUFFIX};

/// Qué hacer con conversiones a fecha cuyo formato no pudo inferirse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguousDatePolicy {
    /// Falla con "could not auto-detect ...".
    #[default]
    Error,
    /// Descarta esas conversiones (con warning) y conserva el resto.
    DropConversion,
}

impl FromStr for AmbiguousDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(AmbiguousDatePolicy::Error),
            "drop" | "drop_conversion" => Ok(AmbiguousDatePolicy::DropConversion),
            other => Err(format!("unknown ambiguous date policy '{other}' (expected 'error' or 'drop')")),
        }
    }
}

impl fmt::Display for AmbiguousDatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguousDatePolicy::Error => f.write_str("error"),
            AmbiguousDatePolicy::DropConversion => f.write_str("drop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Nombre cuando no hay nombre explícito ni path del que derivarlo.
    pub default_dataflow_name: String,
    /// Sufijo del segundo dataflow de `random_split`.
    pub split_suffix: String,
    pub ambiguous_dates: AmbiguousDatePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { default_dataflow_name: DEFAULT_DATAFLOW_NAME.to_string(),
               split_suffix: DEFAULT_SPLIT_SUFFIX.to_string(),
               ambiguous_dates: AmbiguousDatePolicy::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!("drop".parse::<AmbiguousDatePolicy>(), Ok(AmbiguousDatePolicy::DropConversion));
        assert_eq!(" Error ".parse::<AmbiguousDatePolicy>(), Ok(AmbiguousDatePolicy::Error));
        assert!("guess".parse::<AmbiguousDatePolicy>().is_err());
    }
}
