//! Errores del cliente.
//!
//! Taxonomía:
//! - `ValueError`: valores fuera del modelo cerrado o wire mal formado.
//! - `EngineError`: fallos opacos del engine/transporte; se propagan sin
//!   reintentos ni reescritura.
//! - `DataflowError`: todo lo que puede fallar al construir o ejecutar un
//!   dataflow. Los errores locales se producen antes de cualquier RPC.

use std::fmt;

use thiserror::Error;

/// Errores del modelo de valores.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValueError {
    #[error("unsupported value kind: {0}")]
    UnsupportedKind(String),
    #[error("invalid wire value: {0}")]
    InvalidWire(String),
}

/// Errores devueltos por el engine. El core no los interpreta.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EngineError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("engine rejected {operation}: {message}")]
    Rejected { operation: String, message: String },
}

/// Parámetro que el engine no pudo inferir durante el aprendizaje.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingParameter {
    /// Formatos de fecha para las columnas indicadas.
    DateTimeFormats { columns: Vec<String> },
    /// Argumento aprendido requerido por el step candidato.
    LearnedArgument(String),
    /// El engine no reconoció el formato del fichero.
    FileFormat,
}

impl fmt::Display for MissingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingParameter::DateTimeFormats { columns } if columns.is_empty() => write!(f, "date_time_formats"),
            MissingParameter::DateTimeFormats { columns } => {
                write!(f, "date_time_formats for columns [{}]", columns.join(", "))
            }
            MissingParameter::LearnedArgument(name) => write!(f, "'{name}'"),
            MissingParameter::FileFormat => write!(f, "file format"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum DataflowError {
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("unsupported value for '{argument}': {reason}")]
    UnsupportedValue { argument: String, reason: String },
    #[error("missing required argument '{argument}' for step {step_type}")]
    MissingArgument { step_type: String, argument: String },
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },
    #[error("unknown step type: {0}")]
    UnknownStepType(String),
    #[error("can't replace '{existing}' datasource with {replacement}")]
    IncompatibleDatasource { existing: String, replacement: String },
    #[error("dataflow has no steps")]
    EmptyDataflow,
    #[error("duplicate step id {0} in dataflow")]
    DuplicateStepId(uuid::Uuid),
    #[error("value is not an activity reference: {0}")]
    NotAReference(String),
    #[error("could not auto-detect {missing} for {step_type}; supply them explicitly")]
    InferenceIncomplete { step_type: String, missing: MissingParameter },
    #[error("required secrets are missing, register them with use_secrets: [{}]", .ids.join(", "))]
    MissingSecrets { ids: Vec<String> },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("io error: {0}")]
    Io(String),
}

impl DataflowError {
    pub(crate) fn unsupported(argument: &str, reason: impl Into<String>) -> Self {
        DataflowError::UnsupportedValue { argument: argument.to_string(),
                                          reason: reason.into() }
    }

    pub(crate) fn invalid(argument: &str, reason: impl Into<String>) -> Self {
        DataflowError::InvalidArgument { argument: argument.to_string(),
                                         reason: reason.into() }
    }

    /// Indica si el error se resolvió localmente, sin intervención del engine.
    pub fn is_local(&self) -> bool {
        !matches!(self, DataflowError::Engine(_) | DataflowError::Io(_))
    }
}

impl From<std::io::Error> for DataflowError {
    fn from(err: std::io::Error) -> Self {
        DataflowError::Io(err.to_string())
    }
}
