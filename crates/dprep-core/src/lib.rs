//! dprep-core: constructor de dataflows inmutables contra un engine remoto.
//!
//! El cliente nunca ejecuta datos: compone steps, aprende parámetros
//! preguntando al engine, resuelve referencias entre dataflows y bloquea la
//! ejecución mientras falten secretos.
pub mod builder;
pub mod client;
pub mod columns;
pub mod config;
pub mod constants;
pub mod dataflow;
pub mod datasource;
pub mod engine;
pub mod errors;
pub mod expression;
pub mod hashing;
pub mod reference;
pub mod secrets;
pub mod step;
pub mod typedefs;
pub mod value;

pub use builder::{LearningSession, LearningState, Materialization, StepBuilder};
pub use client::EngineClient;
pub use columns::{ColumnPattern, ColumnsSelector, MultiColumnSelection};
pub use config::{AmbiguousDatePolicy, ClientConfig};
pub use dataflow::{Dataflow, JoinOptions};
pub use datasource::{DataSource, FileDataSource, MssqlDataSource};
pub use engine::{EngineApi, EngineCall, InMemoryEngine};
pub use errors::{DataflowError, EngineError, MissingParameter, ValueError};
pub use expression::Expression;
pub use reference::{resolve, ActivityReference, DataflowReference, ExternalReference};
pub use secrets::Secret;
pub use step::{Step, StepType};
pub use value::{Arguments, FieldType, Timestamp, Value, ValueKind};
