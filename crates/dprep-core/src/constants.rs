//! Constantes del cliente.
//!
//! Agrupa valores estáticos que participan en la identidad de los dataflows
//! (nombres por defecto) y en la representación de timestamps hacia el engine.

/// Nombre usado cuando un dataflow no tiene nombre explícito y no puede
/// derivarse de su datasource.
pub const DEFAULT_DATAFLOW_NAME: &str = "dataflow";

/// Sufijo por defecto para el segundo dataflow producido por `random_split`.
pub const DEFAULT_SPLIT_SUFFIX: &str = "_split";

/// Ticks (100 ns) por milisegundo.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Ticks (100 ns) por segundo.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks transcurridos entre 0001-01-01T00:00:00 y 1970-01-01T00:00:00.
/// Permite convertir timestamps Unix a la representación "ticks since year 1"
/// que el engine usa para comparaciones que preservan el orden.
pub const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

/// Prefijo de los ficheros de partición producidos por un `WriteDataSet`.
pub const PARTITION_FILE_PREFIX: &str = "part-";
