//! Operaciones que combinan dataflows o sustituyen su fuente.

use std::sync::Arc;

use super::parse::database_arguments;
use super::Dataflow;
use crate::args;
use crate::client::EngineClient;
use crate::datasource::DataSource;
use crate::errors::DataflowError;
use crate::reference::{resolve, DataflowReference};
use crate::step::{DatasourceKind, Step, StepType};
use crate::typedefs::JoinType;
use crate::value::Value;

/// Parámetros de un join entre dos dataflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    /// `(columna izquierda, columna derecha)`
    pub join_key_pairs: Vec<(String, String)>,
    pub join_type: JoinType,
    pub left_column_prefix: String,
    pub right_column_prefix: String,
    /// Columnas de la izquierda que no reciben prefijo.
    pub left_non_prefixed_columns: Option<Vec<String>>,
    pub right_non_prefixed_columns: Option<Vec<String>>,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self { join_key_pairs: Vec::new(),
               join_type: JoinType::Match,
               left_column_prefix: "l_".to_string(),
               right_column_prefix: "r_".to_string(),
               left_non_prefixed_columns: None,
               right_non_prefixed_columns: None }
    }
}

impl JoinOptions {
    pub fn on(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { join_key_pairs: vec![(left.into(), right.into())],
               ..Self::default() }
    }

    pub fn and(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.join_key_pairs.push((left.into(), right.into()));
        self
    }

    pub fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }
}

fn references(client: &EngineClient, operands: Vec<DataflowReference>) -> Result<Vec<Value>, DataflowError> {
    operands.iter()
            .map(|operand| resolve(client, operand).map(Value::from))
            .collect()
}

impl Dataflow {
    /// Dataflow nuevo con un único `TwoWayJoin` entre `left` y `right`.
    pub fn join_references(client: &Arc<EngineClient>,
                           left: impl Into<DataflowReference>,
                           right: impl Into<DataflowReference>,
                           options: JoinOptions)
                           -> Result<Dataflow, DataflowError> {
        if options.join_key_pairs.is_empty() {
            return Err(DataflowError::invalid("join_key_pairs", "at least one key pair is required"));
        }
        let left = resolve(client, &left.into())?;
        let right = resolve(client, &right.into())?;
        let pairs: Vec<Value> = options.join_key_pairs
                                       .iter()
                                       .map(|(l, r)| Value::Record(args! { "leftKeyColumn" => l, "rightKeyColumn" => r }))
                                       .collect();
        Dataflow::new(client).add_step(StepType::TwoWayJoin,
                                       args! {
                                           "leftActivityReference" => left,
                                           "rightActivityReference" => right,
                                           "joinKeyPairs" => pairs,
                                           "joinType" => options.join_type,
                                           "leftColumnPrefix" => options.left_column_prefix,
                                           "rightColumnPrefix" => options.right_column_prefix,
                                           "leftNonPrefixedColumns" => options.left_non_prefixed_columns,
                                           "rightNonPrefixedColumns" => options.right_non_prefixed_columns,
                                       })
    }

    /// `self` como lado izquierdo del join.
    pub fn join(&self, right: impl Into<DataflowReference>, options: JoinOptions) -> Result<Dataflow, DataflowError> {
        Dataflow::join_references(&self.client, self, right, options)
    }

    /// Añade las columnas de los dataflows referenciados.
    pub fn append_columns(&self, dataflows: Vec<DataflowReference>) -> Result<Dataflow, DataflowError> {
        if dataflows.is_empty() {
            return Err(DataflowError::invalid("dataflows", "at least one dataflow is required"));
        }
        let refs = references(&self.client, dataflows)?;
        self.add_step(StepType::AppendColumns, args! { "dataflows" => refs })
    }

    /// Añade los registros de los dataflows referenciados.
    pub fn append_rows(&self, dataflows: Vec<DataflowReference>) -> Result<Dataflow, DataflowError> {
        if dataflows.is_empty() {
            return Err(DataflowError::invalid("dataflows", "at least one dataflow is required"));
        }
        let refs = references(&self.client, dataflows)?;
        self.add_step(StepType::AppendRows, args! { "dataflows" => refs })
    }

    /// Sustituye la fuente del step raíz. El tipo de fuente debe coincidir:
    /// MSSQL solo sobre `Database` (se conserva la query) y ficheros solo
    /// sobre raíces de ficheros. El id del step raíz y el del dataflow no
    /// cambian.
    pub fn replace_datasource(&self, source: impl Into<DataSource>) -> Result<Dataflow, DataflowError> {
        let root = self.first_step().ok_or(DataflowError::EmptyDataflow)?;
        let source = source.into();
        let incompatible = || DataflowError::IncompatibleDatasource { existing: root.step_type().to_string(),
                                                                      replacement: source.label().to_string() };
        let new_root = match &source {
            DataSource::Mssql(mssql) => {
                if root.step_type().datasource_kind() != DatasourceKind::Database {
                    return Err(incompatible());
                }
                let query = root.argument("query")
                                .and_then(Value::as_str)
                                .ok_or_else(|| DataflowError::MissingArgument { step_type: root.step_type().to_string(),
                                                                                argument: "query".into() })?;
                Step::with_id(root.id(), StepType::Database, database_arguments(mssql, query.to_string()), None)?
            }
            DataSource::File(file) => {
                if root.step_type().datasource_kind() != DatasourceKind::File {
                    return Err(incompatible());
                }
                root.with_argument("path", file.to_value())
            }
        };
        log::debug!("dataflow {}: replaced {} datasource (step {})", self.id, source.label(), new_root.id());
        Ok(self.with_root(new_root))
    }

    /// Sustituye la referencia del step raíz, que debe ser un `Reference`.
    pub fn replace_reference(&self, reference: impl Into<DataflowReference>) -> Result<Dataflow, DataflowError> {
        let root = self.first_step().ok_or(DataflowError::EmptyDataflow)?;
        if root.step_type() != StepType::Reference {
            return Err(DataflowError::IncompatibleDatasource { existing: root.step_type().to_string(),
                                                               replacement: "DataflowReference".into() });
        }
        let activity = resolve(&self.client, &reference.into())?;
        Ok(self.with_root(root.with_argument("reference", activity.into())))
    }
}
