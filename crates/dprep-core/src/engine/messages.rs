//! Mensajes intercambiados con el engine.
//!
//! Los nombres de campo siguen la convención camelCase del engine; los
//! argumentos de step viajan con la codificación de `value::wire`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Arguments;

/// Forma de frontera de un step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub block_type: String,
    pub arguments: Arguments,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_data: Option<Arguments>,
}

/// Argumentos de un step candidato, aún sin id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockArguments {
    #[serde(rename = "type")]
    pub block_type: String,
    pub arguments: Arguments,
}

/// Secuencia de steps más contexto de proyecto. Lo usan la ejecución, el
/// descubrimiento de secretos y la creación de referencias anónimas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousBlocksArgs {
    pub blocks: Vec<BlockData>,
    pub project_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBlockToListArgs {
    pub blocks: Vec<BlockData>,
    pub new_block_arguments: BlockArguments,
    pub project_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReferenceArgs {
    pub package_path: String,
    pub dataflow_name: String,
}

/// Estado de un secreto requerido por la secuencia de steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {
    pub key: String,
    pub is_available: bool,
}
