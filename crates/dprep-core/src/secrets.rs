//! Secret gate.
//!
//! Antes de cualquier operación que dispare ejecución se consulta al engine
//! qué secretos requiere la secuencia completa de steps. Si falta alguno (una
//! vez descontados los suministrados en la misma llamada) la operación falla
//! con `DataflowError::MissingSecrets` y no se ejecuta nada.
//!
//! Los valores de los secretos solo salen del cliente por `register`.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::args;
use crate::client::EngineClient;
use crate::engine::{AnonymousBlocksArgs, BlockData};
use crate::errors::DataflowError;
use crate::value::Value;

/// Referencia a un secreto; en los argumentos viaja como `{"secretId": id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Secret {
    id: String,
}

impl Secret {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn to_value(&self) -> Value {
        Value::Record(args! { "secretId" => &self.id })
    }
}

impl From<Secret> for Value {
    fn from(s: Secret) -> Self {
        s.to_value()
    }
}

impl From<&Secret> for Value {
    fn from(s: &Secret) -> Self {
        s.to_value()
    }
}

/// Ids de secretos requeridos y no disponibles (una llamada `get_secrets`).
pub fn missing_secrets(client: &EngineClient,
                       blocks: Vec<BlockData>,
                       parent_package_path: Option<&str>)
                       -> Result<BTreeSet<String>, DataflowError> {
    let statuses = client.engine()
                         .get_secrets(AnonymousBlocksArgs { blocks,
                                                            project_context: parent_package_path.map(str::to_string) })?;
    Ok(statuses.into_iter()
               .filter(|s| !s.is_available)
               .map(|s| s.key)
               .collect())
}

/// Falla si queda algún secreto sin cubrir tras descontar `supplied`.
pub fn ensure_available(client: &EngineClient,
                        blocks: Vec<BlockData>,
                        parent_package_path: Option<&str>,
                        supplied: Option<&IndexMap<String, String>>)
                        -> Result<(), DataflowError> {
    let missing = missing_secrets(client, blocks, parent_package_path)?;
    let still_missing: Vec<String> = missing.into_iter()
                                            .filter(|id| !supplied.is_some_and(|s| s.contains_key(id)))
                                            .collect();
    if still_missing.is_empty() {
        Ok(())
    } else {
        log::debug!("execution blocked, missing secrets: {still_missing:?}");
        Err(DataflowError::MissingSecrets { ids: still_missing })
    }
}

/// Reenvía valores al almacén de secretos del engine.
pub fn register(client: &EngineClient, secrets: &IndexMap<String, String>) -> Result<(), DataflowError> {
    if secrets.is_empty() {
        return Ok(());
    }
    client.engine().add_temporary_secrets(secrets)?;
    log::info!("registered secrets: {:?}", secrets.keys().collect::<Vec<_>>());
    Ok(())
}

/// Registra un único valor y devuelve la referencia para incrustarla.
pub fn register_secret(client: &EngineClient,
                       id: impl Into<String>,
                       value: impl Into<String>)
                       -> Result<Secret, DataflowError> {
    let secret = Secret::new(id);
    let mut one = IndexMap::with_capacity(1);
    one.insert(secret.id.clone(), value.into());
    register(client, &one)?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCall, InMemoryEngine};
    use crate::step::{Step, StepType};
    use std::sync::Arc;

    fn db_blocks(secret: &Secret) -> Vec<BlockData> {
        let step = Step::new(StepType::Database,
                             args! {
                                 "server" => "srv",
                                 "database" => "db",
                                 "credentialsType" => 0i64,
                                 "credentials" => args! { "userName" => "sa", "password" => secret },
                                 "query" => "select 1",
                                 "trustServer" => true,
                             }).unwrap();
        vec![step.to_wire()]
    }

    #[test]
    fn missing_ids_are_sorted_and_supplied_ones_subtracted() {
        let engine = Arc::new(InMemoryEngine::new().with_required_secret("b").with_required_secret("a"));
        let client = EngineClient::new(engine.clone());
        let blocks = db_blocks(&Secret::new("pwd"));

        let err = ensure_available(&client, blocks.clone(), None, None).unwrap_err();
        assert_eq!(err, DataflowError::MissingSecrets { ids: vec!["a".into(), "b".into(), "pwd".into()] });

        let mut supplied = IndexMap::new();
        supplied.insert("a".to_string(), "1".to_string());
        supplied.insert("pwd".to_string(), "2".to_string());
        let err = ensure_available(&client, blocks, None, Some(&supplied)).unwrap_err();
        assert_eq!(err, DataflowError::MissingSecrets { ids: vec!["b".into()] });
    }

    #[test]
    fn register_secret_only_sends_ids_to_the_log() {
        let engine = Arc::new(InMemoryEngine::new());
        let client = EngineClient::new(engine.clone());
        let secret = register_secret(&client, "pwd", "hunter2").unwrap();
        assert_eq!(secret.to_value(), Value::Record(args! { "secretId" => "pwd" }));
        assert!(engine.has_secret("pwd"));
        assert_eq!(engine.calls(), vec![EngineCall::AddTemporarySecrets(vec!["pwd".into()])]);
        assert!(missing_secrets(&client, db_blocks(&secret), None).unwrap().is_empty());
    }
}
