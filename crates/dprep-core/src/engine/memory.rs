//! Engine en memoria para tests y desarrollo local.
//!
//! - Registra cada RPC en un log de llamadas (orden de llegada).
//! - `add_block_to_list` delega en un learner por tipo de step; por defecto
//!   devuelve el candidato tal cual (eco) con un id nuevo.
//! - Los secretos requeridos se descubren recorriendo los argumentos en busca
//!   de records `{"secretId": ...}`; el almacén es un `DashMap`.
//! - Las referencias anónimas se registran por hash de contenido.
//! - Ejecutar un `WriteDataSetBlock` local crea un fichero `part-00000` vacío
//!   en el directorio de salida.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use indexmap::IndexMap;
use uuid::Uuid;

use super::messages::{AddBlockToListArgs, AnonymousBlocksArgs, BlockArguments, BlockData, ResolveReferenceArgs, SecretStatus};
use super::EngineApi;
use crate::constants::PARTITION_FILE_PREFIX;
use crate::datasource::DataSourceTarget;
use crate::errors::EngineError;
use crate::hashing::hash_blocks;
use crate::reference::ActivityReference;
use crate::step::StepType;
use crate::value::Value;

/// Una llamada recibida por el engine en memoria.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    ExecuteAnonymousBlocks(AnonymousBlocksArgs),
    AddBlockToList(AddBlockToListArgs),
    GetSecrets(AnonymousBlocksArgs),
    CreateAnonymousReference(AnonymousBlocksArgs),
    ResolveReference(ResolveReferenceArgs),
    /// Solo los ids; los valores no se registran.
    AddTemporarySecrets(Vec<String>),
}

impl EngineCall {
    pub fn operation(&self) -> &'static str {
        match self {
            EngineCall::ExecuteAnonymousBlocks(_) => "execute_anonymous_blocks",
            EngineCall::AddBlockToList(_) => "add_block_to_list",
            EngineCall::GetSecrets(_) => "get_secrets",
            EngineCall::CreateAnonymousReference(_) => "create_anonymous_reference",
            EngineCall::ResolveReference(_) => "resolve_reference",
            EngineCall::AddTemporarySecrets(_) => "add_temporary_secrets",
        }
    }
}

/// Función que completa un candidato a partir de la secuencia actual.
pub type Learner = dyn Fn(&[BlockData], &BlockArguments) -> Result<BlockData, EngineError> + Send + Sync;

#[derive(Default)]
pub struct InMemoryEngine {
    calls: Mutex<Vec<EngineCall>>,
    learners: DashMap<String, Arc<Learner>>,
    secrets: DashMap<String, String>,
    required_secrets: DashMap<String, ()>,
    references: DashMap<String, Vec<BlockData>>,
    packages: DashMap<(String, String), ActivityReference>,
    rejections: DashMap<&'static str, String>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un learner para un tipo de step candidato.
    pub fn with_learner<F>(self, step_type: StepType, learner: F) -> Self
        where F: Fn(&[BlockData], &BlockArguments) -> Result<BlockData, EngineError> + Send + Sync + 'static
    {
        self.learners.insert(step_type.as_str().to_string(), Arc::new(learner));
        self
    }

    /// Learner que fusiona `learned` sobre los argumentos del candidato.
    pub fn with_learned_arguments(self, step_type: StepType, learned: crate::value::Arguments) -> Self {
        self.with_learner(step_type, move |_, candidate| {
                let mut arguments = candidate.arguments.clone();
                for (k, v) in &learned {
                    arguments.insert(k.clone(), v.clone());
                }
                Ok(BlockData { id: Uuid::new_v4(),
                               block_type: candidate.block_type.clone(),
                               arguments,
                               local_data: None })
            })
    }

    /// Secreto requerido aunque ningún step lo referencie.
    pub fn with_required_secret(self, id: impl Into<String>) -> Self {
        self.required_secrets.insert(id.into(), ());
        self
    }

    /// Dataflow con nombre disponible para `resolve_reference`.
    pub fn with_package_dataflow(self, package_path: impl Into<String>, dataflow_name: impl Into<String>) -> Self {
        let (package_path, dataflow_name) = (package_path.into(), dataflow_name.into());
        let token = ActivityReference::package(package_path.clone(), dataflow_name.clone());
        self.packages.insert((package_path, dataflow_name), token);
        self
    }

    /// Hace fallar la operación indicada con `EngineError::Rejected`.
    pub fn reject(&self, operation: &'static str, message: impl Into<String>) {
        self.rejections.insert(operation, message.into());
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock_calls().clone()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.lock_calls().iter().filter(|c| c.operation() == operation).count()
    }

    pub fn clear_calls(&self) {
        self.lock_calls().clear();
    }

    /// Steps registrados bajo una referencia anónima.
    pub fn registered_blocks(&self, reference_name: &str) -> Option<Vec<BlockData>> {
        self.references.get(reference_name).map(|entry| entry.value().clone())
    }

    pub fn has_secret(&self, id: &str) -> bool {
        self.secrets.contains_key(id)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<EngineCall>> {
        // Un test que entró en pánico con el lock tomado no invalida el log.
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: EngineCall) -> Result<(), EngineError> {
        let operation = call.operation();
        self.lock_calls().push(call);
        match self.rejections.get(operation) {
            Some(message) => Err(EngineError::Rejected { operation: operation.to_string(),
                                                         message: message.value().clone() }),
            None => Ok(()),
        }
    }

    fn required_secret_ids(&self, blocks: &[BlockData]) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self.required_secrets.iter().map(|e| e.key().clone()).collect();
        for block in blocks {
            for value in block.arguments.values() {
                collect_secret_ids(value, &mut ids);
            }
        }
        ids
    }

    fn write_partitions(blocks: &[BlockData]) -> Result<(), EngineError> {
        for block in blocks.iter()
                           .filter(|b| b.block_type == StepType::WriteDataSet.as_str())
        {
            let Some(dir) = local_output_dir(block) else { continue };
            fs::create_dir_all(&dir).map_err(|e| EngineError::Transport(e.to_string()))?;
            fs::write(dir.join(format!("{PARTITION_FILE_PREFIX}00000")), b"")
                .map_err(|e| EngineError::Transport(e.to_string()))?;
        }
        Ok(())
    }
}

fn collect_secret_ids(value: &Value, ids: &mut BTreeSet<String>) {
    match value {
        Value::Record(map) => {
            if let Some(id) = map.get("secretId").and_then(Value::as_str) {
                ids.insert(id.to_string());
            }
            for v in map.values() {
                collect_secret_ids(v, ids);
            }
        }
        Value::List(items) => items.iter().for_each(|v| collect_secret_ids(v, ids)),
        _ => {}
    }
}

fn local_output_dir(block: &BlockData) -> Option<PathBuf> {
    let output = block.arguments.get("outputPath")?;
    let target = output.get("target").and_then(Value::as_i64)?;
    if target != DataSourceTarget::Local.code() {
        return None;
    }
    let path = output.get("resourceDetails")?.as_list()?.first()?.get("path")?.as_str()?;
    Some(PathBuf::from(path))
}

impl EngineApi for InMemoryEngine {
    fn execute_anonymous_blocks(&self, args: AnonymousBlocksArgs) -> Result<(), EngineError> {
        let blocks = args.blocks.clone();
        self.record(EngineCall::ExecuteAnonymousBlocks(args))?;
        Self::write_partitions(&blocks)
    }

    fn add_block_to_list(&self, args: AddBlockToListArgs) -> Result<BlockData, EngineError> {
        self.record(EngineCall::AddBlockToList(args.clone()))?;
        let learner = self.learners
                          .get(&args.new_block_arguments.block_type)
                          .map(|e| Arc::clone(e.value()));
        match learner {
            Some(learn) => learn(&args.blocks, &args.new_block_arguments),
            None => Ok(BlockData { id: Uuid::new_v4(),
                                   block_type: args.new_block_arguments.block_type,
                                   arguments: args.new_block_arguments.arguments,
                                   local_data: None }),
        }
    }

    fn get_secrets(&self, args: AnonymousBlocksArgs) -> Result<Vec<SecretStatus>, EngineError> {
        let required = self.required_secret_ids(&args.blocks);
        self.record(EngineCall::GetSecrets(args))?;
        Ok(required.into_iter()
                   .map(|key| {
                       let is_available = self.secrets.contains_key(&key);
                       SecretStatus { key, is_available }
                   })
                   .collect())
    }

    fn create_anonymous_reference(&self, args: AnonymousBlocksArgs) -> Result<ActivityReference, EngineError> {
        let name = hash_blocks(&args.blocks);
        let container = args.project_context.clone();
        let blocks = args.blocks.clone();
        self.record(EngineCall::CreateAnonymousReference(args))?;
        self.references.insert(name.clone(), blocks);
        Ok(ActivityReference::anonymous(name, container))
    }

    fn resolve_reference(&self, args: ResolveReferenceArgs) -> Result<ActivityReference, EngineError> {
        let key = (args.package_path.clone(), args.dataflow_name.clone());
        self.record(EngineCall::ResolveReference(args))?;
        self.packages
            .get(&key)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::Rejected { operation: "resolve_reference".into(),
                                                   message: format!("dataflow '{}' not found in {}", key.1, key.0) })
    }

    fn add_temporary_secrets(&self, secrets: &IndexMap<String, String>) -> Result<(), EngineError> {
        self.record(EngineCall::AddTemporarySecrets(secrets.keys().cloned().collect()))?;
        for (id, value) in secrets {
            self.secrets.insert(id.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn block(step_type: StepType, arguments: crate::value::Arguments) -> BlockData {
        BlockData { id: Uuid::new_v4(),
                    block_type: step_type.as_str().into(),
                    arguments,
                    local_data: None }
    }

    #[test]
    fn secrets_are_discovered_inside_nested_records() {
        let engine = InMemoryEngine::new();
        let db = block(StepType::Database,
                       args! { "credentials" => args! { "userName" => "sa", "password" => args! { "secretId" => "pwd" } } });
        let statuses = engine.get_secrets(AnonymousBlocksArgs { blocks: vec![db.clone()],
                                                                project_context: None })
                             .unwrap();
        assert_eq!(statuses, vec![SecretStatus { key: "pwd".into(), is_available: false }]);

        let mut supplied = IndexMap::new();
        supplied.insert("pwd".to_string(), "hunter2".to_string());
        engine.add_temporary_secrets(&supplied).unwrap();
        let statuses = engine.get_secrets(AnonymousBlocksArgs { blocks: vec![db], project_context: None })
                             .unwrap();
        assert!(statuses[0].is_available);
        assert_eq!(engine.calls()[1], EngineCall::AddTemporarySecrets(vec!["pwd".into()]));
    }

    #[test]
    fn default_learner_echoes_candidate() {
        let engine = InMemoryEngine::new();
        let learned = engine.add_block_to_list(AddBlockToListArgs { blocks: vec![],
                                                                    new_block_arguments: BlockArguments { block_type: "Microsoft.DPrep.TakeBlock".into(),
                                                                                                          arguments: args! { "count" => 1i64 } },
                                                                    project_context: None })
                            .unwrap();
        assert_eq!(learned.arguments, args! { "count" => 1i64 });
        assert_eq!(engine.count_calls("add_block_to_list"), 1);
    }

    #[test]
    fn rejections_are_recorded_then_returned() {
        let engine = InMemoryEngine::new();
        engine.reject("execute_anonymous_blocks", "boom");
        let err = engine.execute_anonymous_blocks(AnonymousBlocksArgs { blocks: vec![], project_context: None })
                        .unwrap_err();
        assert_eq!(err,
                   EngineError::Rejected { operation: "execute_anonymous_blocks".into(),
                                           message: "boom".into() });
        assert_eq!(engine.count_calls("execute_anonymous_blocks"), 1);
    }

    #[test]
    fn identical_graphs_share_a_reference_name() {
        let engine = InMemoryEngine::new();
        let a = block(StepType::Take, args! { "count" => 1i64 });
        let b = block(StepType::Take, args! { "count" => 1i64 });
        let ra = engine.create_anonymous_reference(AnonymousBlocksArgs { blocks: vec![a], project_context: None })
                       .unwrap();
        let rb = engine.create_anonymous_reference(AnonymousBlocksArgs { blocks: vec![b], project_context: None })
                       .unwrap();
        assert_eq!(ra.name(), rb.name());
        assert!(engine.registered_blocks(ra.name()).is_some());
    }
}
