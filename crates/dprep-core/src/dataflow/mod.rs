//! Dataflow: secuencia inmutable de steps más identidad, nombre y contexto.
//!
//! Cada transformación pública devuelve un `Dataflow` nuevo. El prefijo de
//! steps se comparte estructuralmente (`StepChain`); nada se muta.
//!
//! Reglas de identidad:
//! - `add_step` y las ediciones "mismo pipeline, un step cambiado" copian `id`.
//! - `set_name`, el segundo lado de un split, joins y referencias crean uno nuevo.

mod chain;
mod combine;
mod display;
mod learned;
mod output;
mod parse;
mod replace;
mod sampling;
mod transforms;

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use uuid::Uuid;

use crate::builder::{LearningSession, StepBuilder};
use crate::client::EngineClient;
use crate::datasource::DataSourceTarget;
use crate::engine::BlockData;
use crate::errors::DataflowError;
use crate::hashing::hash_blocks;
use crate::step::{Step, StepType};
use crate::value::{Arguments, Value};

use chain::StepChain;

pub use combine::JoinOptions;
pub use output::{CsvOutputOptions, ParquetOutputOptions};
pub use parse::{ArchiveOptions, ParseDelimitedOptions, ParseFixedWidthOptions, ParseLinesOptions};
pub use transforms::SummaryColumn;

#[derive(Debug, Clone)]
pub struct Dataflow {
    client: Arc<EngineClient>,
    id: Uuid,
    name: Option<String>,
    derived_name: OnceCell<String>,
    steps: StepChain,
    parent_package_path: Option<String>,
}

impl Dataflow {
    /// Dataflow vacío con identidad nueva.
    pub fn new(client: &Arc<EngineClient>) -> Self {
        Self { client: Arc::clone(client),
               id: Uuid::new_v4(),
               name: None,
               derived_name: OnceCell::new(),
               steps: StepChain::default(),
               parent_package_path: None }
    }

    /// Reconstruye un dataflow a partir de steps existentes (ids conservados).
    pub fn from_steps(client: &Arc<EngineClient>, steps: Vec<Step>) -> Result<Self, DataflowError> {
        ensure_unique_ids(steps.iter())?;
        Ok(Self { steps: StepChain::from_steps(steps),
                  ..Self::new(client) })
    }

    fn derive(&self, steps: StepChain) -> Self {
        Self { client: Arc::clone(&self.client),
               id: self.id,
               name: self.name.clone(),
               derived_name: self.derived_name.clone(),
               steps,
               parent_package_path: self.parent_package_path.clone() }
    }

    /// Añade un step nuevo del tipo dado. Mismo `id` de dataflow.
    pub fn add_step(&self, step_type: StepType, arguments: Arguments) -> Result<Dataflow, DataflowError> {
        self.add_step_with_local_data(step_type, arguments, None)
    }

    pub fn add_step_with_local_data(&self,
                                    step_type: StepType,
                                    arguments: Arguments,
                                    local_data: Option<Arguments>)
                                    -> Result<Dataflow, DataflowError> {
        let step = Step::with_local_data(step_type, arguments, local_data)?;
        log::debug!("dataflow {}: appending {} ({} -> {} steps)",
                    self.id,
                    step_type,
                    self.steps.len(),
                    self.steps.len() + 1);
        Ok(self.derive(self.steps.push(step)))
    }

    /// Ejecuta el protocolo aprender-aplicar de `builder` sobre los steps
    /// actuales y añade el step resultante.
    pub fn learn<B: StepBuilder>(&self, builder: B) -> Result<Dataflow, DataflowError> {
        LearningSession::new(self, builder).to_dataflow()
    }

    pub fn client(&self) -> &Arc<EngineClient> {
        &self.client
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Nombre explícito o, si no hay, derivado del path de la fuente (se
    /// calcula una vez y queda cacheado).
    pub fn name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.derived_name.get_or_init(|| {
                           self.name_from_datasource()
                               .unwrap_or_else(|| self.client.config().default_dataflow_name.clone())
                       }),
        }
    }

    /// Copia con otro nombre y un `id` nuevo: es otro pipeline lógico.
    pub fn set_name(&self, name: impl Into<String>) -> Dataflow {
        Self { id: Uuid::new_v4(),
               name: Some(name.into()),
               derived_name: OnceCell::new(),
               ..self.clone() }
    }

    pub fn parent_package_path(&self) -> Option<&str> {
        self.parent_package_path.as_deref()
    }

    pub fn with_parent_package_path(&self, path: impl Into<String>) -> Dataflow {
        Self { parent_package_path: Some(path.into()),
               ..self.clone() }
    }

    /// Steps en orden (copias baratas de valores inmutables).
    pub fn steps(&self) -> Vec<Step> {
        self.steps.to_vec().into_iter().cloned().collect()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// `true` si los steps de `other` son, sin copia, el prefijo de `self`.
    pub fn extends(&self, other: &Dataflow) -> bool {
        self.steps.shares_prefix(&other.steps)
    }

    pub fn to_blocks(&self) -> Vec<BlockData> {
        self.steps.to_vec().into_iter().map(Step::to_wire).collect()
    }

    /// Sub-secuencia de steps. Conserva `id` y nombre, no el contexto de
    /// paquete.
    pub fn slice(&self, range: Range<usize>) -> Result<Dataflow, DataflowError> {
        let steps = self.steps.to_vec();
        let selected = steps.get(range.clone())
                            .ok_or_else(|| {
                                DataflowError::invalid("range",
                                                       format!("{}..{} out of bounds for {} steps",
                                                               range.start,
                                                               range.end,
                                                               steps.len()))
                            })?;
        Ok(Self { client: Arc::clone(&self.client),
                  id: self.id,
                  name: self.name.clone(),
                  derived_name: OnceCell::new(),
                  steps: StepChain::from_steps(selected.iter().map(|s| (*s).clone())),
                  parent_package_path: None })
    }

    /// Añade los steps de `other` tras los de `self`.
    pub fn concat(&self, other: &Dataflow) -> Result<Dataflow, DataflowError> {
        ensure_unique_ids(self.steps.to_vec().into_iter().chain(other.steps.to_vec()))?;
        let steps = other.steps
                         .to_vec()
                         .into_iter()
                         .fold(self.steps.clone(), |chain, step| chain.push(step.clone()));
        Ok(self.derive(steps))
    }

    /// Hash de contenido del grafo (tipos y argumentos, en orden).
    pub fn content_hash(&self) -> String {
        hash_blocks(&self.to_blocks())
    }

    /// Reemplaza el step raíz conservando el resto y la identidad. El nombre
    /// derivado se recalcula a partir de la nueva fuente.
    pub(crate) fn with_root(&self, root: Step) -> Dataflow {
        let rest = self.steps.to_vec();
        let tail = rest.into_iter().skip(1).cloned();
        Self { derived_name: OnceCell::new(),
               ..self.derive(StepChain::from_steps(std::iter::once(root).chain(tail))) }
    }

    fn name_from_datasource(&self) -> Option<String> {
        self.steps
            .to_vec()
            .into_iter()
            .filter(|s| s.step_type().carries_path())
            .find_map(|s| {
                let path = s.argument("path")?;
                if path.get("target").and_then(Value::as_i64) != Some(DataSourceTarget::Local.code()) {
                    return None;
                }
                let first = path.get("resourceDetails")?.as_list()?.first()?.get("path")?.as_str()?;
                Path::new(first).file_stem().map(|stem| stem.to_string_lossy().into_owned())
            })
    }
}

fn ensure_unique_ids<'a>(steps: impl Iterator<Item = &'a Step>) -> Result<(), DataflowError> {
    let mut seen = std::collections::HashSet::new();
    for step in steps {
        if !seen.insert(step.id()) {
            return Err(DataflowError::DuplicateStepId(step.id()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::engine::InMemoryEngine;

    fn client() -> Arc<EngineClient> {
        EngineClient::shared(Arc::new(InMemoryEngine::new()))
    }

    #[test]
    fn add_step_appends_exactly_one_and_keeps_the_original() {
        let client = client();
        let d = Dataflow::get_files(&client, "data/a.csv").unwrap();
        let before: Vec<_> = d.steps().iter().map(Step::id).collect();
        let e = d.take(10).unwrap();

        assert_eq!(d.steps().iter().map(Step::id).collect::<Vec<_>>(), before);
        assert_eq!(e.step_count(), d.step_count() + 1);
        assert_eq!(e.id(), d.id());
        assert!(e.extends(&d));
    }

    #[test]
    fn name_is_derived_from_local_path_stem() {
        let client = client();
        let d = Dataflow::get_files(&client, "/tmp/input/sales_2019.csv").unwrap();
        assert_eq!(d.name(), "sales_2019");
        assert_eq!(d.step_count(), 1);
    }

    #[test]
    fn remote_or_missing_paths_fall_back_to_default_name() {
        let client = client();
        assert_eq!(Dataflow::get_files(&client, "https://host/a.csv").unwrap().name(), "dataflow");
        assert_eq!(Dataflow::new(&client).name(), "dataflow");
    }

    #[test]
    fn set_name_is_a_new_pipeline() {
        let client = client();
        let d = Dataflow::get_files(&client, "a.csv").unwrap();
        let named = d.set_name("orders");
        assert_eq!(named.name(), "orders");
        assert_ne!(named.id(), d.id());
        assert_eq!(named.step_count(), d.step_count());
        assert_eq!(d.name(), "a");
    }

    #[test]
    fn concat_rejects_duplicate_step_ids() {
        let client = client();
        let d = Dataflow::get_files(&client, "a.csv").unwrap().take(1).unwrap();
        let err = d.concat(&d).unwrap_err();
        assert!(matches!(err, DataflowError::DuplicateStepId(_)));

        let other = Dataflow::new(&client).skip(2).unwrap();
        let joined = d.concat(&other).unwrap();
        assert_eq!(joined.step_count(), 3);
        assert_eq!(joined.last_step().map(Step::id), other.last_step().map(Step::id));
    }

    #[test]
    fn slice_keeps_selected_steps_and_identity() {
        let client = client();
        let d = Dataflow::get_files(&client, "a.csv").unwrap()
                                                      .skip(1)
                                                      .unwrap()
                                                      .take(2)
                                                      .unwrap()
                                                      .with_parent_package_path("pkg.dprep");
        let s = d.slice(0..2).unwrap();
        assert_eq!(s.step_count(), 2);
        assert_eq!(s.id(), d.id());
        assert_eq!(s.parent_package_path(), None);
        assert!(d.slice(1..9).is_err());
    }

    #[test]
    fn content_hash_ignores_step_ids() {
        let client = client();
        let a = Dataflow::new(&client).add_step(StepType::Take, args! { "count" => 3i64 }).unwrap();
        let b = Dataflow::new(&client).add_step(StepType::Take, args! { "count" => 3i64 }).unwrap();
        let c = Dataflow::new(&client).add_step(StepType::Take, args! { "count" => 4i64 }).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn from_steps_preserves_ids() {
        let client = client();
        let d = Dataflow::get_files(&client, "a.csv").unwrap().take(1).unwrap();
        let rebuilt = Dataflow::from_steps(&client, d.steps()).unwrap();
        assert_eq!(rebuilt.to_blocks(), d.to_blocks());
    }
}
