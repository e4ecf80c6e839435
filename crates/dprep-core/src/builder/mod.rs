//! Protocolo aprender-aplicar.
//!
//! Algunos steps no pueden construirse solo con lo que sabe el cliente
//! (formatos de fecha, programas de extracción, etiquetas categóricas...).
//! Un `StepBuilder` describe un step candidato; la `LearningSession` lo envía
//! al engine junto con los steps actuales (`add_block_to_list`), comprueba
//! localmente que el resultado esté completo y solo entonces lo añade al
//! dataflow con `add_step`.
//!
//! Transiciones válidas:
//! - `Declared` -> `Learning` -> `Materialized`
//! - `Declared` -> `Materialized` (el candidato ya está completo)
//! - `Declared`/`Learning` -> `Failed`
//!
//! Un fallo de inferencia no añade nada y deja el dataflow de partida
//! intacto. Los errores del engine se propagan y la sesión vuelve a
//! `Declared`.

pub mod by_example;
pub mod column_types;
pub mod datetime;
pub mod encoders;
pub mod file_format;
pub mod json_column;
pub mod scaling;

use crate::config::ClientConfig;
use crate::dataflow::Dataflow;
use crate::engine::{AddBlockToListArgs, BlockArguments, BlockData};
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::Arguments;

pub use by_example::{DeriveColumnByExampleBuilder, ExampleSource, SplitColumnByExampleBuilder};
pub use column_types::{ColumnTypesBuilder, TypeConverter};
pub use datetime::ToDateTimeBuilder;
pub use encoders::{FuzzyGroupBuilder, LabelEncoderBuilder, OneHotEncodingBuilder};
pub use file_format::FileFormatBuilder;
pub use json_column::JsonColumnBuilder;
pub use scaling::{MinMaxScalerBuilder, OutputDistribution, QuantileTransformBuilder};

/// Step listo para añadirse.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialization {
    pub step_type: StepType,
    pub arguments: Arguments,
    pub local_data: Option<Arguments>,
}

/// Estado de una sesión de aprendizaje.
#[derive(Debug, Clone, PartialEq)]
pub enum LearningState {
    /// Candidato declarado, aún sin enviar.
    Declared,
    /// Esperando la respuesta de `add_block_to_list`.
    Learning,
    /// Step completo, pendiente de añadir.
    Materialized(Materialization),
    /// El engine no infirió el parámetro indicado.
    Failed(MissingParameter),
}

impl LearningState {
    fn label(&self) -> &'static str {
        match self {
            LearningState::Declared => "declared",
            LearningState::Learning => "learning",
            LearningState::Materialized(_) => "materialized",
            LearningState::Failed(_) => "failed",
        }
    }
}

/// Describe un step cuyo contenido final depende de los datos.
pub trait StepBuilder {
    /// Tipo del step candidato enviado al engine.
    fn step_type(&self) -> StepType;

    /// Argumentos del candidato. Aquí se validan las entradas locales.
    fn candidate_arguments(&self) -> Result<Arguments, DataflowError>;

    /// `false` si el candidato ya está completo y puede añadirse tal cual.
    fn needs_learning(&self, _candidate: &Arguments) -> bool {
        true
    }

    /// Comprueba que lo aprendido incluye todo lo que el step necesita.
    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter>;

    /// Construye el step final a partir del candidato y lo aprendido.
    fn finalize(&self,
                candidate: Arguments,
                learned: Option<BlockData>,
                _config: &ClientConfig)
                -> Result<Materialization, MissingParameter> {
        let step_type = self.step_type();
        Ok(match learned {
            Some(block) => Materialization { step_type,
                                             arguments: block.arguments,
                                             local_data: block.local_data },
            None => Materialization { step_type,
                                      arguments: candidate,
                                      local_data: None },
        })
    }
}

/// Una ejecución del protocolo sobre los steps de un dataflow.
pub struct LearningSession<'a, B: StepBuilder> {
    dataflow: &'a Dataflow,
    builder: B,
    state: LearningState,
}

impl<'a, B: StepBuilder> LearningSession<'a, B> {
    pub fn new(dataflow: &'a Dataflow, builder: B) -> Self {
        Self { dataflow,
               builder,
               state: LearningState::Declared }
    }

    pub fn state(&self) -> &LearningState {
        &self.state
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    fn transition(&mut self, next: LearningState) {
        log::debug!("{} builder on dataflow {}: {} -> {}",
                    self.builder.step_type(),
                    self.dataflow.id(),
                    self.state.label(),
                    next.label());
        self.state = next;
    }

    fn fail(&mut self, missing: MissingParameter) -> DataflowError {
        self.transition(LearningState::Failed(missing.clone()));
        DataflowError::InferenceIncomplete { step_type: self.builder.step_type().to_string(),
                                             missing }
    }

    /// Ejecuta el aprendizaje contra los steps actuales. Cada llamada desde
    /// `Declared` hace una ronda nueva; no hay caché entre sesiones.
    pub fn learn(&mut self) -> Result<Materialization, DataflowError> {
        match &self.state {
            LearningState::Materialized(m) => return Ok(m.clone()),
            LearningState::Failed(missing) => {
                return Err(DataflowError::InferenceIncomplete { step_type: self.builder.step_type().to_string(),
                                                                missing: missing.clone() })
            }
            LearningState::Declared | LearningState::Learning => {}
        }

        let candidate = self.builder.candidate_arguments()?;
        let config = self.dataflow.client().config().clone();

        let learned = if self.builder.needs_learning(&candidate) {
            self.transition(LearningState::Learning);
            let request = AddBlockToListArgs { blocks: self.dataflow.to_blocks(),
                                               new_block_arguments: BlockArguments { block_type: self.builder
                                                                                                     .step_type()
                                                                                                     .as_str()
                                                                                                     .to_string(),
                                                                                     arguments: candidate.clone() },
                                               project_context: self.dataflow
                                                                    .parent_package_path()
                                                                    .map(str::to_string) };
            let block = match self.dataflow.client().engine().add_block_to_list(request) {
                Ok(block) => block,
                Err(err) => {
                    self.transition(LearningState::Declared);
                    return Err(err.into());
                }
            };
            if let Err(missing) = self.builder.check_complete(&block) {
                return Err(self.fail(missing));
            }
            Some(block)
        } else {
            None
        };

        match self.builder.finalize(candidate, learned, &config) {
            Ok(materialization) => {
                self.transition(LearningState::Materialized(materialization.clone()));
                Ok(materialization)
            }
            Err(missing) => Err(self.fail(missing)),
        }
    }

    /// Aprende si hace falta y añade el step al dataflow de partida.
    pub fn to_dataflow(mut self) -> Result<Dataflow, DataflowError> {
        let m = self.learn()?;
        self.dataflow.add_step_with_local_data(m.step_type, m.arguments, m.local_data)
    }
}

/// Lista no vacía de strings bajo `key` en un record aprendido.
pub(crate) fn has_non_empty_list(arguments: &Arguments, key: &str) -> bool {
    arguments.get(key)
             .and_then(|v| v.as_list())
             .is_some_and(|items| !items.is_empty())
}
