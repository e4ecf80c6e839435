//! Step: una operación inmutable del pipeline.
//!
//! La identidad de un step es su `id`; dos steps con el mismo tipo y los
//! mismos argumentos pero ids distintos son steps distintos. El `id` se genera
//! una sola vez y solo se reutiliza cuando un step raíz se reemplaza en sitio.

pub mod step_type;

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use crate::engine::BlockData;
use crate::errors::DataflowError;
use crate::value::{Arguments, Value};

pub use step_type::{DatasourceKind, StepType};

#[derive(Debug, Clone)]
pub struct Step {
    id: Uuid,
    step_type: StepType,
    arguments: Arguments,
    local_data: Option<Arguments>,
}

impl Step {
    /// Crea un step con id nuevo validando el esquema de argumentos.
    pub fn new(step_type: StepType, arguments: Arguments) -> Result<Self, DataflowError> {
        Self::with_local_data(step_type, arguments, None)
    }

    pub fn with_local_data(step_type: StepType,
                           arguments: Arguments,
                           local_data: Option<Arguments>)
                           -> Result<Self, DataflowError> {
        Self::with_id(Uuid::new_v4(), step_type, arguments, local_data)
    }

    /// Construye un step con un id existente. Solo el reemplazo en sitio del
    /// step raíz debería necesitarlo.
    pub(crate) fn with_id(id: Uuid,
                          step_type: StepType,
                          arguments: Arguments,
                          local_data: Option<Arguments>)
                          -> Result<Self, DataflowError> {
        validate_arguments(step_type, &arguments)?;
        Ok(Self { id,
                  step_type,
                  arguments,
                  local_data })
    }

    /// Copia del step con el mismo id y un argumento sustituido.
    pub(crate) fn with_argument(&self, key: &str, value: Value) -> Step {
        let mut arguments = self.arguments.clone();
        arguments.insert(key.to_string(), value);
        Step { id: self.id,
               step_type: self.step_type,
               arguments,
               local_data: self.local_data.clone() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    pub fn local_data(&self) -> Option<&Arguments> {
        self.local_data.as_ref()
    }

    /// Forma de frontera: `(id, type, arguments, local_data)`.
    pub fn to_wire(&self) -> BlockData {
        BlockData { id: self.id,
                    block_type: self.step_type.as_str().to_string(),
                    arguments: self.arguments.clone(),
                    local_data: self.local_data.clone() }
    }

    /// Reconstruye un step desde su forma de frontera conservando el id.
    pub fn from_wire(block: &BlockData) -> Result<Self, DataflowError> {
        let step_type = block.block_type.parse::<StepType>()?;
        Self::with_id(block.id, step_type, block.arguments.clone(), block.local_data.clone())
    }
}

/// Comprueba que todas las claves obligatorias del tipo estén presentes.
/// Un valor `Null` cuenta como presente: el engine decide su significado.
pub fn validate_arguments(step_type: StepType, arguments: &Arguments) -> Result<(), DataflowError> {
    match step_type.required_arguments()
                   .iter()
                   .find(|key| !arguments.contains_key(**key))
    {
        Some(missing) => Err(DataflowError::MissingArgument { step_type: step_type.as_str().to_string(),
                                                              argument: (*missing).to_string() }),
        None => Ok(()),
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Step {}

impl Hash for Step {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {{ id: {}, type: {}, arguments: {}",
               self.id,
               self.step_type,
               Value::Record(self.arguments.clone()))?;
        if let Some(local) = &self.local_data {
            write!(f, ", local_data: {}", Value::Record(local.clone()))?;
        }
        write!(f, " }}")
    }
}
