//! Resolución de referencias.
//!
//! Un `ActivityReference` es un handle opaco e inmutable: no contiene steps,
//! solo lo necesario para que el engine localice un grafo anónimo registrado
//! (o un dataflow con nombre dentro de un paquete) y, opcionalmente, un step
//! concreto dentro de él.
//!
//! `resolve` convierte cualquier `DataflowReference` en un `ActivityReference`:
//! - Un `Dataflow` vivo: exactamente una llamada `create_anonymous_reference`
//!   por resolución, con la secuencia completa y el contexto de paquete.
//! - Un `ExternalReference` ya abierto: proyección pura, sin RPC.
//! - Un `ActivityReference`: se devuelve tal cual.

pub mod external;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::client::EngineClient;
use crate::dataflow::Dataflow;
use crate::engine::AnonymousBlocksArgs;
use crate::errors::DataflowError;
use crate::step::{Step, StepType};
use crate::value::Value;
use crate::{args, wire_enum};

pub use external::ExternalReference;

wire_enum! {
    /// Tipo de grafo referenciado.
    pub enum ReferenceType {
        Anonymous = 0,
        Package = 1,
    }
}

/// Puntero a un step concreto dentro del grafo referenciado.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferencedStep {
    pub step_id: Uuid,
    pub step_type: StepType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityReference {
    reference_type: ReferenceType,
    container_path: Option<String>,
    name: String,
    referenced_step: Option<ReferencedStep>,
}

impl ActivityReference {
    /// Referencia a un grafo anónimo registrado en el engine.
    pub fn anonymous(name: impl Into<String>, container_path: Option<String>) -> Self {
        Self { reference_type: ReferenceType::Anonymous,
               container_path,
               name: name.into(),
               referenced_step: None }
    }

    /// Referencia a un dataflow con nombre dentro de un paquete.
    pub fn package(package_path: impl Into<String>, dataflow_name: impl Into<String>) -> Self {
        Self { reference_type: ReferenceType::Package,
               container_path: Some(package_path.into()),
               name: dataflow_name.into(),
               referenced_step: None }
    }

    /// Copia de la referencia apuntando a "todo hasta `step` inclusive".
    pub fn with_referenced_step(&self, step: &Step) -> Self {
        Self { referenced_step: Some(ReferencedStep { step_id: step.id(),
                                                      step_type: step.step_type() }),
               ..self.clone() }
    }

    pub fn reference_type(&self) -> ReferenceType {
        self.reference_type
    }

    pub fn container_path(&self) -> Option<&str> {
        self.container_path.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn referenced_step(&self) -> Option<&ReferencedStep> {
        self.referenced_step.as_ref()
    }

    pub fn to_value(&self) -> Value {
        let referenced = match &self.referenced_step {
            Some(s) => Value::Record(args! { "stepId" => s.step_id, "stepType" => s.step_type.as_str() }),
            None => Value::Null,
        };
        Value::Record(args! {
            "referenceType" => self.reference_type,
            "referenceContainerPath" => self.container_path.clone(),
            "referenceName" => &self.name,
            "referencedStep" => referenced,
        })
    }
}

impl From<ActivityReference> for Value {
    fn from(r: ActivityReference) -> Self {
        r.to_value()
    }
}

impl From<&ActivityReference> for Value {
    fn from(r: &ActivityReference) -> Self {
        r.to_value()
    }
}

impl TryFrom<&Value> for ActivityReference {
    type Error = DataflowError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let not_a_reference = || DataflowError::NotAReference(value.to_string());
        let record = value.as_record().ok_or_else(not_a_reference)?;
        let reference_type = record.get("referenceType")
                                   .and_then(Value::as_i64)
                                   .and_then(ReferenceType::from_code)
                                   .ok_or_else(not_a_reference)?;
        let name = record.get("referenceName")
                         .and_then(Value::as_str)
                         .ok_or_else(not_a_reference)?
                         .to_string();
        let container_path = match record.get("referenceContainerPath") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_str().ok_or_else(not_a_reference)?.to_string()),
        };
        let referenced_step = match record.get("referencedStep") {
            None | Some(Value::Null) => None,
            Some(step) => {
                let step_id = step.get("stepId")
                                  .and_then(Value::as_str)
                                  .and_then(|s| Uuid::parse_str(s).ok())
                                  .ok_or_else(not_a_reference)?;
                let step_type = step.get("stepType")
                                    .and_then(Value::as_str)
                                    .ok_or_else(not_a_reference)?
                                    .parse::<StepType>()?;
                Some(ReferencedStep { step_id, step_type })
            }
        };
        Ok(Self { reference_type,
                  container_path,
                  name,
                  referenced_step })
    }
}

impl Serialize for ActivityReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActivityReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ActivityReference::try_from(&value).map_err(D::Error::custom)
    }
}

/// Cualquier operando que pueda incrustarse como referencia.
#[derive(Debug, Clone)]
pub enum DataflowReference {
    Dataflow(Dataflow),
    External(ExternalReference),
    Activity(ActivityReference),
}

impl From<Dataflow> for DataflowReference {
    fn from(v: Dataflow) -> Self {
        DataflowReference::Dataflow(v)
    }
}

impl From<&Dataflow> for DataflowReference {
    fn from(v: &Dataflow) -> Self {
        DataflowReference::Dataflow(v.clone())
    }
}

impl From<ExternalReference> for DataflowReference {
    fn from(v: ExternalReference) -> Self {
        DataflowReference::External(v)
    }
}

impl From<ActivityReference> for DataflowReference {
    fn from(v: ActivityReference) -> Self {
        DataflowReference::Activity(v)
    }
}

/// Valores dinámicos: solo un record con forma de referencia es aceptable.
impl TryFrom<&Value> for DataflowReference {
    type Error = DataflowError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        ActivityReference::try_from(value).map(DataflowReference::Activity)
    }
}

/// Resuelve un operando a un `ActivityReference`.
pub fn resolve(client: &EngineClient, operand: &DataflowReference) -> Result<ActivityReference, DataflowError> {
    match operand {
        DataflowReference::Activity(r) => Ok(r.clone()),
        DataflowReference::External(e) => Ok(e.resolve()),
        DataflowReference::Dataflow(d) => {
            let args = AnonymousBlocksArgs { blocks: d.to_blocks(),
                                             project_context: d.parent_package_path().map(str::to_string) };
            let reference = client.engine().create_anonymous_reference(args)?;
            log::info!("created anonymous reference '{}' for dataflow {} ({} steps)",
                       reference.name(),
                       d.id(),
                       d.step_count());
            Ok(reference)
        }
    }
}
