//! Expansión de una columna JSON. Siempre se aprende: el engine devuelve el
//! esquema inferido en `local_data` y se conserva tal cual.

use super::StepBuilder;
use crate::args;
use crate::columns::single_column;
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::Arguments;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonColumnBuilder {
    column: String,
}

impl JsonColumnBuilder {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }
}

impl StepBuilder for JsonColumnBuilder {
    fn step_type(&self) -> StepType {
        StepType::ParseJsonColumn
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.column.is_empty() {
            return Err(DataflowError::invalid("column", "column name can't be empty"));
        }
        Ok(args! { "column" => single_column(self.column.as_str()) })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        match learned.arguments.contains_key("column") {
            true => Ok(()),
            false => Err(MissingParameter::LearnedArgument("column".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::EngineClient;
    use crate::dataflow::Dataflow;
    use crate::engine::InMemoryEngine;
    use crate::value::Value;

    #[test]
    fn learned_local_data_is_kept() {
        let engine = InMemoryEngine::new().with_learner(StepType::ParseJsonColumn, |_, candidate| {
                                               Ok(BlockData { id: uuid::Uuid::new_v4(),
                                                              block_type: candidate.block_type.clone(),
                                                              arguments: candidate.arguments.clone(),
                                                              local_data: Some(args! { "schema" => vec!["a", "b"] }) })
                                           });
        let client = EngineClient::shared(Arc::new(engine));
        let d = Dataflow::get_files(&client, "a.json").unwrap();
        let out = d.learn(JsonColumnBuilder::new("payload")).unwrap();

        let step = out.last_step().unwrap();
        assert_eq!(step.step_type(), StepType::ParseJsonColumn);
        assert_eq!(step.local_data().and_then(|l| l.get("schema")), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(step.to_wire().local_data, step.local_data().cloned());
    }
}
