//! Detección del formato de fichero.
//!
//! El candidato es un `AutoReadFile`; el engine responde con el parser
//! concreto (CSV, ancho fijo, parquet...) y es ese step el que se añade.

use super::{Materialization, StepBuilder};
use crate::config::ClientConfig;
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::Arguments;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFormatBuilder;

impl FileFormatBuilder {
    pub fn new() -> Self {
        Self
    }
}

fn detected_parser(learned: &BlockData) -> Result<StepType, MissingParameter> {
    learned.block_type
           .parse::<StepType>()
           .ok()
           .filter(|t| t.is_parser())
           .ok_or(MissingParameter::FileFormat)
}

impl StepBuilder for FileFormatBuilder {
    fn step_type(&self) -> StepType {
        StepType::AutoReadFile
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        Ok(Arguments::new())
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        detected_parser(learned).map(|_| ())
    }

    fn finalize(&self,
                _candidate: Arguments,
                learned: Option<BlockData>,
                _config: &ClientConfig)
                -> Result<Materialization, MissingParameter> {
        let block = learned.ok_or(MissingParameter::FileFormat)?;
        let step_type = detected_parser(&block)?;
        log::debug!("detected file format {step_type}");
        Ok(Materialization { step_type,
                             arguments: block.arguments,
                             local_data: block.local_data })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::args;
    use crate::client::EngineClient;
    use crate::dataflow::Dataflow;
    use crate::engine::InMemoryEngine;
    use crate::value::Value;

    fn source(engine: InMemoryEngine) -> Dataflow {
        let client = EngineClient::shared(Arc::new(engine));
        Dataflow::get_files(&client, "a.csv").unwrap()
    }

    #[test]
    fn detected_parser_is_appended() {
        let engine = InMemoryEngine::new().with_learner(StepType::AutoReadFile, |_, _| {
                                               Ok(BlockData { id: uuid::Uuid::new_v4(),
                                                              block_type: StepType::ReadParquetFile.as_str().to_string(),
                                                              arguments: args! { "path" => Value::Null },
                                                              local_data: None })
                                           });
        let out = source(engine).learn(FileFormatBuilder::new()).unwrap();
        let step = out.last_step().unwrap();
        assert_eq!(step.step_type(), StepType::ReadParquetFile);
        assert_eq!(out.step_count(), 2);
    }

    #[test]
    fn detected_parser_still_needs_its_arguments() {
        let engine = InMemoryEngine::new().with_learner(StepType::AutoReadFile, |_, _| {
                                               Ok(BlockData { id: uuid::Uuid::new_v4(),
                                                              block_type: StepType::ParseDelimited.as_str().to_string(),
                                                              arguments: args! { "separator" => ";" },
                                                              local_data: None })
                                           });
        let err = source(engine).learn(FileFormatBuilder::new()).unwrap_err();
        assert!(matches!(err, DataflowError::MissingArgument { .. }));
    }

    #[test]
    fn unrecognized_format_fails() {
        let err = source(InMemoryEngine::new()).learn(FileFormatBuilder::new()).unwrap_err();
        assert_eq!(err,
                   DataflowError::InferenceIncomplete { step_type: StepType::AutoReadFile.to_string(),
                                                        missing: MissingParameter::FileFormat });
    }
}
