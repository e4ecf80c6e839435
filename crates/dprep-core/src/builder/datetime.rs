//! Conversión a fecha con formatos opcionales.

use super::{Materialization, StepBuilder};
use crate::args;
use crate::columns::{ColumnsSelector, MultiColumnSelection};
use crate::config::ClientConfig;
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::{Arguments, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ToDateTimeBuilder {
    columns: ColumnsSelector,
    formats: Vec<String>,
    date_constant: Option<String>,
}

impl ToDateTimeBuilder {
    /// Sin formatos: se aprenden del engine.
    pub fn new(columns: impl Into<MultiColumnSelection>) -> Self {
        Self { columns: columns.into().normalize(),
               formats: Vec::new(),
               date_constant: None }
    }

    pub fn formats<I, S>(mut self, formats: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Fecha a aplicar cuando la columna solo contiene horas.
    pub fn date_constant(mut self, date: impl Into<String>) -> Self {
        self.date_constant = Some(date.into());
        self
    }

    fn missing(&self) -> MissingParameter {
        let columns = match &self.columns {
            ColumnsSelector::Single(name) => vec![name.clone()],
            ColumnsSelector::Static(names) => names.clone(),
            ColumnsSelector::Pattern(_) => Vec::new(),
        };
        MissingParameter::DateTimeFormats { columns }
    }
}

fn learned_formats(arguments: &Arguments) -> Option<&Value> {
    arguments.get("dateTimeFormats")
             .filter(|f| f.as_list().is_some_and(|l| !l.is_empty()))
}

impl StepBuilder for ToDateTimeBuilder {
    fn step_type(&self) -> StepType {
        StepType::ToDateTime
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        let formats = (!self.formats.is_empty()).then(|| self.formats.clone());
        Ok(args! {
            "columns" => self.columns.to_value(),
            "dateTimeFormats" => formats,
            "dateConstant" => self.date_constant.clone(),
        })
    }

    fn needs_learning(&self, _candidate: &Arguments) -> bool {
        self.formats.is_empty()
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        learned_formats(&learned.arguments).map(|_| ()).ok_or_else(|| self.missing())
    }

    /// Solo se toman los formatos aprendidos; el resto es el candidato.
    fn finalize(&self,
                mut candidate: Arguments,
                learned: Option<BlockData>,
                _config: &ClientConfig)
                -> Result<Materialization, MissingParameter> {
        if let Some(block) = learned {
            let formats = learned_formats(&block.arguments).cloned().ok_or_else(|| self.missing())?;
            candidate.insert("dateTimeFormats".to_string(), formats);
        }
        Ok(Materialization { step_type: StepType::ToDateTime,
                             arguments: candidate,
                             local_data: None })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::EngineClient;
    use crate::dataflow::Dataflow;
    use crate::engine::InMemoryEngine;

    fn source(engine: InMemoryEngine) -> (Arc<InMemoryEngine>, Dataflow) {
        let engine = Arc::new(engine);
        let client = EngineClient::shared(engine.clone());
        (engine, Dataflow::get_files(&client, "a.csv").unwrap())
    }

    #[test]
    fn explicit_formats_need_no_engine() {
        let (engine, d) = source(InMemoryEngine::new());
        let out = d.learn(ToDateTimeBuilder::new("when").formats(["%Y"])).unwrap();
        assert!(engine.calls().is_empty());
        assert_eq!(out.last_step().unwrap().argument("dateTimeFormats"), Some(&Value::from(vec!["%Y"])));
    }

    #[test]
    fn learned_formats_are_used() {
        let (_, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::ToDateTime,
                                                                         args! { "dateTimeFormats" => vec!["%m/%d/%Y"] }));
        let out = d.learn(ToDateTimeBuilder::new(vec!["a", "b"]).date_constant("2020-01-01")).unwrap();
        let step = out.last_step().unwrap();
        assert_eq!(step.argument("dateTimeFormats"), Some(&Value::from(vec!["%m/%d/%Y"])));
        assert_eq!(step.argument("dateConstant"), Some(&Value::from("2020-01-01")));
    }

    #[test]
    fn empty_learned_formats_fail_without_appending() {
        let (_, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::ToDateTime,
                                                                         args! { "dateTimeFormats" => Vec::<String>::new() }));
        let err = d.learn(ToDateTimeBuilder::new("when")).unwrap_err();
        assert_eq!(err.to_string(),
                   "could not auto-detect date_time_formats for columns [when] for Microsoft.DPrep.ToDateTimeBlock; \
                    supply them explicitly");
        assert_eq!(d.step_count(), 1);
    }
}
