//! Columnas derivadas y divididas a partir de ejemplos. El engine sintetiza
//! un programa (`dsl`) que el step final lleva consigo.

use indexmap::IndexMap;

use super::StepBuilder;
use crate::args;
use crate::columns::{selection_to_value, single_column};
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::{Arguments, Value};

fn check_program(learned: &BlockData) -> Result<(), MissingParameter> {
    let has_program = learned.arguments
                             .get("dsl")
                             .and_then(Value::as_str)
                             .is_some_and(|dsl| !dsl.is_empty());
    match has_program {
        true => Ok(()),
        false => Err(MissingParameter::LearnedArgument("dsl".into())),
    }
}

/// Origen de un ejemplo: un valor suelto (solo con una columna fuente) o un
/// registro `columna -> valor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleSource {
    Value(String),
    Record(IndexMap<String, String>),
}

impl From<&str> for ExampleSource {
    fn from(v: &str) -> Self {
        ExampleSource::Value(v.to_string())
    }
}

impl From<String> for ExampleSource {
    fn from(v: String) -> Self {
        ExampleSource::Value(v)
    }
}

impl From<IndexMap<String, String>> for ExampleSource {
    fn from(v: IndexMap<String, String>) -> Self {
        ExampleSource::Record(v)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ExampleSource {
    fn from(v: [(&str, &str); N]) -> Self {
        ExampleSource::Record(v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeriveColumnByExampleBuilder {
    source_columns: Vec<String>,
    new_column: String,
    examples: Vec<(IndexMap<String, String>, String)>,
}

impl DeriveColumnByExampleBuilder {
    pub fn new<I, S>(source_columns: I, new_column: impl Into<String>) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { source_columns: source_columns.into_iter().map(Into::into).collect(),
               new_column: new_column.into(),
               examples: Vec::new() }
    }

    /// Un valor suelto solo es válido con una única columna fuente; se
    /// convierte en `{columna: valor}`.
    pub fn add_example(mut self, source: impl Into<ExampleSource>, target: impl Into<String>) -> Result<Self, DataflowError> {
        let record = match source.into() {
            ExampleSource::Record(record) => record,
            ExampleSource::Value(value) => match self.source_columns.as_slice() {
                [only] => IndexMap::from([(only.clone(), value)]),
                _ => {
                    return Err(DataflowError::invalid("example_data",
                                                      "when deriving from multiple columns every example must be a \
                                                       record of column values"))
                }
            },
        };
        self.examples.push((record, target.into()));
        Ok(self)
    }

    pub fn examples(&self) -> &[(IndexMap<String, String>, String)] {
        &self.examples
    }
}

impl StepBuilder for DeriveColumnByExampleBuilder {
    fn step_type(&self) -> StepType {
        StepType::DeriveColumnByExample
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.source_columns.is_empty() {
            return Err(DataflowError::invalid("source_columns", "provide columns to derive from"));
        }
        if self.examples.is_empty() {
            return Err(DataflowError::invalid("example_data", "at least one example is required"));
        }
        let examples: Vec<Value> = self.examples
                                       .iter()
                                       .map(|(source, target)| {
                                           let source: Arguments =
                                               source.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))).collect();
                                           Value::Record(args! { "sourceData" => source, "exampleValue" => target })
                                       })
                                       .collect();
        Ok(args! {
            "sourceColumns" => selection_to_value(self.source_columns.clone()),
            "columnId" => self.new_column.as_str(),
            "examples" => examples,
        })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        check_program(learned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitColumnByExampleBuilder {
    column: String,
    keep_delimiters: bool,
    delimiters: Vec<String>,
    examples: Vec<(String, Vec<String>)>,
}

impl SplitColumnByExampleBuilder {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into(),
               keep_delimiters: false,
               delimiters: Vec::new(),
               examples: Vec::new() }
    }

    pub fn delimiters<I, S>(mut self, delimiters: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.delimiters = delimiters.into_iter().map(Into::into).collect();
        self
    }

    pub fn keep_delimiters(mut self, keep: bool) -> Self {
        self.keep_delimiters = keep;
        self
    }

    /// `source` dividido como indica `splits`.
    pub fn add_example<I, S>(mut self, source: impl Into<String>, splits: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.examples.push((source.into(), splits.into_iter().map(Into::into).collect()));
        self
    }
}

impl StepBuilder for SplitColumnByExampleBuilder {
    fn step_type(&self) -> StepType {
        StepType::SplitColumnByExample
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.column.is_empty() {
            return Err(DataflowError::invalid("source_column", "column name can't be empty"));
        }
        let delimiters = (!self.delimiters.is_empty()).then(|| self.delimiters.clone());
        let examples: Vec<Value> = self.examples
                                       .iter()
                                       .map(|(source, splits)| Value::Record(args! { "example" => source, "splits" => splits.clone() }))
                                       .collect();
        Ok(args! {
            "column" => single_column(self.column.as_str()),
            "keepDelimiters" => self.keep_delimiters,
            "delimiters" => delimiters,
            "examples" => examples,
        })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        check_program(learned)
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
        (engine, Dataflow::get_files(&client, "people.csv").unwrap())
    }

    #[test]
    fn scalar_examples_need_a_single_source_column() {
        let single = DeriveColumnByExampleBuilder::new(["name"], "initial").add_example("Ada", "A").unwrap();
        assert_eq!(single.examples()[0].0.get("name"), Some(&"Ada".to_string()));

        let multi = DeriveColumnByExampleBuilder::new(["first", "last"], "full");
        assert!(multi.clone().add_example("Ada", "Ada L").is_err());
        assert!(multi.add_example([("first", "Ada"), ("last", "L")], "Ada L").is_ok());
    }

    #[test]
    fn derive_without_sources_fails_before_learning() {
        let (engine, d) = source(InMemoryEngine::new());
        let builder = DeriveColumnByExampleBuilder::new(Vec::<String>::new(), "x");
        assert!(d.learn(builder).is_err());
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn derive_appends_the_learned_program() {
        let (_, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::DeriveColumnByExample,
                                                                         args! { "dsl" => "substring(0,1)" }));
        let builder = DeriveColumnByExampleBuilder::new(["name"], "initial").add_example("Ada", "A").unwrap();
        let out = d.learn(builder).unwrap();
        assert_eq!(out.last_step().unwrap().argument("dsl"), Some(&Value::from("substring(0,1)")));
    }

    #[test]
    fn split_without_program_is_incomplete() {
        let (_, d) = source(InMemoryEngine::new());
        let err = d.learn(SplitColumnByExampleBuilder::new("full").delimiters([" "])).unwrap_err();
        assert!(matches!(err,
                         DataflowError::InferenceIncomplete { missing: MissingParameter::LearnedArgument(ref name), .. }
                         if name == "dsl"));
    }
}
