//! Transformaciones que pasan por el protocolo aprender-aplicar.

use super::Dataflow;
use crate::builder::{ColumnTypesBuilder, DeriveColumnByExampleBuilder, ExampleSource, FileFormatBuilder, FuzzyGroupBuilder,
                     JsonColumnBuilder, LabelEncoderBuilder, MinMaxScalerBuilder, OneHotEncodingBuilder,
                     OutputDistribution, QuantileTransformBuilder, SplitColumnByExampleBuilder, ToDateTimeBuilder,
                     TypeConverter};
use crate::columns::MultiColumnSelection;
use crate::errors::DataflowError;

impl Dataflow {
    /// Convierte columnas a los tipos indicados. Las fechas sin formato se
    /// infieren; si el engine no lo consigue, falla (o descarta la
    /// conversión según `ClientConfig::ambiguous_dates`).
    pub fn set_column_types<I, K, C>(&self, conversions: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = (K, C)>,
              K: Into<String>,
              C: Into<TypeConverter>
    {
        let builder = conversions.into_iter()
                                 .fold(ColumnTypesBuilder::new(), |b, (column, converter)| b.with(column, converter));
        self.learn(builder)
    }

    /// `formats` vacío: se infieren de los datos.
    pub fn to_datetime(&self,
                       columns: impl Into<MultiColumnSelection>,
                       formats: &[&str],
                       date_constant: Option<&str>)
                       -> Result<Dataflow, DataflowError> {
        let mut builder = ToDateTimeBuilder::new(columns).formats(formats.iter().copied());
        if let Some(date) = date_constant {
            builder = builder.date_constant(date);
        }
        self.learn(builder)
    }

    pub fn parse_json_column(&self, column: &str) -> Result<Dataflow, DataflowError> {
        self.learn(JsonColumnBuilder::new(column))
    }

    /// Nueva columna `new_column` aprendida de `examples` (`(origen, valor)`).
    pub fn derive_column_by_example<S>(&self,
                                       source_columns: &[&str],
                                       new_column: &str,
                                       examples: Vec<(S, &str)>)
                                       -> Result<Dataflow, DataflowError>
        where S: Into<ExampleSource>
    {
        if source_columns.is_empty() {
            return Err(DataflowError::invalid("source_columns", "provide columns to derive from"));
        }
        let builder = examples.into_iter()
                              .try_fold(DeriveColumnByExampleBuilder::new(source_columns.iter().copied(), new_column),
                                        |b, (source, target)| b.add_example(source, target))?;
        self.learn(builder)
    }

    /// Sin ejemplo, el engine elige un patrón de división habitual.
    pub fn split_column_by_example(&self,
                                   column: &str,
                                   example: Option<(&str, &[&str])>)
                                   -> Result<Dataflow, DataflowError> {
        let mut builder = SplitColumnByExampleBuilder::new(column);
        if let Some((source, splits)) = example {
            builder = builder.add_example(source, splits.iter().copied());
        }
        self.learn(builder)
    }

    pub fn split_column_by_delimiters(&self,
                                      column: &str,
                                      delimiters: &[&str],
                                      keep_delimiters: bool)
                                      -> Result<Dataflow, DataflowError> {
        if delimiters.is_empty() {
            return Err(DataflowError::invalid("delimiters", "at least one delimiter is required"));
        }
        self.learn(SplitColumnByExampleBuilder::new(column).delimiters(delimiters.iter().copied())
                                                           .keep_delimiters(keep_delimiters))
    }

    /// `threshold` por defecto 0.8.
    pub fn fuzzy_group_column(&self,
                              source_column: &str,
                              new_column: &str,
                              threshold: Option<f64>,
                              score_column: Option<&str>)
                              -> Result<Dataflow, DataflowError> {
        let mut builder = FuzzyGroupBuilder::new(source_column, new_column)
            .similarity_threshold(threshold.unwrap_or(FuzzyGroupBuilder::DEFAULT_THRESHOLD));
        if let Some(column) = score_column {
            builder = builder.score_column(column);
        }
        self.learn(builder)
    }

    pub fn one_hot_encode(&self, source_column: &str, prefix: Option<&str>) -> Result<Dataflow, DataflowError> {
        let builder = OneHotEncodingBuilder::new(source_column);
        match prefix {
            Some(prefix) => self.learn(builder.prefix(prefix)),
            None => self.learn(builder),
        }
    }

    pub fn label_encode(&self, source_column: &str, new_column: &str) -> Result<Dataflow, DataflowError> {
        self.learn(LabelEncoderBuilder::new(source_column, new_column))
    }

    /// Escala a `[range_min, range_max]`. Con `data_min` y `data_max` dados
    /// no se consulta al engine.
    pub fn min_max_scale(&self,
                         column: &str,
                         range: (f64, f64),
                         data_min: Option<f64>,
                         data_max: Option<f64>)
                         -> Result<Dataflow, DataflowError> {
        self.learn(MinMaxScalerBuilder::new(column).range(range.0, range.1)
                                                   .data_bounds(data_min, data_max))
    }

    pub fn quantile_transform(&self,
                              source_column: &str,
                              new_column: &str,
                              quantiles_count: Option<i64>,
                              distribution: OutputDistribution)
                              -> Result<Dataflow, DataflowError> {
        let count = quantiles_count.unwrap_or(QuantileTransformBuilder::DEFAULT_QUANTILES);
        self.learn(QuantileTransformBuilder::new(source_column, new_column).quantiles_count(count)
                                                                            .output_distribution(distribution))
    }

    /// Añade el parser que el engine detecte para los ficheros actuales.
    pub fn detect_file_format(&self) -> Result<Dataflow, DataflowError> {
        self.learn(FileFormatBuilder::new())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::args;
    use crate::client::EngineClient;
    use crate::engine::{EngineCall, InMemoryEngine};
    use crate::step::StepType;
    use crate::value::{FieldType, Value};

    fn source(engine: InMemoryEngine) -> (Arc<InMemoryEngine>, Dataflow) {
        let engine = Arc::new(engine);
        let client = EngineClient::shared(engine.clone());
        (engine, Dataflow::get_files(&client, "a.csv").unwrap())
    }

    #[test]
    fn set_column_types_accepts_plain_field_types() {
        let (engine, d) = source(InMemoryEngine::new());
        let out = d.set_column_types([("qty", FieldType::Integer), ("ok", FieldType::Boolean)]).unwrap();
        assert!(engine.calls().is_empty());
        assert_eq!(out.step_count(), 2);
    }

    #[test]
    fn to_datetime_without_formats_learns_once() {
        let (engine, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::ToDateTime,
                                                                              args! { "dateTimeFormats" => vec!["%Y"] }));
        let out = d.to_datetime("year", &[], None).unwrap();
        assert_eq!(engine.count_calls("add_block_to_list"), 1);
        assert_eq!(out.last_step().unwrap().argument("dateTimeFormats"), Some(&Value::from(vec!["%Y"])));
    }

    #[test]
    fn derive_rejects_scalar_examples_for_many_columns() {
        let (engine, d) = source(InMemoryEngine::new());
        let err = d.derive_column_by_example(&["a", "b"], "c", vec![("x", "y")]).unwrap_err();
        assert!(matches!(err, DataflowError::InvalidArgument { .. }));
        assert!(d.derive_column_by_example::<&str>(&[], "c", vec![]).is_err());
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn split_by_delimiters_sends_the_delimiters() {
        let (engine, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::SplitColumnByExample,
                                                                              args! { "dsl" => "split(',')" }));
        d.split_column_by_delimiters("full", &[","], true).unwrap();
        match &engine.calls()[0] {
            EngineCall::AddBlockToList(args) => {
                let arguments = &args.new_block_arguments.arguments;
                assert_eq!(arguments.get("delimiters"), Some(&Value::from(vec![","])));
                assert_eq!(arguments.get("keepDelimiters"), Some(&Value::Boolean(true)));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn label_encode_failure_leaves_no_step() {
        let (_, d) = source(InMemoryEngine::new());
        assert!(d.label_encode("color", "color_id").is_err());
        assert_eq!(d.step_count(), 1);
    }

    #[test]
    fn min_max_with_bounds_is_local() {
        let (engine, d) = source(InMemoryEngine::new());
        d.min_max_scale("p", (0.0, 1.0), Some(0.0), Some(10.0)).unwrap();
        assert!(engine.calls().is_empty());
    }
}
