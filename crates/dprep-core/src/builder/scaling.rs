//! Escalado min-max y transformación por cuantiles.

use std::fmt;

use super::{has_non_empty_list, StepBuilder};
use crate::args;
use crate::columns::single_column;
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::{Arguments, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScalerBuilder {
    column: String,
    range_min: f64,
    range_max: f64,
    data_min: Option<f64>,
    data_max: Option<f64>,
}

impl MinMaxScalerBuilder {
    /// Rango de salida `[0, 1]`; los extremos de los datos se aprenden.
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into(),
               range_min: 0.0,
               range_max: 1.0,
               data_min: None,
               data_max: None }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range_min = min;
        self.range_max = max;
        self
    }

    /// Con ambos extremos conocidos no hace falta recorrer los datos.
    pub fn data_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.data_min = min;
        self.data_max = max;
        self
    }
}

impl StepBuilder for MinMaxScalerBuilder {
    fn step_type(&self) -> StepType {
        StepType::MinMaxScale
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.range_min >= self.range_max {
            return Err(DataflowError::invalid("range_min",
                                              format!("{} must be lower than range_max {}", self.range_min, self.range_max)));
        }
        if let (Some(lo), Some(hi)) = (self.data_min, self.data_max) {
            if lo > hi {
                return Err(DataflowError::invalid("data_min", format!("{lo} is greater than data_max {hi}")));
            }
        }
        Ok(args! {
            "column" => single_column(self.column.as_str()),
            "rangeMin" => self.range_min,
            "rangeMax" => self.range_max,
            "dataMin" => self.data_min,
            "dataMax" => self.data_max,
        })
    }

    fn needs_learning(&self, _candidate: &Arguments) -> bool {
        self.data_min.is_none() || self.data_max.is_none()
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        for key in ["dataMin", "dataMax"] {
            if learned.arguments.get(key).and_then(Value::as_f64).is_none() {
                return Err(MissingParameter::LearnedArgument(key.to_string()));
            }
        }
        Ok(())
    }
}

/// Distribución de salida de la transformación por cuantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputDistribution {
    #[default]
    Uniform,
    Normal,
}

impl OutputDistribution {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputDistribution::Uniform => "Uniform",
            OutputDistribution::Normal => "Normal",
        }
    }
}

impl fmt::Display for OutputDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantileTransformBuilder {
    source_column: String,
    new_column: String,
    quantiles_count: i64,
    output_distribution: OutputDistribution,
}

impl QuantileTransformBuilder {
    pub const DEFAULT_QUANTILES: i64 = 1000;

    pub fn new(source_column: impl Into<String>, new_column: impl Into<String>) -> Self {
        Self { source_column: source_column.into(),
               new_column: new_column.into(),
               quantiles_count: Self::DEFAULT_QUANTILES,
               output_distribution: OutputDistribution::default() }
    }

    pub fn quantiles_count(mut self, count: i64) -> Self {
        self.quantiles_count = count;
        self
    }

    pub fn output_distribution(mut self, distribution: OutputDistribution) -> Self {
        self.output_distribution = distribution;
        self
    }
}

impl StepBuilder for QuantileTransformBuilder {
    fn step_type(&self) -> StepType {
        StepType::QuantileTransform
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.quantiles_count < 1 {
            return Err(DataflowError::invalid("quantiles_count", "must be at least 1"));
        }
        Ok(args! {
            "sourceColumn" => single_column(self.source_column.as_str()),
            "newColumnId" => self.new_column.as_str(),
            "quantilesCount" => self.quantiles_count,
            "outputDistribution" => self.output_distribution.as_str(),
        })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        match has_non_empty_list(&learned.arguments, "quantiles") {
            true => Ok(()),
            false => Err(MissingParameter::LearnedArgument("quantiles".into())),
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

    fn source(engine: InMemoryEngine) -> (Arc<InMemoryEngine>, Dataflow) {
        let engine = Arc::new(engine);
        let client = EngineClient::shared(engine.clone());
        (engine, Dataflow::get_files(&client, "a.csv").unwrap())
    }

    #[test]
    fn known_bounds_skip_learning() {
        let (engine, d) = source(InMemoryEngine::new());
        let out = d.learn(MinMaxScalerBuilder::new("price").data_bounds(Some(1.0), Some(9.0))).unwrap();
        assert!(engine.calls().is_empty());
        assert_eq!(out.last_step().unwrap().argument("dataMax"), Some(&Value::Double(9.0)));
    }

    #[test]
    fn partial_bounds_are_learned() {
        let (engine, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::MinMaxScale,
                                                                              args! { "dataMin" => 2.0, "dataMax" => 7.5 }));
        let out = d.learn(MinMaxScalerBuilder::new("price").data_bounds(Some(2.0), None)).unwrap();
        assert_eq!(engine.count_calls("add_block_to_list"), 1);
        assert_eq!(out.last_step().unwrap().argument("dataMax"), Some(&Value::Double(7.5)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (_, d) = source(InMemoryEngine::new());
        assert!(d.learn(MinMaxScalerBuilder::new("price").range(1.0, 0.0)).is_err());
    }

    #[test]
    fn quantiles_must_be_learned() {
        let (_, d) = source(InMemoryEngine::new());
        assert!(matches!(d.learn(QuantileTransformBuilder::new("x", "x_q")),
                         Err(DataflowError::InferenceIncomplete { .. })));

        let (_, d) = source(InMemoryEngine::new().with_learned_arguments(StepType::QuantileTransform,
                                                                         args! { "quantiles" => vec![0.1, 0.5, 0.9] }));
        let out = d.learn(QuantileTransformBuilder::new("x", "x_q").output_distribution(OutputDistribution::Normal))
                   .unwrap();
        let step = out.last_step().unwrap();
        assert_eq!(step.argument("quantilesCount"), Some(&Value::Long(1000)));
        assert_eq!(step.argument("outputDistribution"), Some(&Value::from("Normal")));
    }
}
