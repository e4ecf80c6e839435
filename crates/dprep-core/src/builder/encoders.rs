//! Agrupación difusa y codificación de categorías.

use super::{has_non_empty_list, StepBuilder};
use crate::args;
use crate::columns::single_column;
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::{Arguments, Value};

fn require_list(learned: &BlockData, key: &str, allow_empty: bool) -> Result<(), MissingParameter> {
    let present = match allow_empty {
        true => learned.arguments.get(key).and_then(Value::as_list).is_some(),
        false => has_non_empty_list(&learned.arguments, key),
    };
    match present {
        true => Ok(()),
        false => Err(MissingParameter::LearnedArgument(key.to_string())),
    }
}

fn require_column(argument: &str, column: &str) -> Result<(), DataflowError> {
    match column.is_empty() {
        true => Err(DataflowError::invalid(argument, "column name can't be empty")),
        false => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyGroupBuilder {
    source_column: String,
    new_column: String,
    similarity_threshold: f64,
    similarity_score_column: Option<String>,
}

impl FuzzyGroupBuilder {
    pub const DEFAULT_THRESHOLD: f64 = 0.8;

    pub fn new(source_column: impl Into<String>, new_column: impl Into<String>) -> Self {
        Self { source_column: source_column.into(),
               new_column: new_column.into(),
               similarity_threshold: Self::DEFAULT_THRESHOLD,
               similarity_score_column: None }
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Columna adicional con la puntuación de similitud.
    pub fn score_column(mut self, column: impl Into<String>) -> Self {
        self.similarity_score_column = Some(column.into());
        self
    }
}

impl StepBuilder for FuzzyGroupBuilder {
    fn step_type(&self) -> StepType {
        StepType::FuzzyGroupColumn
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        require_column("source_column", &self.source_column)?;
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DataflowError::invalid("similarity_threshold",
                                              format!("{} is outside [0, 1]", self.similarity_threshold)));
        }
        Ok(args! {
            "sourceColumn" => single_column(self.source_column.as_str()),
            "newColumnId" => self.new_column.as_str(),
            "similarityThreshold" => self.similarity_threshold,
            "similarityScoreColumnId" => self.similarity_score_column.clone(),
        })
    }

    /// Una lista vacía es válida: no hay valores que agrupar.
    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        require_list(learned, "duplicateValueMaps", true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncodingBuilder {
    source_column: String,
    prefix: Option<String>,
}

impl OneHotEncodingBuilder {
    pub fn new(source_column: impl Into<String>) -> Self {
        Self { source_column: source_column.into(),
               prefix: None }
    }

    /// Prefijo de las columnas generadas.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl StepBuilder for OneHotEncodingBuilder {
    fn step_type(&self) -> StepType {
        StepType::OneHotEncode
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        require_column("source_column", &self.source_column)?;
        Ok(args! {
            "sourceColumn" => single_column(self.source_column.as_str()),
            "prefix" => self.prefix.clone(),
        })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        require_list(learned, "categoricalLabels", false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoderBuilder {
    source_column: String,
    new_column: String,
}

impl LabelEncoderBuilder {
    pub fn new(source_column: impl Into<String>, new_column: impl Into<String>) -> Self {
        Self { source_column: source_column.into(),
               new_column: new_column.into() }
    }
}

impl StepBuilder for LabelEncoderBuilder {
    fn step_type(&self) -> StepType {
        StepType::LabelEncode
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        require_column("source_column", &self.source_column)?;
        require_column("new_column_name", &self.new_column)?;
        Ok(args! {
            "sourceColumn" => single_column(self.source_column.as_str()),
            "newColumnId" => self.new_column.as_str(),
        })
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        require_list(learned, "labels", false)
    }
}
