//! Transformaciones de columnas y filas que no requieren aprendizaje.

use super::Dataflow;
use crate::args;
use crate::columns::{selection_to_value, single_column, MultiColumnSelection};
use crate::errors::DataflowError;
use crate::expression::Expression;
use crate::step::StepType;
use crate::typedefs::{AssertPolicy, CodeBlockType, ColumnRelationship, DecimalMark, MismatchAsOption, SummaryFunction,
                      TrimType};
use crate::value::Value;

/// Agregación de `summarize`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryColumn {
    pub column_id: String,
    pub summary_function: SummaryFunction,
    pub summary_column_name: String,
    pub histogram_bucket_count: Option<i64>,
    /// `(point_count, bandwidth)`
    pub kernel_density: Option<(i64, f64)>,
    pub quantiles: Option<Vec<f64>>,
}

impl SummaryColumn {
    pub fn new(column_id: impl Into<String>, summary_function: SummaryFunction, summary_column_name: impl Into<String>) -> Self {
        Self { column_id: column_id.into(),
               summary_function,
               summary_column_name: summary_column_name.into(),
               histogram_bucket_count: None,
               kernel_density: None,
               quantiles: None }
    }

    fn to_value(&self) -> Value {
        Value::Record(args! {
            "columnId" => &self.column_id,
            "summaryFunction" => self.summary_function,
            "summaryColumnName" => &self.summary_column_name,
            "histogramArguments" => self.histogram_bucket_count.map(|n| args! { "histogramBucketCount" => n }),
            "kernelDensityArguments" => self.kernel_density.map(|(points, bandwidth)| args! {
                "kernelDensityPointCount" => points,
                "kernelDensityBandwidth" => bandwidth,
            }),
            "quantiles" => self.quantiles.clone(),
        })
    }
}

/// `[{column: selector simple, newColumnId}]`
fn column_pairs<I, K, V>(pairs: I) -> Value
    where I: IntoIterator<Item = (K, V)>,
          K: Into<String>,
          V: Into<String>
{
    Value::List(pairs.into_iter()
                     .map(|(column, new_id)| {
                         Value::Record(args! { "column" => single_column(column), "newColumnId" => Into::<String>::into(new_id) })
                     })
                     .collect())
}

impl Dataflow {
    pub fn drop_columns(&self, columns: impl Into<MultiColumnSelection>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::DropColumns, args! { "columns" => selection_to_value(columns) })
    }

    pub fn keep_columns(&self, columns: impl Into<MultiColumnSelection>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::KeepColumns, args! { "columns" => selection_to_value(columns) })
    }

    /// `pairs`: `(columna actual, nombre nuevo)`.
    pub fn rename_columns<I, K, V>(&self, pairs: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<String>
    {
        self.add_step(StepType::RenameColumns, args! { "columnPairs" => column_pairs(pairs) })
    }

    /// `pairs`: `(columna origen, nombre de la copia)`.
    pub fn duplicate_column<I, K, V>(&self, pairs: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<String>
    {
        self.add_step(StepType::DuplicateColumn, args! { "columnPairs" => column_pairs(pairs) })
    }

    /// Columna nueva con los valores de `column` sustituidos según
    /// `(origen, destino)`; un destino `None` deja null.
    pub fn map_column(&self,
                      column: &str,
                      new_column_id: &str,
                      replacements: Option<Vec<(String, Option<String>)>>)
                      -> Result<Dataflow, DataflowError> {
        let replacements = replacements.map(|pairs| {
                                           pairs.into_iter()
                                                .map(|(source, target)| {
                                                    Value::Record(args! { "sourceValue" => source, "targetValue" => target })
                                                })
                                                .collect::<Vec<_>>()
                                       });
        self.add_step(StepType::MapColumn,
                      args! {
                          "column" => single_column(column),
                          "newColumnId" => new_column_id,
                          "replacements" => replacements,
                      })
    }

    pub fn null_coalesce(&self, columns: &[&str], new_column_id: &str) -> Result<Dataflow, DataflowError> {
        let selectors: Vec<Value> = columns.iter().map(|c| single_column(*c)).collect();
        self.add_step(StepType::NullCoalesce,
                      args! { "columns" => selectors, "newColumnId" => new_column_id })
    }

    pub fn extract_error_details(&self,
                                 column: &str,
                                 error_value_column: &str,
                                 extract_error_code: bool,
                                 error_code_column: Option<&str>)
                                 -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ExtractErrorDetails,
                      args! {
                          "column" => single_column(column),
                          "errorValueColumn" => error_value_column,
                          "extractErrorCode" => extract_error_code,
                          "errorCodeColumn" => error_code_column,
                      })
    }

    pub fn replace_na(&self,
                      columns: impl Into<MultiColumnSelection>,
                      use_default_na_list: bool,
                      use_empty_string_as_na: bool,
                      use_nan_as_na: bool,
                      custom_na_list: Option<&str>)
                      -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ReplaceNa,
                      args! {
                          "columns" => selection_to_value(columns),
                          "useDefaultNaList" => use_default_na_list,
                          "useEmptyStringAsNa" => use_empty_string_as_na,
                          "useNanAsNa" => use_nan_as_na,
                          "customNaList" => custom_na_list,
                      })
    }

    pub fn trim_string(&self,
                       columns: impl Into<MultiColumnSelection>,
                       trim_left: bool,
                       trim_right: bool,
                       trim_type: TrimType,
                       custom_characters: &str)
                       -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::TrimString,
                      args! {
                          "columns" => selection_to_value(columns),
                          "trimLeft" => trim_left,
                          "trimRight" => trim_right,
                          "trimType" => trim_type,
                          "customCharacters" => custom_characters,
                      })
    }

    pub fn round(&self, decimal_places: i64, column: &str) -> Result<Dataflow, DataflowError> {
        if decimal_places < 0 {
            return Err(DataflowError::invalid("decimal_places", "must be zero or positive"));
        }
        self.add_step(StepType::Round,
                      args! { "decimalPlaces" => decimal_places, "column" => single_column(column) })
    }

    pub fn clip(&self,
                columns: impl Into<MultiColumnSelection>,
                lower: Option<f64>,
                upper: Option<f64>,
                use_values: bool)
                -> Result<Dataflow, DataflowError> {
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(DataflowError::invalid("lower", format!("{lo} is greater than upper bound {hi}")));
            }
        }
        self.add_step(StepType::Clip,
                      args! {
                          "columns" => selection_to_value(columns),
                          "lower" => lower,
                          "upper" => upper,
                          "useValues" => use_values,
                      })
    }

    pub fn str_replace(&self,
                       columns: impl Into<MultiColumnSelection>,
                       value_to_find: Option<&str>,
                       replace_with: Option<&str>,
                       match_entire_cell_contents: bool,
                       use_special_characters: bool)
                       -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::StrReplace,
                      args! {
                          "columns" => selection_to_value(columns),
                          "valueToFind" => value_to_find,
                          "replaceWith" => replace_with,
                          "matchEntireCellContents" => match_entire_cell_contents,
                          "useSpecialCharacters" => use_special_characters,
                      })
    }

    pub fn distinct_rows(&self) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::DistinctRows, args! {})
    }

    pub fn distinct(&self, columns: impl Into<MultiColumnSelection>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::Distinct, args! { "columns" => selection_to_value(columns) })
    }

    pub fn drop_nulls(&self,
                      columns: impl Into<MultiColumnSelection>,
                      relationship: ColumnRelationship)
                      -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::DropNulls,
                      args! { "columns" => selection_to_value(columns), "columnRelationship" => relationship })
    }

    pub fn drop_errors(&self,
                       columns: impl Into<MultiColumnSelection>,
                       relationship: ColumnRelationship)
                       -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::DropErrors,
                      args! { "columns" => selection_to_value(columns), "columnRelationship" => relationship })
    }

    pub fn skip(&self, count: i64) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::Skip, args! { "count" => count })
    }

    pub fn take(&self, count: i64) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::Take, args! { "count" => count })
    }

    pub fn promote_headers(&self) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::PromoteHeaders, args! {})
    }

    pub fn to_number(&self, columns: impl Into<MultiColumnSelection>, decimal_point: DecimalMark) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ToNumber,
                      args! { "columns" => selection_to_value(columns), "decimalPoint" => decimal_point })
    }

    pub fn to_bool(&self,
                   columns: impl Into<MultiColumnSelection>,
                   true_values: &[&str],
                   false_values: &[&str],
                   mismatch_as: MismatchAsOption)
                   -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ToBool,
                      args! {
                          "columns" => selection_to_value(columns),
                          "trueValues" => true_values.to_vec(),
                          "falseValues" => false_values.to_vec(),
                          "mismatchAs" => mismatch_as,
                      })
    }

    /// Eclipsa a `Display::to_string`; para renderizar el dataflow usar
    /// `format!("{dataflow}")`.
    pub fn to_string(&self, columns: impl Into<MultiColumnSelection>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ToString, args! { "columns" => selection_to_value(columns) })
    }

    pub fn to_long(&self, columns: impl Into<MultiColumnSelection>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ToLong, args! { "columns" => selection_to_value(columns) })
    }

    pub fn convert_unix_timestamp_to_datetime(&self,
                                              columns: impl Into<MultiColumnSelection>,
                                              use_seconds: bool)
                                              -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ConvertUnixTimestampToDateTime,
                      args! { "columns" => selection_to_value(columns), "useSeconds" => use_seconds })
    }

    /// `order`: `(columna, descendente)` en orden de prioridad.
    pub fn sort<I, S>(&self, order: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = (S, bool)>,
              S: Into<String>
    {
        let order: Vec<Value> = order.into_iter()
                                     .map(|(column, descending)| {
                                         Value::Record(args! { "column" => single_column(column), "descending" => descending })
                                     })
                                     .collect();
        if order.is_empty() {
            return Err(DataflowError::invalid("sort_order", "at least one column is required"));
        }
        self.add_step(StepType::Sort, args! { "sortOrder" => order })
    }

    pub fn sort_asc<I, S>(&self, columns: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.sort(columns.into_iter().map(|c| (c, false)))
    }

    pub fn sort_desc<I, S>(&self, columns: I) -> Result<Dataflow, DataflowError>
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.sort(columns.into_iter().map(|c| (c, true)))
    }

    /// Agrega columnas, opcionalmente agrupando. Sin columnas de resumen ni
    /// de agrupación no hay nada que calcular.
    pub fn summarize(&self,
                     summary_columns: &[SummaryColumn],
                     group_by_columns: &[&str],
                     join_back: bool,
                     join_back_columns_prefix: Option<&str>)
                     -> Result<Dataflow, DataflowError> {
        if summary_columns.is_empty() && group_by_columns.is_empty() {
            return Err(DataflowError::invalid("summary_columns",
                                              "provide at least one of 'summary_columns', 'group_by_columns'"));
        }
        let summaries = (!summary_columns.is_empty()).then(|| {
                                                          summary_columns.iter()
                                                                         .map(SummaryColumn::to_value)
                                                                         .collect::<Vec<_>>()
                                                      });
        let group_by = (!group_by_columns.is_empty()).then(|| group_by_columns.to_vec());
        self.add_step(StepType::Summarize,
                      args! {
                          "summaryColumns" => summaries,
                          "groupByColumns" => group_by,
                          "joinBack" => join_back,
                          "joinBackColumnsPrefix" => join_back_columns_prefix,
                      })
    }

    /// Conserva solo los registros para los que `expression` es verdadera.
    pub fn filter(&self, expression: impl Into<Expression>) -> Result<Dataflow, DataflowError> {
        let expression: Expression = expression.into();
        self.add_step(StepType::ExpressionFilter, args! { "expression" => expression })
    }

    pub fn add_column(&self,
                      expression: impl Into<Expression>,
                      new_column_name: &str,
                      prior_column: Option<&str>)
                      -> Result<Dataflow, DataflowError> {
        let expression: Expression = expression.into();
        self.add_step(StepType::ExpressionAddColumn,
                      args! {
                          "expression" => expression,
                          "newColumnName" => new_column_name,
                          "priorColumn" => prior_column.map(single_column),
                      })
    }

    pub fn assert_value(&self,
                        columns: impl Into<MultiColumnSelection>,
                        expression: impl Into<Expression>,
                        policy: AssertPolicy,
                        error_code: Option<&str>)
                        -> Result<Dataflow, DataflowError> {
        let expression: Expression = expression.into();
        self.add_step(StepType::ExpressionAssertValue,
                      args! {
                          "columns" => selection_to_value(columns),
                          "expression" => expression,
                          "assertPolicy" => policy,
                          "errorCode" => error_code.unwrap_or("AssertionFailed"),
                      })
    }

    /// Columna calculada por un script que define `newvalue(row)`.
    pub fn new_script_column(&self, new_column_name: &str, insert_after: &str, script: &str) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::AddCustomColumn,
                      args! {
                          "codeBlockType" => CodeBlockType::Module,
                          "columnId" => new_column_name,
                          "customExpression" => script,
                          "priorColumnId" => single_column(insert_after),
                      })
    }

    /// Filtro por un script que define `includerow(row)`.
    pub fn new_script_filter(&self, script: &str) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::Filter,
                      args! { "codeBlockType" => CodeBlockType::Module, "filterExpression" => script })
    }

    /// Transforma cada partición con un script que define
    /// `transform(df, index)`.
    pub fn transform_partition(&self, script: &str) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::MapPartitionsAsDataFrame,
                      args! { "codeBlockType" => CodeBlockType::Module, "MapPartitionsAsDataFrameBlock" => script })
    }

    /// Igual que `transform_partition` pero el script vive en `script_path`.
    pub fn transform_partition_with_file(&self, script_path: &str) -> Result<Dataflow, DataflowError> {
        if script_path.trim().is_empty() {
            return Err(DataflowError::invalid("script_path", "must not be empty"));
        }
        self.add_step(StepType::MapPartitionsAsDataFrame,
                      args! { "codeBlockType" => CodeBlockType::File, "MapPartitionsAsDataFrameBlock" => script_path })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::EngineClient;
    use crate::columns::{ColumnPattern, ColumnsSelector};
    use crate::engine::InMemoryEngine;

    fn base() -> Dataflow {
        Dataflow::get_files(&EngineClient::shared(Arc::new(InMemoryEngine::new())), "a.csv").unwrap()
    }

    #[test]
    fn rename_pairs_use_single_selectors() {
        let d = base().rename_columns([("old", "new")]).unwrap();
        let pairs = d.last_step().unwrap().argument("columnPairs").and_then(Value::as_list).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].get("column"), Some(&single_column("old")));
        assert_eq!(pairs[0].get("newColumnId"), Some(&Value::from("new")));
    }

    #[test]
    fn pattern_selection_reaches_the_step() {
        let d = base().keep_columns(ColumnPattern::new("^col").regex()).unwrap();
        let columns = d.last_step().unwrap().argument("columns").unwrap();
        assert!(matches!(ColumnsSelector::from_value(columns).unwrap(), ColumnsSelector::Pattern(_)));
    }

    #[test]
    fn summarize_needs_something_to_compute() {
        let err = base().summarize(&[], &[], false, None).unwrap_err();
        assert!(matches!(err, DataflowError::InvalidArgument { .. }));

        let d = base().summarize(&[SummaryColumn::new("x", SummaryFunction::Mean, "x_mean")], &[], false, None)
                      .unwrap();
        let step = d.last_step().unwrap();
        assert_eq!(step.argument("groupByColumns"), Some(&Value::Null));
        let summary = &step.argument("summaryColumns").and_then(Value::as_list).unwrap()[0];
        assert_eq!(summary.get("summaryFunction"), Some(&Value::Long(2)));
    }

    #[test]
    fn sort_desc_marks_every_column_descending() {
        let d = base().sort_desc(["a", "b"]).unwrap();
        let order = d.last_step().unwrap().argument("sortOrder").and_then(Value::as_list).unwrap();
        assert!(order.iter().all(|o| o.get("descending") == Some(&Value::Boolean(true))));
        assert!(base().sort_asc(Vec::<String>::new()).is_err());
    }

    #[test]
    fn assert_value_defaults_the_error_code() {
        let d = base().assert_value("a", Value::Boolean(true), AssertPolicy::ErrorValue, None).unwrap();
        assert_eq!(d.last_step().unwrap().argument("errorCode"), Some(&Value::from("AssertionFailed")));
    }

    #[test]
    fn add_column_without_prior_column_sends_null() {
        let d = base().add_column(Value::from("expr"), "n", None).unwrap();
        assert_eq!(d.last_step().unwrap().argument("priorColumn"), Some(&Value::Null));
    }

    #[test]
    fn clip_rejects_inverted_bounds_before_appending() {
        let b = base();
        assert!(b.clip("a", Some(5.0), Some(1.0), true).is_err());
        assert_eq!(b.step_count(), 1);
    }
}
