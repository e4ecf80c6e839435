//! Conversión de tipos de columna.
//!
//! Las conversiones a fecha sin formatos obligan a aprender; el resultado
//! aprendido tiene que traer formatos para todas ellas. Con
//! `AmbiguousDatePolicy::DropConversion` las que sigan sin formato se
//! descartan en lugar de fallar.

use indexmap::IndexMap;

use super::{Materialization, StepBuilder};
use crate::args;
use crate::columns::{single_column, ColumnsSelector};
use crate::config::{AmbiguousDatePolicy, ClientConfig};
use crate::engine::BlockData;
use crate::errors::{DataflowError, MissingParameter};
use crate::step::StepType;
use crate::value::{Arguments, FieldType, Value};

/// Conversión pedida para una columna.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConverter {
    Simple(FieldType),
    /// Fecha con formatos candidatos. Vacío significa "inferir".
    DateTime { formats: Vec<String> },
}

impl TypeConverter {
    pub fn date_formats<I, S>(formats: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        TypeConverter::DateTime { formats: formats.into_iter().map(Into::into).collect() }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            TypeConverter::Simple(t) => *t,
            TypeConverter::DateTime { .. } => FieldType::Date,
        }
    }

    fn type_arguments(&self) -> Value {
        match self {
            TypeConverter::DateTime { formats } if !formats.is_empty() => {
                Value::Record(args! { "dateTimeFormats" => formats.clone() })
            }
            _ => Value::Null,
        }
    }
}

impl From<FieldType> for TypeConverter {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Date => TypeConverter::DateTime { formats: Vec::new() },
            other => TypeConverter::Simple(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTypesBuilder {
    conversions: IndexMap<String, TypeConverter>,
}

impl ColumnTypesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Añade (o reemplaza) la conversión de `column`.
    pub fn with(mut self, column: impl Into<String>, converter: impl Into<TypeConverter>) -> Self {
        self.conversions.insert(column.into(), converter.into());
        self
    }

    pub fn conversions(&self) -> &IndexMap<String, TypeConverter> {
        &self.conversions
    }
}

fn conversion_list(arguments: &Arguments) -> Option<&[Value]> {
    arguments.get("columnConversion").and_then(Value::as_list)
}

/// Nombre legible de la columna de una conversión; `None` si no es un selector.
fn conversion_column(conversion: &Value) -> Option<String> {
    let selector = conversion.get("column")
                             .and_then(|c| ColumnsSelector::from_value(c).ok())?;
    Some(match selector {
        ColumnsSelector::Single(name) => name,
        ColumnsSelector::Static(names) => names.join(", "),
        ColumnsSelector::Pattern(pattern) => pattern.term,
    })
}

fn is_unresolved_date(conversion: &Value) -> bool {
    let is_date = conversion.get("typeProperty").and_then(Value::as_i64) == Some(FieldType::Date.code());
    let has_formats = conversion.get("typeArguments")
                                .and_then(|a| a.get("dateTimeFormats"))
                                .and_then(Value::as_list)
                                .is_some_and(|f| !f.is_empty());
    is_date && !has_formats
}

/// Columnas con conversión a fecha todavía sin formato.
fn unresolved_dates(arguments: &Arguments) -> Vec<String> {
    conversion_list(arguments).unwrap_or_default()
                              .iter()
                              .filter(|c| is_unresolved_date(c))
                              .filter_map(conversion_column)
                              .collect()
}

impl StepBuilder for ColumnTypesBuilder {
    fn step_type(&self) -> StepType {
        StepType::SetColumnTypes
    }

    fn candidate_arguments(&self) -> Result<Arguments, DataflowError> {
        if self.conversions.is_empty() {
            return Err(DataflowError::invalid("type_conversions", "at least one column conversion is required"));
        }
        let conversions: Vec<Value> = self.conversions
                                          .iter()
                                          .map(|(column, converter)| {
                                              Value::Record(args! {
                                                  "column" => single_column(column.as_str()),
                                                  "typeProperty" => converter.field_type(),
                                                  "typeArguments" => converter.type_arguments(),
                                              })
                                          })
                                          .collect();
        Ok(args! { "columnConversion" => conversions })
    }

    fn needs_learning(&self, candidate: &Arguments) -> bool {
        !unresolved_dates(candidate).is_empty()
    }

    fn check_complete(&self, learned: &BlockData) -> Result<(), MissingParameter> {
        match conversion_list(&learned.arguments) {
            Some(_) => Ok(()),
            None => Err(MissingParameter::LearnedArgument("columnConversion".into())),
        }
    }

    fn finalize(&self,
                candidate: Arguments,
                learned: Option<BlockData>,
                config: &ClientConfig)
                -> Result<Materialization, MissingParameter> {
        let arguments = learned.map(|b| b.arguments).unwrap_or(candidate);
        let unresolved = unresolved_dates(&arguments);
        if unresolved.is_empty() {
            return Ok(Materialization { step_type: StepType::SetColumnTypes,
                                        arguments,
                                        local_data: None });
        }

        match config.ambiguous_dates {
            AmbiguousDatePolicy::Error => Err(MissingParameter::DateTimeFormats { columns: unresolved }),
            AmbiguousDatePolicy::DropConversion => {
                let kept: Vec<Value> = conversion_list(&arguments).unwrap_or_default()
                                                                  .iter()
                                                                  .filter(|c| !is_unresolved_date(c))
                                                                  .cloned()
                                                                  .collect();
                if kept.is_empty() {
                    return Err(MissingParameter::DateTimeFormats { columns: unresolved });
                }
                log::warn!("dropping date conversion for columns [{}]: no format could be detected",
                           unresolved.join(", "));
                let mut arguments = arguments;
                arguments.insert("columnConversion".to_string(), Value::List(kept));
                Ok(Materialization { step_type: StepType::SetColumnTypes,
                                     arguments,
                                     local_data: None })
            }
        }
    }
}
