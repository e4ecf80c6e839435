//! Reemplazo tipado de valores (`ReplaceBlock`).
//!
//! Tanto el valor a buscar como el de reemplazo viajan en una ranura por
//! tipo (`string…`, `double…`, `datetime…`, `boolean…`) más un `FieldType`
//! que indica cuál está ocupada. Enteros y doubles comparten la ranura
//! decimal; las fechas viajan como `{"timestamp": millis}`.

use super::Dataflow;
use crate::args;
use crate::columns::{selection_to_value, MultiColumnSelection};
use crate::errors::DataflowError;
use crate::step::StepType;
use crate::value::{Arguments, FieldType, Value};

/// Ranura ocupada por un valor: tipo de campo y el valor ya convertido.
struct Slot {
    field_type: FieldType,
    payload: Option<(&'static str, Value)>,
}

fn slot(argument: &str, value: &Value) -> Result<Slot, DataflowError> {
    let (field_type, payload) = match value {
        Value::Null => (FieldType::Null, None),
        Value::String(s) => (FieldType::String, Some(("string", Value::from(s)))),
        Value::Long(v) => (FieldType::Decimal, Some(("double", Value::Double(*v as f64)))),
        Value::Double(v) => (FieldType::Decimal, Some(("double", Value::Double(*v)))),
        Value::Boolean(b) => (FieldType::Boolean, Some(("boolean", Value::Boolean(*b)))),
        Value::DateTime(ts) => (FieldType::Date, Some(("datetime", Value::Record(args! { "timestamp" => ts.millis() })))),
        other => {
            return Err(DataflowError::unsupported(argument, format!("{} values can't be used in a replace", other.kind())))
        }
    };
    Ok(Slot { field_type, payload })
}

fn replace_arguments(columns: Value, find: &Slot, replace_with: &Slot, error_code: Option<String>) -> Arguments {
    let mut arguments = args! {
        "columns" => columns,
        "valueToFindType" => find.field_type,
        "stringValueToFind" => Value::Null,
        "doubleValueToFind" => Value::Null,
        "datetimeValueToFind" => Value::Null,
        "booleanValueToFind" => Value::Null,
        "replaceWithType" => replace_with.field_type,
        "stringReplaceWith" => Value::Null,
        "doubleReplaceWith" => Value::Null,
        "datetimeReplaceWith" => Value::Null,
        "booleanReplaceWith" => Value::Null,
        "errorReplaceWith" => error_code,
    };
    if let Some((prefix, value)) = &find.payload {
        arguments.insert(format!("{prefix}ValueToFind"), value.clone());
    }
    if let Some((prefix, value)) = &replace_with.payload {
        arguments.insert(format!("{prefix}ReplaceWith"), value.clone());
    }
    arguments
}

impl Dataflow {
    /// Sustituye los valores iguales a `find` por `replace_with`.
    pub fn replace(&self,
                   columns: impl Into<MultiColumnSelection>,
                   find: impl Into<Value>,
                   replace_with: impl Into<Value>)
                   -> Result<Dataflow, DataflowError> {
        let find = slot("find", &find.into())?;
        let replace_with = slot("replace_with", &replace_with.into())?;
        self.add_step(StepType::Replace,
                      replace_arguments(selection_to_value(columns), &find, &replace_with, None))
    }

    /// Convierte en error los valores iguales a `find`.
    pub fn error(&self,
                 columns: impl Into<MultiColumnSelection>,
                 find: impl Into<Value>,
                 error_code: &str)
                 -> Result<Dataflow, DataflowError> {
        let find = slot("find", &find.into())?;
        let with = Slot { field_type: FieldType::Error,
                          payload: None };
        self.add_step(StepType::Replace,
                      replace_arguments(selection_to_value(columns), &find, &with, Some(error_code.to_string())))
    }

    pub fn fill_nulls(&self, columns: impl Into<MultiColumnSelection>, fill_with: impl Into<Value>) -> Result<Dataflow, DataflowError> {
        let fill_with = slot("fill_with", &fill_with.into())?;
        if fill_with.field_type == FieldType::Null {
            return Err(DataflowError::unsupported("fill_with", "nulls can't be filled with null"));
        }
        let find = Slot { field_type: FieldType::Null,
                          payload: None };
        self.add_step(StepType::Replace,
                      replace_arguments(selection_to_value(columns), &find, &fill_with, None))
    }

    pub fn fill_errors(&self, columns: impl Into<MultiColumnSelection>, fill_with: impl Into<Value>) -> Result<Dataflow, DataflowError> {
        let fill_with = slot("fill_with", &fill_with.into())?;
        let find = Slot { field_type: FieldType::Error,
                          payload: None };
        self.add_step(StepType::Replace,
                      replace_arguments(selection_to_value(columns), &find, &fill_with, None))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::client::EngineClient;
    use crate::engine::InMemoryEngine;

    fn base() -> Dataflow {
        Dataflow::get_files(&EngineClient::shared(Arc::new(InMemoryEngine::new())), "a.csv").unwrap()
    }

    #[test]
    fn integers_go_to_the_decimal_slot() {
        let d = base().replace("a", 3i64, "three").unwrap();
        let step = d.last_step().unwrap();
        assert_eq!(step.argument("valueToFindType"), Some(&Value::from(FieldType::Decimal)));
        assert_eq!(step.argument("doubleValueToFind"), Some(&Value::Double(3.0)));
        assert_eq!(step.argument("stringReplaceWith"), Some(&Value::from("three")));
        assert_eq!(step.argument("stringValueToFind"), Some(&Value::Null));
    }

    #[test]
    fn datetimes_travel_as_millis() {
        let when = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let d = base().replace("a", when, Value::Null).unwrap();
        let step = d.last_step().unwrap();
        assert_eq!(step.argument("datetimeValueToFind").and_then(|v| v.get("timestamp")),
                   Some(&Value::Long(when.timestamp_millis())));
        assert_eq!(step.argument("replaceWithType"), Some(&Value::from(FieldType::Null)));
    }

    #[test]
    fn earliest_datetime_fits_the_millis_slot() {
        let earliest = Value::DateTime(crate::value::Timestamp::from_ticks(i64::MIN));
        let d = base().replace("a", earliest, Value::Null).unwrap();
        let millis = d.last_step()
                      .and_then(|s| s.argument("datetimeValueToFind"))
                      .and_then(|v| v.get("timestamp"))
                      .and_then(Value::as_i64);
        assert!(millis.is_some_and(|m| m < 0));
    }

    #[test]
    fn booleans_keep_their_own_type() {
        let d = base().replace("a", true, false).unwrap();
        let step = d.last_step().unwrap();
        assert_eq!(step.argument("valueToFindType"), Some(&Value::from(FieldType::Boolean)));
        assert_eq!(step.argument("booleanReplaceWith"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn lists_and_records_are_rejected_locally() {
        let b = base();
        let err = b.replace("a", Value::List(vec![]), "x").unwrap_err();
        assert!(matches!(err, DataflowError::UnsupportedValue { ref argument, .. } if argument == "find"));
        assert!(b.fill_errors("a", Value::Record(args! {})).is_err());
        assert_eq!(b.step_count(), 1);
    }

    #[test]
    fn error_sets_the_error_code() {
        let d = base().error("a", "bad", "E01").unwrap();
        let step = d.last_step().unwrap();
        assert_eq!(step.argument("replaceWithType"), Some(&Value::from(FieldType::Error)));
        assert_eq!(step.argument("errorReplaceWith"), Some(&Value::from("E01")));
    }

    #[test]
    fn fill_nulls_refuses_a_null_fill() {
        let b = base();
        assert!(matches!(b.fill_nulls("a", Value::Null), Err(DataflowError::UnsupportedValue { .. })));
        let d = b.fill_nulls("a", 0i64).unwrap();
        assert_eq!(d.last_step().unwrap().argument("valueToFindType"), Some(&Value::from(FieldType::Null)));
    }

    #[test]
    fn fill_errors_searches_for_errors() {
        let d = base().fill_errors("a", "n/a").unwrap();
        assert_eq!(d.last_step().unwrap().argument("valueToFindType"), Some(&Value::from(FieldType::Error)));
    }
}
