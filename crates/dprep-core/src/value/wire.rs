//! Codificación de `Value` hacia/desde JSON en la frontera RPC.
//!
//! La codificación es biyectiva para todas las variantes:
//! - null, booleanos, strings y listas usan su forma JSON natural.
//! - `Long` es un entero JSON; `Double` finito es un número JSON con parte
//!   flotante (serde_json conserva la distinción entero/flotante).
//! - `Double` no finito: `{"$double": "NaN" | "Infinity" | "-Infinity"}`.
//! - `DateTime`: `{"$datetime": ticks}`.
//! - `Record`: objeto JSON con orden preservado. Si el record tiene una única
//!   clave reservada (`$double`, `$datetime`, `$record`) se envuelve como
//!   `{"$record": {...}}` para no confundirlo con las formas etiquetadas.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number};

use super::{Arguments, Timestamp, Value};
use crate::errors::ValueError;

const DOUBLE_TAG: &str = "$double";
const DATETIME_TAG: &str = "$datetime";
const RECORD_TAG: &str = "$record";

fn is_reserved(key: &str) -> bool {
    key == DOUBLE_TAG || key == DATETIME_TAG || key == RECORD_TAG
}

/// Codifica un valor a su forma JSON de wire.
pub fn encode(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Long(v) => serde_json::Value::Number(Number::from(*v)),
        Value::Double(v) => match Number::from_f64(*v) {
            Some(n) => serde_json::Value::Number(n),
            None => {
                let label = if v.is_nan() {
                    "NaN"
                } else if v.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                tagged(DOUBLE_TAG, serde_json::Value::String(label.to_string()))
            }
        },
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(ts) => tagged(DATETIME_TAG, serde_json::Value::Number(Number::from(ts.ticks()))),
        Value::List(items) => serde_json::Value::Array(items.iter().map(encode).collect()),
        Value::Record(map) => {
            let object = encode_arguments(map);
            if map.len() == 1 && map.keys().all(|k| is_reserved(k)) {
                tagged(RECORD_TAG, object)
            } else {
                object
            }
        }
    }
}

/// Codifica un mapa de argumentos como objeto JSON (sin envoltorio).
pub fn encode_arguments(map: &Arguments) -> serde_json::Value {
    let mut object = Map::with_capacity(map.len());
    for (k, v) in map {
        object.insert(k.clone(), encode(v));
    }
    serde_json::Value::Object(object)
}

fn tagged(tag: &str, inner: serde_json::Value) -> serde_json::Value {
    let mut object = Map::with_capacity(1);
    object.insert(tag.to_string(), inner);
    serde_json::Value::Object(object)
}

/// Inverso de `encode`.
pub fn decode(json: &serde_json::Value) -> Result<Value, ValueError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if n.is_f64() {
                n.as_f64()
                 .map(Value::Double)
                 .ok_or_else(|| ValueError::InvalidWire(format!("number {n}")))
            } else {
                n.as_i64()
                 .map(Value::Long)
                 .ok_or_else(|| ValueError::UnsupportedKind(format!("unsigned integer {n} exceeds 64-bit signed range")))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => Ok(Value::List(items.iter().map(decode).collect::<Result<_, _>>()?)),
        serde_json::Value::Object(object) => {
            if object.len() == 1 {
                if let Some((key, inner)) = object.iter().next() {
                    match key.as_str() {
                        DOUBLE_TAG => return decode_special_double(inner),
                        DATETIME_TAG => {
                            let ticks = inner.as_i64()
                                             .ok_or_else(|| ValueError::InvalidWire(format!("{DATETIME_TAG} expects integer ticks")))?;
                            return Ok(Value::DateTime(Timestamp::from_ticks(ticks)));
                        }
                        RECORD_TAG => {
                            let inner = inner.as_object()
                                             .ok_or_else(|| ValueError::InvalidWire(format!("{RECORD_TAG} expects an object")))?;
                            return decode_object(inner).map(Value::Record);
                        }
                        _ => {}
                    }
                }
            }
            decode_object(object).map(Value::Record)
        }
    }
}

/// Decodifica un objeto JSON como mapa de argumentos.
pub fn decode_arguments(json: &serde_json::Value) -> Result<Arguments, ValueError> {
    match json {
        serde_json::Value::Object(object) => decode_object(object),
        serde_json::Value::Null => Ok(Arguments::new()),
        other => Err(ValueError::InvalidWire(format!("arguments must be an object, found {other}"))),
    }
}

fn decode_object(object: &Map<String, serde_json::Value>) -> Result<Arguments, ValueError> {
    let mut map = Arguments::with_capacity(object.len());
    for (k, v) in object {
        map.insert(k.clone(), decode(v)?);
    }
    Ok(map)
}

fn decode_special_double(inner: &serde_json::Value) -> Result<Value, ValueError> {
    match inner.as_str() {
        Some("NaN") => Ok(Value::Double(f64::NAN)),
        Some("Infinity") => Ok(Value::Double(f64::INFINITY)),
        Some("-Infinity") => Ok(Value::Double(f64::NEG_INFINITY)),
        _ => Err(ValueError::InvalidWire(format!("{DOUBLE_TAG} expects NaN/Infinity/-Infinity, found {inner}"))),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        decode(&json).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn round_trip(v: &Value) -> Value {
        decode(&encode(v)).expect("decode")
    }

    #[test]
    fn every_variant_round_trips() {
        let samples = vec![Value::Null,
                           Value::Boolean(true),
                           Value::Long(-42),
                           Value::Long(i64::MAX),
                           Value::Double(1.0),
                           Value::Double(-0.25),
                           Value::String("texto".into()),
                           Value::DateTime(Timestamp::from_millis(1_550_000_000_123)),
                           Value::List(vec![Value::Long(1), Value::String("x".into())]),
                           Value::Record(args! { "b" => 1i64, "a" => "z" })];
        for v in samples {
            assert_eq!(round_trip(&v), v, "round trip failed for {v}");
        }
    }

    #[test]
    fn whole_doubles_stay_doubles() {
        assert_eq!(round_trip(&Value::Double(3.0)), Value::Double(3.0));
        assert_eq!(round_trip(&Value::Long(3)), Value::Long(3));
    }

    #[test]
    fn non_finite_doubles_are_tagged() {
        assert!(matches!(round_trip(&Value::Double(f64::NAN)), Value::Double(v) if v.is_nan()));
        assert_eq!(round_trip(&Value::Double(f64::INFINITY)), Value::Double(f64::INFINITY));
        assert_eq!(round_trip(&Value::Double(f64::NEG_INFINITY)), Value::Double(f64::NEG_INFINITY));
    }

    #[test]
    fn records_that_look_tagged_are_wrapped() {
        let tricky = Value::Record(args! { "$datetime" => 5i64 });
        let json = encode(&tricky);
        assert!(json.get("$record").is_some());
        assert_eq!(round_trip(&tricky), tricky);
    }

    #[test]
    fn ticks_survive_the_wire_as_longs() {
        let ts = Timestamp::from_millis(86_400_000);
        let decoded = round_trip(&Value::Long(ts.ticks()));
        assert_eq!(Timestamp::from_ticks(decoded.as_i64().unwrap()).ticks(), ts.ticks());
    }

    #[test]
    fn extreme_datetimes_round_trip_and_display() {
        for ticks in [i64::MIN, i64::MAX, 0] {
            let v = Value::DateTime(Timestamp::from_ticks(ticks));
            let decoded = decode(&serde_json::json!({ "$datetime": ticks })).expect("decode");
            assert_eq!(decoded, v);
            assert_eq!(round_trip(&v), v);
            assert!(!decoded.to_string().is_empty());
        }
    }

    #[test]
    fn record_order_is_preserved_on_the_wire() {
        let v = Value::Record(args! { "zeta" => 1i64, "alpha" => 2i64 });
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }
}
