//! JSON estable que preserva el orden de inserción de los objetos.
//!
//! A diferencia de una forma canónica con claves ordenadas, aquí el orden de
//! los argumentos forma parte de la identidad, así que se conserva.

use serde_json::Value;

pub fn to_stable_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_stable_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let items: Vec<String> = map.iter()
                                        .map(|(k, v)| format!("{}:{}", quote(k), to_stable_json(v)))
                                        .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

fn quote(s: &str) -> String {
    // serde_json no falla con &str.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_insertion_order() {
        let v = json!({"b": 1, "a": [true, null, "x"]});
        assert_eq!(to_stable_json(&v), r#"{"b":1,"a":[true,null,"x"]}"#);
    }
}
