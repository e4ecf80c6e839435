//! Selección de columnas.
//!
//! Toda selección de entrada (un nombre, una lista de nombres o un patrón) se
//! normaliza a un único `ColumnsSelector` discriminado antes de incrustarse en
//! los argumentos de un step. La normalización es pura e idempotente.

use crate::errors::DataflowError;
use crate::value::Value;
use crate::{args, wire_enum};

wire_enum! {
    /// Discriminador del selector en el engine.
    pub enum ColumnsSelectorType {
        SingleColumn = 0,
        StaticList = 1,
        Dynamic = 2,
    }
}

/// Selección dinámica por coincidencia de nombre.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPattern {
    pub term: String,
    pub use_regex: bool,
    pub ignore_case: bool,
    pub match_whole_word: bool,
    pub invert: bool,
}

impl ColumnPattern {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into(),
               use_regex: false,
               ignore_case: false,
               match_whole_word: false,
               invert: false }
    }

    pub fn regex(mut self) -> Self {
        self.use_regex = true;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn whole_word(mut self) -> Self {
        self.match_whole_word = true;
        self
    }

    pub fn invert(mut self) -> Self {
        self.invert = true;
        self
    }
}

/// Selector normalizado.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnsSelector {
    Single(String),
    Static(Vec<String>),
    Pattern(ColumnPattern),
}

impl ColumnsSelector {
    pub fn selector_type(&self) -> ColumnsSelectorType {
        match self {
            ColumnsSelector::Single(_) => ColumnsSelectorType::SingleColumn,
            ColumnsSelector::Static(_) => ColumnsSelectorType::StaticList,
            ColumnsSelector::Pattern(_) => ColumnsSelectorType::Dynamic,
        }
    }

    /// `{"type": code, "details": {...}}`
    pub fn to_value(&self) -> Value {
        let details = match self {
            ColumnsSelector::Single(name) => args! { "selectedColumn" => name },
            ColumnsSelector::Static(names) => args! { "selectedColumns" => names.clone() },
            ColumnsSelector::Pattern(p) => args! {
                "term" => &p.term,
                "useRegex" => p.use_regex,
                "ignoreCase" => p.ignore_case,
                "matchWholeWord" => p.match_whole_word,
                "invert" => p.invert,
            },
        };
        Value::Record(args! { "type" => self.selector_type(), "details" => details })
    }

    /// Inverso de `to_value`.
    pub fn from_value(value: &Value) -> Result<Self, DataflowError> {
        let code = value.get("type")
                        .and_then(Value::as_i64)
                        .ok_or_else(|| DataflowError::invalid("columns", "selector without integer 'type'"))?;
        let details = value.get("details")
                           .ok_or_else(|| DataflowError::invalid("columns", "selector without 'details'"))?;
        match ColumnsSelectorType::from_code(code) {
            Some(ColumnsSelectorType::SingleColumn) => details.get("selectedColumn")
                                                              .and_then(Value::as_str)
                                                              .map(|s| ColumnsSelector::Single(s.to_string()))
                                                              .ok_or_else(|| {
                                                                  DataflowError::invalid("columns", "missing 'selectedColumn'")
                                                              }),
            Some(ColumnsSelectorType::StaticList) => details.get("selectedColumns")
                                                            .and_then(Value::as_string_list)
                                                            .map(ColumnsSelector::Static)
                                                            .ok_or_else(|| {
                                                                DataflowError::invalid("columns", "missing 'selectedColumns'")
                                                            }),
            Some(ColumnsSelectorType::Dynamic) => {
                let term = details.get("term")
                                  .and_then(Value::as_str)
                                  .ok_or_else(|| DataflowError::invalid("columns", "missing 'term'"))?;
                let flag = |key: &str| details.get(key).and_then(Value::as_bool).unwrap_or(false);
                Ok(ColumnsSelector::Pattern(ColumnPattern { term: term.to_string(),
                                                            use_regex: flag("useRegex"),
                                                            ignore_case: flag("ignoreCase"),
                                                            match_whole_word: flag("matchWholeWord"),
                                                            invert: flag("invert") }))
            }
            None => Err(DataflowError::invalid("columns", format!("unknown selector type {code}"))),
        }
    }

    /// Nombre de la columna si el selector es de columna única.
    pub fn single_name(&self) -> Option<&str> {
        match self {
            ColumnsSelector::Single(name) => Some(name),
            _ => None,
        }
    }
}

impl From<ColumnsSelector> for Value {
    fn from(s: ColumnsSelector) -> Self {
        s.to_value()
    }
}

/// Selección de columnas tal como la escribe el usuario.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiColumnSelection {
    Name(String),
    Names(Vec<String>),
    Pattern(ColumnPattern),
    Selector(ColumnsSelector),
}

impl MultiColumnSelection {
    /// Un nombre suelto se trata como lista de un elemento.
    pub fn normalize(self) -> ColumnsSelector {
        match self {
            MultiColumnSelection::Name(name) => ColumnsSelector::Static(vec![name]),
            MultiColumnSelection::Names(names) => ColumnsSelector::Static(names),
            MultiColumnSelection::Pattern(p) => ColumnsSelector::Pattern(p),
            MultiColumnSelection::Selector(s) => s,
        }
    }
}

impl From<&str> for MultiColumnSelection {
    fn from(v: &str) -> Self {
        MultiColumnSelection::Name(v.to_string())
    }
}

impl From<String> for MultiColumnSelection {
    fn from(v: String) -> Self {
        MultiColumnSelection::Name(v)
    }
}

impl From<Vec<String>> for MultiColumnSelection {
    fn from(v: Vec<String>) -> Self {
        MultiColumnSelection::Names(v)
    }
}

impl From<Vec<&str>> for MultiColumnSelection {
    fn from(v: Vec<&str>) -> Self {
        MultiColumnSelection::Names(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MultiColumnSelection {
    fn from(v: [&str; N]) -> Self {
        MultiColumnSelection::Names(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<ColumnPattern> for MultiColumnSelection {
    fn from(v: ColumnPattern) -> Self {
        MultiColumnSelection::Pattern(v)
    }
}

impl From<ColumnsSelector> for MultiColumnSelection {
    fn from(v: ColumnsSelector) -> Self {
        MultiColumnSelection::Selector(v)
    }
}

/// Normaliza y codifica una selección múltiple.
pub fn selection_to_value(selection: impl Into<MultiColumnSelection>) -> Value {
    selection.into().normalize().to_value()
}

/// Selector de columna única codificado.
pub fn single_column(name: impl Into<String>) -> Value {
    ColumnsSelector::Single(name.into()).to_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_of_names_becomes_static_selector() {
        let v = selection_to_value(vec!["Path"]);
        assert_eq!(v.get("type"), Some(&Value::Long(1)));
        assert_eq!(v.get("details").and_then(|d| d.get("selectedColumns")),
                   Some(&Value::List(vec![Value::from("Path")])));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs: Vec<MultiColumnSelection> = vec!["a".into(),
                                                     vec!["a", "b"].into(),
                                                     ColumnPattern::new("^x").regex().ignore_case().invert().into(),
                                                     ColumnsSelector::Single("c".into()).into()];
        for input in inputs {
            let once = input.normalize();
            let twice = MultiColumnSelection::from(once.clone()).normalize();
            assert_eq!(once, twice);
            let decoded = ColumnsSelector::from_value(&once.to_value()).unwrap();
            assert_eq!(decoded, once);
            assert_eq!(decoded.to_value(), once.to_value());
        }
    }

    #[test]
    fn pattern_details_carry_every_flag() {
        let v = selection_to_value(ColumnPattern::new("col").whole_word());
        let details = v.get("details").unwrap();
        assert_eq!(details.get("matchWholeWord"), Some(&Value::Boolean(true)));
        assert_eq!(details.get("useRegex"), Some(&Value::Boolean(false)));
        assert_eq!(v.get("type"), Some(&Value::Long(2)));
    }

    #[test]
    fn malformed_selector_is_rejected() {
        let bad = Value::Record(args! { "type" => 7i64, "details" => args! {} });
        assert!(matches!(ColumnsSelector::from_value(&bad), Err(DataflowError::InvalidArgument { .. })));
    }
}
