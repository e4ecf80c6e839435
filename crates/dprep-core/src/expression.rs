//! Expresiones del engine.
//!
//! El cliente no interpreta expresiones: las trata como un `Value` opaco que
//! se incrusta en los argumentos de filtros, columnas calculadas y asserts.

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Expression(Value);

impl Expression {
    pub fn new(underlying: Value) -> Self {
        Self(underlying)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Expression {
    fn from(v: Value) -> Self {
        Expression(v)
    }
}

impl From<Expression> for Value {
    fn from(e: Expression) -> Self {
        e.0
    }
}

impl From<&Expression> for Value {
    fn from(e: &Expression) -> Self {
        e.0.clone()
    }
}
