//! Discriminadores de tipo: `ValueKind` (variante del `Value`) y `FieldType`
//! (tipo de columna tal como lo entiende el engine).

use std::fmt;

use crate::wire_enum;

/// Discriminador de las variantes de `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Long,
    Double,
    String,
    DateTime,
    List,
    Record,
}

impl ValueKind {
    /// Etiqueta en minúsculas usada en argumentos etiquetados
    /// (`{"long": 3}`, `{"datetime": ticks}`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::DateTime => "datetime",
            ValueKind::List => "list",
            ValueKind::Record => "record",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

wire_enum! {
    /// Tipos de columna del engine.
    pub enum FieldType {
        String = 0,
        Boolean = 1,
        Integer = 2,
        Decimal = 3,
        Date = 4,
        Unknown = 5,
        Error = 6,
        Null = 7,
        DataRow = 8,
        List = 9,
        Stream = 10,
    }
}
