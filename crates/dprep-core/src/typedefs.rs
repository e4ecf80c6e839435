//! Enums con código entero que el engine entiende.

use crate::wire_enum;

wire_enum! {
    /// Cómo se promueven las cabeceras al parsear.
    pub enum PromoteHeadersMode {
        None = 0,
        Ungrouped = 1,
        Grouped = 2,
        ConstantGrouped = 3,
    }
}

wire_enum! {
    pub enum FileEncoding {
        Utf8 = 0,
        Iso88591 = 1,
        Latin1 = 2,
        Ascii = 3,
        Utf16 = 4,
        Utf32 = 5,
        Utf8Bom = 6,
        Windows1252 = 7,
    }
}

wire_enum! {
    /// Cómo se aplica `skip_rows` cuando hay varios ficheros.
    pub enum SkipMode {
        None = 0,
        Ungrouped = 1,
        FirstFile = 2,
        Grouped = 3,
    }
}

wire_enum! {
    pub enum JoinType {
        None = 0,
        Match = 2,
        Inner = 3,
        UnmatchLeft = 4,
        LeftAnti = 5,
        LeftOuter = 6,
        UnmatchRight = 8,
        RightAnti = 9,
        RightOuter = 10,
        FullAnti = 12,
        Full = 14,
    }
}

wire_enum! {
    /// Qué hacer con los valores que no cumplen un assert.
    pub enum AssertPolicy {
        ErrorValue = 0,
        FailExecution = 1,
    }
}

wire_enum! {
    pub enum ColumnRelationship {
        All = 0,
        Any = 1,
    }
}

wire_enum! {
    /// Cómo se entrega un script: inline o desde fichero.
    pub enum CodeBlockType {
        Module = 0,
        File = 1,
    }
}

wire_enum! {
    pub enum SummaryFunction {
        Min = 0,
        Max = 1,
        Mean = 2,
        Median = 3,
        Var = 4,
        Sd = 5,
        Count = 8,
        Sum = 11,
        Skewness = 18,
        Kurtosis = 19,
    }
}

wire_enum! {
    /// Resultado para valores que no son ni verdaderos ni falsos.
    pub enum MismatchAsOption {
        AsTrue = 0,
        AsFalse = 1,
        AsError = 2,
    }
}

wire_enum! {
    pub enum TrimType {
        Whitespace = 0,
        Custom = 1,
    }
}

wire_enum! {
    pub enum DecimalMark {
        Dot = 0,
        Comma = 1,
    }
}

wire_enum! {
    pub enum ArchiveType {
        Zip = 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn codes_round_trip() {
        assert_eq!(JoinType::from_code(JoinType::LeftOuter.code()), Some(JoinType::LeftOuter));
        assert_eq!(JoinType::from_code(1), None);
        assert_eq!(Value::from(PromoteHeadersMode::ConstantGrouped), Value::Long(3));
    }
}
