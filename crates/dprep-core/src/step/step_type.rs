//! Catálogo cerrado de tipos de step y su esquema mínimo de argumentos.
//!
//! Cada tipo declara el nombre con el que viaja al engine y las claves que
//! deben estar presentes en sus argumentos. `Step::new` valida el esquema, de
//! modo que un argumento requerido ausente es un error estructural y no algo
//! que el engine descubra tarde.

use std::fmt;
use std::str::FromStr;

use crate::errors::DataflowError;

macro_rules! step_types {
    ($($variant:ident => $wire:literal [$($req:literal),* $(,)?]),+ $(,)?) => {
        /// Tipo (tag) de un step.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StepType { $($variant),+ }

        impl StepType {
            /// Todos los tipos conocidos, en orden de declaración.
            pub const ALL: &'static [StepType] = &[$(StepType::$variant),+];

            /// Nombre del bloque en el engine.
            pub fn as_str(self) -> &'static str {
                match self { $(StepType::$variant => $wire),+ }
            }

            /// Claves de argumento obligatorias.
            pub fn required_arguments(self) -> &'static [&'static str] {
                match self { $(StepType::$variant => &[$($req),*]),+ }
            }
        }

        impl FromStr for StepType {
            type Err = DataflowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(StepType::$variant),)+
                    other => Err(DataflowError::UnknownStepType(other.to_string())),
                }
            }
        }
    };
}

step_types! {
    // Fuentes
    GetFiles => "Microsoft.DPrep.GetFilesBlock" ["path"],
    ReadExcel => "Microsoft.DPrep.ReadExcelBlock" ["sheetName", "useColumnHeaders", "skipRows"],
    ReadParquetDataset => "Microsoft.DPrep.ReadParquetDatasetBlock" ["path"],
    Database => "Database" ["server", "database", "credentialsType", "credentials", "query", "trustServer"],
    Reference => "Microsoft.DPrep.ReferenceBlock" ["reference"],
    ReferenceAndInverseSplit => "Microsoft.DPrep.ReferenceAndInverseSplitBlock" ["sourceFilter"],
    TwoWayJoin => "TwoWayJoin" ["leftActivityReference", "rightActivityReference", "joinKeyPairs", "joinType"],

    // Parsers
    ParseDelimited => "Microsoft.DPrep.ParseDelimitedBlock"
        ["columnHeadersMode", "separator", "fileEncoding", "skipRowsMode", "skipRows", "handleQuotedLineBreaks"],
    ParseFixedWidthColumns => "Microsoft.DPrep.ParseFixedWidthColumns"
        ["columnHeadersMode", "columnOffsets", "fileEncoding", "skipRowsMode", "skipRows"],
    ParsePlainText => "Microsoft.DPrep.ParsePlainTextBlock" ["columnHeadersMode", "fileEncoding", "skipRowsMode", "skipRows"],
    ReadParquetFile => "Microsoft.DPrep.ReadParquetFileBlock" [],
    JsonFile => "JSONFile" ["dsl", "fileEncoding"],
    AutoReadFile => "Microsoft.DPrep.AutoReadFileBlock" [],

    // Tipos
    SetColumnTypes => "Microsoft.DPrep.SetColumnTypesBlock" ["columnConversion"],
    ToDateTime => "Microsoft.DPrep.ToDateTimeBlock" ["columns", "dateTimeFormats"],
    ToNumber => "Microsoft.DPrep.ToNumberBlock" ["columns", "decimalPoint"],
    ToBool => "Microsoft.DPrep.ToBoolBlock" ["columns", "trueValues", "falseValues", "mismatchAs"],
    ToString => "Microsoft.DPrep.ToStringBlock" ["columns"],
    ToLong => "Microsoft.DPrep.ToLongBlock" ["columns"],
    ConvertUnixTimestampToDateTime => "Microsoft.DPrep.ConvertUnixTimestampToDateTime" ["columns", "useSeconds"],
    ParseJsonColumn => "Microsoft.DPrep.ParseJsonColumnBlock" ["column"],

    // Muestreo
    TakeSample => "Microsoft.DPrep.TakeSampleBlock" ["probability", "seed"],
    TakeStratifiedSample => "Microsoft.DPrep.TakeStratifiedSampleBlock" ["seed", "columns", "fractions"],
    RandomSplit => "Microsoft.DPrep.RandomSplitBlock" ["probability", "seed"],
    Skip => "Microsoft.DPrep.SkipBlock" ["count"],
    Take => "Microsoft.DPrep.TakeBlock" ["count"],

    // Columnas
    DropColumns => "Microsoft.DPrep.DropColumnsBlock" ["columns"],
    KeepColumns => "Microsoft.DPrep.KeepColumnsBlock" ["columns"],
    RenameColumns => "Microsoft.DPrep.RenameColumnsBlock" ["columnPairs"],
    DuplicateColumn => "Microsoft.DPrep.DuplicateColumnBlock" ["columnPairs"],
    MapColumn => "Microsoft.DPrep.MapColumnBlock" ["column", "newColumnId"],
    NullCoalesce => "Microsoft.DPrep.NullCoalesceBlock" ["columns", "newColumnId"],
    ExtractErrorDetails => "Microsoft.DPrep.ExtractErrorDetailsBlock" ["column", "errorValueColumn", "extractErrorCode"],
    PromoteHeaders => "Microsoft.DPrep.PromoteHeadersBlock" [],
    ExpressionAddColumn => "Microsoft.DPrep.ExpressionAddColumnBlock" ["expression", "newColumnName"],
    AddCustomColumn => "Microsoft.DPrep.AddCustomColumnBlock" ["codeBlockType", "columnId", "customExpression"],
    DeriveColumnByExample => "Microsoft.DPrep.DeriveColumnByExampleBlock" ["sourceColumns", "columnId", "examples"],
    SplitColumnByExample => "Microsoft.DPrep.SplitColumnByExampleBlock" ["column", "keepDelimiters"],
    FuzzyGroupColumn => "Microsoft.DPrep.FuzzyGroupColumnBlock" ["sourceColumn", "newColumnId", "similarityThreshold"],
    OneHotEncode => "Microsoft.DPrep.OneHotEncodingBlock" ["sourceColumn"],
    LabelEncode => "Microsoft.DPrep.LabelEncoderBlock" ["sourceColumn", "newColumnId"],
    QuantileTransform => "Microsoft.DPrep.QuantileTransformBlock" ["sourceColumn", "newColumnId", "quantilesCount", "outputDistribution"],
    MinMaxScale => "Microsoft.DPrep.MinMaxScalerBlock" ["column", "rangeMin", "rangeMax"],

    // Valores
    Replace => "Microsoft.DPrep.ReplaceBlock" ["columns", "valueToFindType", "replaceWithType"],
    ReplaceNa => "Microsoft.DPrep.ReplaceNaBlock" ["columns"],
    TrimString => "Microsoft.DPrep.TrimStringBlock" ["columns", "trimLeft", "trimRight", "trimType"],
    Round => "Microsoft.DPrep.RoundBlock" ["decimalPlaces", "column"],
    Clip => "Microsoft.DPrep.ClipBlock" ["columns", "useValues"],
    StrReplace => "Microsoft.DPrep.StrReplaceBlock" ["columns"],

    // Filas
    ExpressionFilter => "Microsoft.DPrep.ExpressionFilterBlock" ["expression"],
    Filter => "Microsoft.DPrep.FilterBlock" ["codeBlockType", "filterExpression"],
    ExpressionAssertValue => "Microsoft.DPrep.ExpressionAssertValueBlock" ["columns", "expression", "assertPolicy", "errorCode"],
    DistinctRows => "Microsoft.DPrep.DistinctRowsBlock" [],
    Distinct => "Microsoft.DPrep.DistinctBlock" ["columns"],
    DropNulls => "Microsoft.DPrep.DropNullsBlock" ["columns", "columnRelationship"],
    DropErrors => "Microsoft.DPrep.DropErrorsBlock" ["columns", "columnRelationship"],
    Sort => "Microsoft.DPrep.SortBlock" ["sortOrder"],
    Summarize => "Microsoft.DPrep.SummarizeBlock" ["joinBack"],
    MapPartitionsAsDataFrame => "Microsoft.DPrep.MapPartitionsAsDataFrameBlock" ["codeBlockType", "MapPartitionsAsDataFrameBlock"],

    // Combinación
    AppendColumns => "Microsoft.DPrep.AppendColumnsBlock" ["dataflows"],
    AppendRows => "Microsoft.DPrep.AppendRowsBlock" ["dataflows"],

    // Salidas
    Cache => "Microsoft.DPrep.CacheBlock" ["cachePath"],
    WriteToCsv => "Microsoft.DPrep.WriteToCsvBlock" ["directoryPath", "separator", "singleFile", "na", "error"],
    WriteToParquet => "Microsoft.DPrep.WriteToParquetBlock" ["singleFile", "error", "rowGroups"],
    WriteDataSet => "Microsoft.DPrep.WriteDataSetBlock" ["outputPath"],
}

/// Clase estructural de un step raíz, usada para validar reemplazos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasourceKind {
    /// Respaldado por base de datos (`Database`).
    Database,
    /// Respaldado por ficheros (`GetFiles`, `ReadExcel`, ...).
    File,
    /// Referencia a otro dataflow.
    Reference,
    /// Cualquier otro step usado como raíz.
    Other,
}

impl StepType {
    pub fn datasource_kind(self) -> DatasourceKind {
        match self {
            StepType::Database => DatasourceKind::Database,
            StepType::GetFiles | StepType::ReadExcel | StepType::ReadParquetDataset => DatasourceKind::File,
            StepType::Reference => DatasourceKind::Reference,
            _ => DatasourceKind::Other,
        }
    }

    /// Steps de los que puede derivarse el nombre del dataflow.
    pub fn carries_path(self) -> bool {
        matches!(self, StepType::GetFiles | StepType::ReadExcel | StepType::ReadParquetDataset)
    }

    /// Steps que convierten ficheros en registros.
    pub fn is_parser(self) -> bool {
        matches!(self,
                 StepType::ParseDelimited
                 | StepType::ParseFixedWidthColumns
                 | StepType::ParsePlainText
                 | StepType::ReadParquetFile
                 | StepType::ReadExcel
                 | StepType::JsonFile)
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for t in StepType::ALL {
            assert_eq!(t.as_str().parse::<StepType>().unwrap(), *t);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "Microsoft.DPrep.NopeBlock".parse::<StepType>().unwrap_err();
        assert_eq!(err, DataflowError::UnknownStepType("Microsoft.DPrep.NopeBlock".into()));
    }
}
