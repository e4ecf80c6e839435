//! Constructores de fuente y parsers.

use std::sync::Arc;

use super::Dataflow;
use crate::args;
use crate::client::EngineClient;
use crate::datasource::{FileDataSource, MssqlDataSource};
use crate::errors::DataflowError;
use crate::reference::{resolve, DataflowReference};
use crate::step::StepType;
use crate::typedefs::{ArchiveType, FileEncoding, PromoteHeadersMode, SkipMode};
use crate::value::Value;

/// Lectura de entradas dentro de un archivo comprimido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub archive_type: ArchiveType,
    pub entry_glob: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDelimitedOptions {
    pub separator: String,
    pub headers_mode: PromoteHeadersMode,
    pub encoding: FileEncoding,
    pub quoting: bool,
    pub skip_rows: i64,
    pub skip_mode: SkipMode,
    pub comment: Option<String>,
}

impl Default for ParseDelimitedOptions {
    fn default() -> Self {
        Self { separator: ",".to_string(),
               headers_mode: PromoteHeadersMode::ConstantGrouped,
               encoding: FileEncoding::Utf8,
               quoting: false,
               skip_rows: 0,
               skip_mode: SkipMode::None,
               comment: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFixedWidthOptions {
    pub offsets: Vec<i64>,
    pub headers_mode: PromoteHeadersMode,
    pub encoding: FileEncoding,
    pub skip_rows: i64,
    pub skip_mode: SkipMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLinesOptions {
    pub headers_mode: PromoteHeadersMode,
    pub encoding: FileEncoding,
    pub skip_rows: i64,
    pub skip_mode: SkipMode,
    pub comment: Option<String>,
}

impl Default for ParseLinesOptions {
    fn default() -> Self {
        Self { headers_mode: PromoteHeadersMode::None,
               encoding: FileEncoding::Utf8,
               skip_rows: 0,
               skip_mode: SkipMode::None,
               comment: None }
    }
}

impl Dataflow {
    /// Expande el path (globs, carpetas) en un record por fichero.
    pub fn get_files(client: &Arc<EngineClient>, path: impl Into<FileDataSource>) -> Result<Dataflow, DataflowError> {
        Self::get_files_with_archive(client, path, None)
    }

    pub fn get_files_with_archive(client: &Arc<EngineClient>,
                                  path: impl Into<FileDataSource>,
                                  archive: Option<ArchiveOptions>)
                                  -> Result<Dataflow, DataflowError> {
        let mut arguments = args! { "path" => path.into().to_value() };
        if let Some(archive) = archive {
            let mut options = args! { "archiveType" => archive.archive_type };
            if let Some(glob) = archive.entry_glob {
                options.insert("entryGlob".into(), Value::from(glob));
            }
            arguments.insert("isArchive".into(), Value::Boolean(true));
            arguments.insert("archiveOptions".into(), Value::Record(options));
        }
        Dataflow::new(client).add_step(StepType::GetFiles, arguments)
    }

    /// Dataflow nuevo cuyo único step referencia a `reference`.
    pub fn reference(client: &Arc<EngineClient>, reference: impl Into<DataflowReference>) -> Result<Dataflow, DataflowError> {
        let activity = resolve(client, &reference.into())?;
        Dataflow::new(client).add_step(StepType::Reference, args! { "reference" => activity })
    }

    pub fn read_parquet_dataset(client: &Arc<EngineClient>,
                                path: impl Into<FileDataSource>)
                                -> Result<Dataflow, DataflowError> {
        Dataflow::new(client).add_step(StepType::ReadParquetDataset, args! { "path" => path.into().to_value() })
    }

    pub fn parse_delimited(&self, options: ParseDelimitedOptions) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ParseDelimited,
                      args! {
                          "columnHeadersMode" => options.headers_mode,
                          "separator" => options.separator,
                          "commentLineCharacter" => options.comment,
                          "fileEncoding" => options.encoding,
                          "skipRowsMode" => options.skip_mode,
                          "skipRows" => options.skip_rows,
                          "handleQuotedLineBreaks" => options.quoting,
                      })
    }

    pub fn parse_fwf(&self, options: ParseFixedWidthOptions) -> Result<Dataflow, DataflowError> {
        if options.offsets.is_empty() {
            return Err(DataflowError::invalid("offsets", "at least one column offset is required"));
        }
        self.add_step(StepType::ParseFixedWidthColumns,
                      args! {
                          "columnHeadersMode" => options.headers_mode,
                          "columnOffsets" => options.offsets,
                          "fileEncoding" => options.encoding,
                          "skipRowsMode" => options.skip_mode,
                          "skipRows" => options.skip_rows,
                      })
    }

    pub fn parse_lines(&self, options: ParseLinesOptions) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ParsePlainText,
                      args! {
                          "columnHeadersMode" => options.headers_mode,
                          "commentLineCharacter" => options.comment,
                          "fileEncoding" => options.encoding,
                          "skipRowsMode" => options.skip_mode,
                          "skipRows" => options.skip_rows,
                      })
    }

    /// Lee de MS SQL ejecutando `query`. La contraseña va como referencia a
    /// secreto; su valor debe registrarse antes de ejecutar.
    pub fn read_sql(&self, source: &MssqlDataSource, query: impl Into<String>) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::Database, database_arguments(source, query.into()))
    }

    pub fn read_parquet_file(&self) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ReadParquetFile, args! {})
    }

    pub fn read_excel(&self, sheet_name: Option<&str>, use_column_headers: bool, skip_rows: i64) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::ReadExcel,
                      args! {
                          "sheetName" => sheet_name,
                          "useColumnHeaders" => use_column_headers,
                          "skipRows" => skip_rows,
                      })
    }

    /// `extract_program` es el programa de extracción JSON ya generado.
    pub fn read_json(&self, extract_program: impl Into<String>, encoding: FileEncoding) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::JsonFile,
                      args! { "dsl" => extract_program.into(), "fileEncoding" => encoding })
    }
}

pub(crate) fn database_arguments(source: &MssqlDataSource, query: String) -> crate::value::Arguments {
    args! {
        "server" => &source.server,
        "database" => &source.database,
        "credentialsType" => source.credentials_type,
        "credentials" => args! { "userName" => &source.user_name, "password" => &source.password },
        "query" => query,
        "trustServer" => source.trust_server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnsSelector;
    use crate::engine::InMemoryEngine;
    use crate::secrets::Secret;

    fn client() -> Arc<EngineClient> {
        EngineClient::shared(Arc::new(InMemoryEngine::new()))
    }

    #[test]
    fn csv_pipeline_has_three_typed_steps() {
        let d = Dataflow::get_files(&client(), "a.csv").unwrap()
                                                       .parse_delimited(ParseDelimitedOptions::default())
                                                       .unwrap()
                                                       .drop_columns(vec!["Path"])
                                                       .unwrap();
        let types: Vec<_> = d.steps().iter().map(|s| s.step_type()).collect();
        assert_eq!(types, vec![StepType::GetFiles, StepType::ParseDelimited, StepType::DropColumns]);
        let columns = d.last_step().unwrap().argument("columns").unwrap();
        assert_eq!(ColumnsSelector::from_value(columns).unwrap(),
                   ColumnsSelector::Static(vec!["Path".into()]));
    }

    #[test]
    fn archive_options_are_added_only_when_given() {
        let c = client();
        let plain = Dataflow::get_files(&c, "a.zip").unwrap();
        assert!(plain.last_step().unwrap().argument("isArchive").is_none());

        let zipped = Dataflow::get_files_with_archive(&c,
                                                      "a.zip",
                                                      Some(ArchiveOptions { archive_type: ArchiveType::Zip,
                                                                            entry_glob: Some("*.csv".into()) }))
                     .unwrap();
        let step = zipped.last_step().unwrap();
        assert_eq!(step.argument("isArchive"), Some(&Value::Boolean(true)));
        assert_eq!(step.argument("archiveOptions").and_then(|o| o.get("entryGlob")),
                   Some(&Value::from("*.csv")));
    }

    #[test]
    fn read_sql_embeds_only_the_secret_reference() {
        let source = MssqlDataSource::new("srv", "db", "sa", Secret::new("db-pwd"));
        let d = Dataflow::new(&client()).read_sql(&source, "select * from t").unwrap();
        let credentials = d.last_step().unwrap().argument("credentials").unwrap();
        assert_eq!(credentials.get("password"),
                   Some(&Value::Record(args! { "secretId" => "db-pwd" })));
    }

    #[test]
    fn fixed_width_needs_offsets() {
        let err = Dataflow::new(&client()).parse_fwf(ParseFixedWidthOptions { offsets: vec![],
                                                                               headers_mode: PromoteHeadersMode::None,
                                                                               encoding: FileEncoding::Utf8,
                                                                               skip_rows: 0,
                                                                               skip_mode: SkipMode::None })
                                          .unwrap_err();
        assert!(matches!(err, DataflowError::InvalidArgument { .. }));
    }
}
