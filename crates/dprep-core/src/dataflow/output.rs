//! Escritura y ejecución.
//!
//! `write_to_*` solo añaden steps. `run_local*`, `cache` y `materialize_to`
//! ejecutan en el engine y pasan siempre antes por el secret gate.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::Dataflow;
use crate::args;
use crate::constants::PARTITION_FILE_PREFIX;
use crate::datasource::FileDataSource;
use crate::engine::AnonymousBlocksArgs;
use crate::errors::DataflowError;
use crate::secrets;
use crate::step::StepType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOutputOptions {
    pub separator: String,
    /// Texto para valores nulos.
    pub na: String,
    /// Texto para valores error.
    pub error: String,
}

impl Default for CsvOutputOptions {
    fn default() -> Self {
        Self { separator: ",".to_string(),
               na: "NA".to_string(),
               error: "ERROR".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetOutputOptions {
    pub file_path: Option<FileDataSource>,
    pub directory_path: Option<FileDataSource>,
    pub single_file: bool,
    pub error: String,
    pub row_groups: i64,
}

impl Default for ParquetOutputOptions {
    fn default() -> Self {
        Self { file_path: None,
               directory_path: None,
               single_file: false,
               error: "ERROR".to_string(),
               row_groups: 0 }
    }
}

impl Dataflow {
    /// Escribe en CSV, un fichero por partición dentro de `directory`.
    pub fn write_to_csv(&self, directory: impl Into<FileDataSource>, options: CsvOutputOptions) -> Result<Dataflow, DataflowError> {
        self.add_step(StepType::WriteToCsv,
                      args! {
                          "filePath" => crate::value::Value::Null,
                          "directoryPath" => directory.into().to_value(),
                          "separator" => options.separator,
                          "singleFile" => false,
                          "na" => options.na,
                          "error" => options.error,
                      })
    }

    pub fn write_to_parquet(&self, options: ParquetOutputOptions) -> Result<Dataflow, DataflowError> {
        if options.file_path.is_none() && options.directory_path.is_none() {
            return Err(DataflowError::invalid("directory_path", "either a file or a directory path is required"));
        }
        self.add_step(StepType::WriteToParquet,
                      args! {
                          "filePath" => options.file_path.as_ref().map(FileDataSource::to_value),
                          "directoryPath" => options.directory_path.as_ref().map(FileDataSource::to_value),
                          "singleFile" => options.single_file,
                          "error" => options.error,
                          "rowGroups" => options.row_groups,
                      })
    }

    /// Ids de secretos que la secuencia requiere y el engine no tiene.
    pub fn get_missing_secrets(&self) -> Result<Vec<String>, DataflowError> {
        Ok(secrets::missing_secrets(&self.client, self.to_blocks(), self.parent_package_path())?.into_iter()
                                                                                                .collect())
    }

    /// Registra valores de secretos para ejecuciones posteriores.
    pub fn use_secrets(&self, secrets: &IndexMap<String, String>) -> Result<(), DataflowError> {
        secrets::register(&self.client, secrets)
    }

    /// Ejecuta el dataflow completo en el engine.
    pub fn run_local(&self) -> Result<(), DataflowError> {
        self.execute(None)
    }

    /// Como `run_local`, registrando antes `secrets`. Los secretos
    /// suministrados cuentan como disponibles para el gate.
    pub fn run_local_with_secrets(&self, secrets: &IndexMap<String, String>) -> Result<(), DataflowError> {
        self.execute(Some(secrets))
    }

    /// Añade un step de caché en `directory` y lo puebla tirando de una fila.
    pub fn cache(&self, directory: impl AsRef<Path>) -> Result<Dataflow, DataflowError> {
        let cached = self.add_step(StepType::Cache,
                                   args! { "cachePath" => FileDataSource::local(directory.as_ref()).to_value() })?;
        cached.take(1)?.execute(None)?;
        Ok(cached)
    }

    /// Ejecuta el dataflow escribiendo un dataset en `directory` y devuelve
    /// los ficheros de partición producidos, ordenados.
    pub fn materialize_to(&self, directory: impl AsRef<Path>) -> Result<Vec<PathBuf>, DataflowError> {
        let directory = directory.as_ref();
        let output = self.add_step(StepType::WriteDataSet,
                                   args! {
                                       "outputPath" => FileDataSource::local(directory).to_value(),
                                       "profilingFields" => vec!["Schema", "DataQuality"],
                                   })?;
        output.execute(None)?;

        let mut parts = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let is_part = path.file_name()
                              .and_then(|n| n.to_str())
                              .is_some_and(|n| n.starts_with(PARTITION_FILE_PREFIX));
            if is_part {
                parts.push(path);
            }
        }
        parts.sort();
        log::debug!("dataflow {}: materialized {} partition files in {}", self.id, parts.len(), directory.display());
        Ok(parts)
    }

    fn execute(&self, supplied: Option<&IndexMap<String, String>>) -> Result<(), DataflowError> {
        let blocks = self.to_blocks();
        let project_context = self.parent_package_path().map(str::to_string);
        secrets::ensure_available(&self.client, blocks.clone(), project_context.as_deref(), supplied)?;
        if let Some(values) = supplied {
            secrets::register(&self.client, values)?;
        }
        log::debug!("dataflow {}: executing {} steps", self.id, blocks.len());
        self.client
            .engine()
            .execute_anonymous_blocks(AnonymousBlocksArgs { blocks, project_context })?;
        Ok(())
    }
}
