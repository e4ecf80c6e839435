//! Fuentes de datos que pueden ocupar el step raíz de un dataflow.

use std::path::Path;

use crate::secrets::Secret;
use crate::value::Value;
use crate::{args, wire_enum};

wire_enum! {
    /// Dónde vive un recurso de ficheros.
    pub enum DataSourceTarget {
        Local = 0,
        Http = 1,
        AzureBlobStorage = 2,
        AzureDataLakeStorage = 3,
    }
}

wire_enum! {
    pub enum DatabaseAuthType {
        Server = 0,
    }
}

/// Uno o varios paths (globs permitidos) en un mismo destino.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDataSource {
    target: DataSourceTarget,
    paths: Vec<String>,
}

impl FileDataSource {
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self { target: DataSourceTarget::Local,
               paths: vec![path.as_ref().to_string_lossy().into_owned()] }
    }

    pub fn new(target: DataSourceTarget, paths: Vec<String>) -> Self {
        Self { target, paths }
    }

    /// Infiere el destino a partir del esquema del path.
    pub fn from_path_str(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        let target = if lower.starts_with("wasb://") || lower.starts_with("wasbs://") {
            DataSourceTarget::AzureBlobStorage
        } else if lower.starts_with("adl://") {
            DataSourceTarget::AzureDataLakeStorage
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSourceTarget::Http
        } else {
            DataSourceTarget::Local
        };
        Self { target,
               paths: vec![path.to_string()] }
    }

    pub fn target(&self) -> DataSourceTarget {
        self.target
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// `{"target": code, "resourceDetails": [{"path": p}, ...]}`
    pub fn to_value(&self) -> Value {
        let details: Vec<Value> = self.paths
                                      .iter()
                                      .map(|p| Value::Record(args! { "path" => p }))
                                      .collect();
        Value::Record(args! { "target" => self.target, "resourceDetails" => details })
    }
}

impl From<&str> for FileDataSource {
    fn from(v: &str) -> Self {
        FileDataSource::from_path_str(v)
    }
}

impl From<String> for FileDataSource {
    fn from(v: String) -> Self {
        FileDataSource::from_path_str(&v)
    }
}

impl From<&Path> for FileDataSource {
    fn from(v: &Path) -> Self {
        FileDataSource::local(v)
    }
}

/// Base de datos MS SQL. La contraseña nunca viaja en los argumentos: solo se
/// incrusta la referencia al secreto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MssqlDataSource {
    pub server: String,
    pub database: String,
    pub user_name: String,
    pub password: Secret,
    pub trust_server: bool,
    pub credentials_type: DatabaseAuthType,
}

impl MssqlDataSource {
    pub fn new(server: impl Into<String>,
               database: impl Into<String>,
               user_name: impl Into<String>,
               password: Secret)
               -> Self {
        Self { server: server.into(),
               database: database.into(),
               user_name: user_name.into(),
               password,
               trust_server: true,
               credentials_type: DatabaseAuthType::Server }
    }
}

/// Cualquier fuente reemplazable en el step raíz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(FileDataSource),
    Mssql(MssqlDataSource),
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::File(_) => "FileDataSource",
            DataSource::Mssql(_) => "MSSQLDataSource",
        }
    }
}

impl From<FileDataSource> for DataSource {
    fn from(v: FileDataSource) -> Self {
        DataSource::File(v)
    }
}

impl From<MssqlDataSource> for DataSource {
    fn from(v: MssqlDataSource) -> Self {
        DataSource::Mssql(v)
    }
}

impl From<&str> for DataSource {
    fn from(v: &str) -> Self {
        DataSource::File(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_encode_target_zero() {
        let v = FileDataSource::from_path_str("./data/a.csv").to_value();
        assert_eq!(v.get("target"), Some(&Value::Long(0)));
        let details = v.get("resourceDetails").and_then(Value::as_list).unwrap();
        assert_eq!(details[0].get("path"), Some(&Value::from("./data/a.csv")));
    }

    #[test]
    fn remote_schemes_are_detected() {
        assert_eq!(FileDataSource::from_path_str("https://host/x.csv").target(), DataSourceTarget::Http);
        assert_eq!(FileDataSource::from_path_str("wasbs://c@acct/x.csv").target(),
                   DataSourceTarget::AzureBlobStorage);
    }
}
