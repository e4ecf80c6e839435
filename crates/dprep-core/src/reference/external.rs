//! Handles externos: dataflows con nombre dentro de un paquete.

use crate::client::EngineClient;
use crate::engine::ResolveReferenceArgs;
use crate::errors::DataflowError;

use super::ActivityReference;

/// Handle ya respaldado por un dataflow de paquete. Se abre con una única
/// llamada `resolve_reference`; a partir de ahí resolverlo es una proyección.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    package_path: String,
    dataflow_name: String,
    token: ActivityReference,
}

impl ExternalReference {
    pub fn open(client: &EngineClient,
                package_path: impl Into<String>,
                dataflow_name: impl Into<String>)
                -> Result<Self, DataflowError> {
        let args = ResolveReferenceArgs { package_path: package_path.into(),
                                          dataflow_name: dataflow_name.into() };
        let token = client.engine().resolve_reference(args.clone())?;
        log::info!("resolved '{}' in package {}", args.dataflow_name, args.package_path);
        Ok(Self { package_path: args.package_path,
                  dataflow_name: args.dataflow_name,
                  token })
    }

    /// Handle a partir de un token obtenido por otra vía.
    pub fn from_token(package_path: impl Into<String>, dataflow_name: impl Into<String>, token: ActivityReference) -> Self {
        Self { package_path: package_path.into(),
               dataflow_name: dataflow_name.into(),
               token }
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    pub fn dataflow_name(&self) -> &str {
        &self.dataflow_name
    }

    pub fn resolve(&self) -> ActivityReference {
        self.token.clone()
    }
}
