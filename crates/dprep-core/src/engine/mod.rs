//! Superficie RPC del engine externo.
//!
//! El cliente depende exactamente de estas operaciones. Todas son síncronas
//! y bloqueantes; los errores se devuelven tal cual, sin reintentos.

pub mod memory;
pub mod messages;

use indexmap::IndexMap;

use crate::errors::EngineError;
use crate::reference::ActivityReference;

pub use memory::{EngineCall, InMemoryEngine};
pub use messages::{AddBlockToListArgs, AnonymousBlocksArgs, BlockArguments, BlockData, ResolveReferenceArgs, SecretStatus};

/// Contrato con el engine. Implementaciones deben ser seguras para compartir
/// entre hilos; el estado mutable (almacén de secretos) vive del lado del engine.
pub trait EngineApi: Send + Sync {
    /// Dispara la ejecución de una secuencia de steps.
    fn execute_anonymous_blocks(&self, args: AnonymousBlocksArgs) -> Result<(), EngineError>;

    /// Completa los argumentos de un step candidato inspeccionando una muestra
    /// de los datos alcanzables por `args.blocks`.
    fn add_block_to_list(&self, args: AddBlockToListArgs) -> Result<BlockData, EngineError>;

    /// Secretos requeridos por la secuencia y su disponibilidad.
    fn get_secrets(&self, args: AnonymousBlocksArgs) -> Result<Vec<SecretStatus>, EngineError>;

    /// Registra la secuencia como grafo anónimo y devuelve su handle.
    fn create_anonymous_reference(&self, args: AnonymousBlocksArgs) -> Result<ActivityReference, EngineError>;

    /// Handle de un dataflow con nombre dentro de un paquete.
    fn resolve_reference(&self, args: ResolveReferenceArgs) -> Result<ActivityReference, EngineError>;

    /// Añade valores al almacén de secretos del proceso.
    fn add_temporary_secrets(&self, secrets: &IndexMap<String, String>) -> Result<(), EngineError>;
}
