//! Hashing de contenido de grafos de steps.

pub mod hash;
pub mod stable_json;

pub use hash::hash_blocks;
pub use stable_json::to_stable_json;
