//! Helpers de hash (blake3, hex).

use blake3::Hasher;

use super::stable_json::to_stable_json;
use crate::engine::BlockData;
use crate::value::wire;

/// Hash del contenido de una secuencia de steps: tipos y argumentos, en
/// orden. Los ids y `local_data` no participan, así que dos grafos con la
/// misma forma producen el mismo hash.
pub fn hash_blocks(blocks: &[BlockData]) -> String {
    let mut h = Hasher::new();
    for block in blocks {
        h.update(block.block_type.as_bytes());
        h.update(b"\x1f");
        h.update(to_stable_json(&wire::encode_arguments(&block.arguments)).as_bytes());
        h.update(b"\x1e");
    }
    h.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use uuid::Uuid;

    fn block(arguments: crate::value::Arguments) -> BlockData {
        BlockData { id: Uuid::new_v4(),
                    block_type: "Microsoft.DPrep.SkipBlock".into(),
                    arguments,
                    local_data: None }
    }

    #[test]
    fn hash_ignores_ids_but_not_argument_order() {
        let a = block(args! { "count" => 1i64, "x" => true });
        let b = block(args! { "count" => 1i64, "x" => true });
        let c = block(args! { "x" => true, "count" => 1i64 });
        assert_eq!(hash_blocks(&[a.clone()]), hash_blocks(&[b]));
        assert_ne!(hash_blocks(&[a]), hash_blocks(&[c]));
    }

    #[test]
    fn hash_is_hex() {
        let h = hash_blocks(&[block(args! { "count" => 2i64 })]);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
