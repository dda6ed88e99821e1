/*!
 * Deterministic address synthesis.
 *
 * An address object is rewritten from a per-locale pool. The pool entry is
 * chosen by an RNG seeded from a hash of the occurrence, so the same row
 * always gets the same address across runs.
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::overrides::alias_key;

/// Identity of the address being rewritten
#[derive(Debug, Clone, Copy)]
pub struct AddressSeed<'a> {
    pub locale: &'a str,
    pub table: &'a str,
    pub row_id: &'a str,
    pub field_path: &'a str,
}

impl AddressSeed<'_> {
    fn rng(&self) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(self.locale.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.table.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.row_id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.field_path.as_bytes());
        let digest = hasher.finalize();

        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        StdRng::seed_from_u64(u64::from_be_bytes(seed_bytes))
    }
}

/// Pick the pool entry for `seed`
pub fn pick_address<'p>(pool: &'p [Map<String, Value>], seed: &AddressSeed<'_>) -> Option<&'p Map<String, Value>> {
    if pool.is_empty() {
        return None;
    }
    let index = seed.rng().random_range(0..pool.len());
    pool.get(index)
}

/// Overwrite the fields of `target` that exist in `replacement`, matching
/// keys by alias (`postal_code` matches `postalCode`). Keys keep their
/// original spelling; fields absent from `target` are not added.
pub fn overwrite_address(target: &mut Map<String, Value>, replacement: &Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, value) in target.iter_mut() {
        let alias = alias_key(key);
        let found = replacement.iter().find(|(k, _)| alias_key(k) == alias);
        if let Some((_, new_value)) = found {
            if value != new_value {
                *value = new_value.clone();
                changed = true;
            }
        }
    }
    changed
}
