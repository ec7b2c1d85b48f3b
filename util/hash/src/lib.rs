//! The default hash function for the tpool workspace.
//!
//! Every identifier in `txpool-types` (transaction IDs, set IDs, object
//! IDs) is a blake2b-256 digest produced by [`blake2b_256`] or, for
//! multi-part inputs, by feeding a [`Blake2bBuilder`] incrementally.

use blake2b_ref::{Blake2b, Blake2bBuilder};

/// Output width of the hash function, in bytes.
pub const BLAKE2B_LEN: usize = 32;

const PERSONALIZATION: &[u8] = b"txpool.hash.v1.0";

fn new_blake2b() -> Blake2b {
    Blake2bBuilder::new(BLAKE2B_LEN)
        .personal(PERSONALIZATION)
        .build()
}

/// Hash `data` in one shot and return the 32-byte digest.
pub fn blake2b_256<T: AsRef<[u8]>>(data: T) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut blake2b = new_blake2b();
    blake2b.update(data.as_ref());
    blake2b.finalize(&mut result);
    result
}

/// An incremental hasher for hashing a sequence of byte slices without
/// concatenating them first, used to hash an ordered transaction list.
pub struct Blake2bHasher(Blake2b);

impl Default for Blake2bHasher {
    fn default() -> Self {
        Blake2bHasher(new_blake2b())
    }
}

impl Blake2bHasher {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> [u8; 32] {
        let mut result = [0u8; 32];
        self.0.finalize(&mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_matches_incremental() {
        let whole = blake2b_256(b"hello world");
        let mut hasher = Blake2bHasher::default();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(whole, hasher.finalize());
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(blake2b_256(b"a"), blake2b_256(b"b"));
    }
}
