//! Fixed-width opaque identifiers used throughout the pool.
//!
//! Every identifier is a blake2b-256 digest newtyped over `[u8; 32]`,
//! modeled on the fixed-width hash newtypes used across the corpus
//! (`Byte32`/`H256`): cheap to copy, ordered, hex `Display`/`Debug`,
//! `Serialize`/`Deserialize` for free via `serde`'s derive on a plain
//! array.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_hash_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Construct directly from a 32-byte digest.
            pub const fn new(bytes: [u8; 32]) -> Self {
                $name(bytes)
            }

            /// Raw byte view.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// The all-zero identifier, used as a sentinel (e.g. the
            /// genesis block's parent id).
            pub const fn zero() -> Self {
                $name([0u8; 32])
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                $name(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

define_hash_id!(TransactionId, "Identifies a single transaction.");
define_hash_id!(
    TransactionSetId,
    "Identifies a pooled set: the hash of the canonical encoding of its ordered transaction list."
);
define_hash_id!(BlockId, "Identifies a confirmed block.");
define_hash_id!(ConsensusChangeId, "Identifies a consensus-change notification.");

/// A `TransactionId` plus a discriminant for which resource table the id
/// lives in. This is the union type `spec.md` §3 calls `ObjectID`: every
/// output, contract, revision, or proof parent-id a transaction can
/// reference or create, regardless of which field of `Transaction` it
/// came from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub kind: ObjectKind,
    pub id: [u8; 32],
}

/// Which resource table an [`ObjectId`] belongs to. Two objects with the
/// same 32 bytes but different kinds are distinct — coin outputs and
/// file contracts each mint ids from their own namespace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ObjectKind {
    CoinOutput,
    FileContract,
    FundOutput,
}

impl ObjectId {
    pub fn new(kind: ObjectKind, id: [u8; 32]) -> Self {
        ObjectId { kind, id }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:0x{}", self.kind, hex::encode(self.id))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_hex_prefixed() {
        let id = TransactionId::new([0xab; 32]);
        assert!(format!("{id}").starts_with("0xabab"));
    }

    #[test]
    fn object_ids_differ_by_kind_even_with_same_bytes() {
        let a = ObjectId::new(ObjectKind::CoinOutput, [1; 32]);
        let b = ObjectId::new(ObjectKind::FileContract, [1; 32]);
        assert_ne!(a, b);
    }
}
